//! Mapping core errors onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

use steplab_shared::StepLabError;

/// A [`StepLabError`] on its way out as an HTTP response.
#[derive(Debug)]
pub struct HttpError(pub StepLabError);

impl From<StepLabError> for HttpError {
    fn from(err: StepLabError) -> Self {
        Self(err)
    }
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            StepLabError::NotFound { .. }
            | StepLabError::EmptyPreviousStep { .. }
            | StepLabError::Validation { .. } => StatusCode::NOT_FOUND,
            StepLabError::MissingBaseAsset { .. }
            | StepLabError::Config { .. }
            | StepLabError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self.0 {
            StepLabError::EmptyPreviousStep { .. } => warn!(error = %self.0, "init failed"),
            _ if status.is_server_error() => error!(error = %self.0, "request failed"),
            _ => {}
        }
        status.into_response()
    }
}

pub type HttpResult<T> = std::result::Result<T, HttpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let cases = [
            (StepLabError::not_found("x"), StatusCode::NOT_FOUND),
            (
                StepLabError::EmptyPreviousStep {
                    step: "step1".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (StepLabError::validation("stepx"), StatusCode::NOT_FOUND),
            (
                StepLabError::MissingBaseAsset {
                    path: "lib/app/sw.js".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(HttpError(err).status(), expected);
        }
    }
}
