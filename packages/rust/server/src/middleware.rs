//! Request middleware for the tutorial server.

use std::path::Path;

use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::debug;

/// Redirect extension-less paths to their trailing-slash form so relative
/// asset URLs inside step pages resolve against the step directory.
pub async fn trailing_slash(req: Request<Body>, next: Next) -> Response {
    let path = req.uri().path();

    if needs_slash(path) {
        let target = match req.uri().query() {
            Some(q) => format!("{path}/?{q}"),
            None => format!("{path}/"),
        };
        debug!(from = path, to = %target, "redirect (trailing slash)");
        return Redirect::temporary(&target).into_response();
    }

    next.run(req).await
}

fn needs_slash(path: &str) -> bool {
    !path.ends_with('/') && Path::new(path).extension().is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slash_rules() {
        assert!(needs_slash("/step1"));
        assert!(needs_slash("/info/step2"));
        assert!(needs_slash("/api/articles"));
        assert!(!needs_slash("/step1/"));
        assert!(!needs_slash("/step1/index.js"));
        assert!(!needs_slash("/"));
    }
}
