//! Instructional and test content for a step.
//!
//! Info panels always have something to show: the step's own document, or
//! the shared "tutorial complete" document. Test panels do not fall back;
//! a step without a test definition is a genuine not-found.

use serde::Serialize;
use tracing::{debug, instrument, warn};

use steplab_shared::{ContentLayout, Result, Step, StepLabError};

use crate::files::read_optional_text;

/// Shown when the configured fallback document cannot be read either.
pub const BUILTIN_DONE: &str = "# Tutorial complete\n\n\
There are no further instructions for this step. You have reached the end \
of the tutorial.\n";

/// Which document an info panel was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoSource {
    Step,
    Fallback,
    Builtin,
}

/// Raw (unrendered) info document text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfoContent {
    pub text: String,
    pub source: InfoSource,
}

/// Raw test-definition source for a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestContent {
    pub text: String,
}

/// Picks info and test content for a step.
#[derive(Debug, Clone)]
pub struct ContentSelector {
    layout: ContentLayout,
}

impl ContentSelector {
    pub fn new(layout: ContentLayout) -> Self {
        Self { layout }
    }

    /// The step's info document, or the shared fallback. Never not-found.
    #[instrument(skip_all, fields(step = %step))]
    pub async fn select_info(&self, step: Step) -> Result<InfoContent> {
        let path = self.layout.step_dir(step).join(&self.layout.info_file);
        if let Some(text) = read_optional_text(&path).await? {
            debug!("info from step");
            return Ok(InfoContent {
                text,
                source: InfoSource::Step,
            });
        }

        debug!("no info for step, using fallback");
        Ok(self.fallback_info().await)
    }

    /// The shared fallback document, or the built-in text when it cannot be read.
    pub async fn fallback_info(&self) -> InfoContent {
        let fallback = &self.layout.fallback_info;
        match read_optional_text(fallback).await {
            Ok(Some(text)) => InfoContent {
                text,
                source: InfoSource::Fallback,
            },
            Ok(None) => {
                warn!(path = %fallback.display(), "fallback info document missing");
                builtin()
            }
            Err(e) => {
                warn!(path = %fallback.display(), error = %e, "fallback info document unreadable");
                builtin()
            }
        }
    }

    /// The step's test definition. Missing or empty is [`StepLabError::NotFound`].
    #[instrument(skip_all, fields(step = %step))]
    pub async fn select_test(&self, step: Step) -> Result<TestContent> {
        let path = self.layout.step_dir(step).join(&self.layout.test_file);
        match read_optional_text(&path).await? {
            Some(text) => Ok(TestContent { text }),
            None => {
                debug!("no test for step");
                Err(StepLabError::not_found(format!(
                    "test definition for {step}"
                )))
            }
        }
    }
}

fn builtin() -> InfoContent {
    InfoContent {
        text: BUILTIN_DONE.to_string(),
        source: InfoSource::Builtin,
    }
}
