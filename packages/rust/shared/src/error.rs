//! Error types for StepLab.
//!
//! Library crates use [`StepLabError`] via `thiserror`.
//! The `steplab` binary wraps this with `color-eyre` for rich diagnostics.
//!
//! A file that simply is not there is *not* an error during resolution; the
//! resolver reports it as a `NotFound` outcome. The variants below are the
//! genuine failures callers must surface.

use std::path::PathBuf;

/// Top-level error type for all StepLab operations.
#[derive(Debug, thiserror::Error)]
pub enum StepLabError {
    /// Nothing satisfies the request (no test definition, unknown page, ...).
    #[error("not found: {what}")]
    NotFound { what: String },

    /// The previous step exists but has nothing to inherit.
    #[error("previous step {step} is empty, nothing to inherit")]
    EmptyPreviousStep { step: String },

    /// A composable asset has no shared base file. The platform runtime is broken.
    #[error("missing base asset {path:?}")]
    MissingBaseAsset { path: PathBuf },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Malformed identifier or request component.
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, StepLabError>;

impl StepLabError {
    /// Create a not-found error describing what was missing.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error should reach clients as a plain not-found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::EmptyPreviousStep { .. })
    }
}
