//! Shared types, error model, and configuration for StepLab.
//!
//! This crate is the foundation depended on by all other StepLab crates.
//! It provides:
//! - [`StepLabError`] — the unified error type
//! - Domain types ([`Step`], [`Article`], [`AssetKind`], [`FileRequest`], [`ResolvedSource`])
//! - Configuration ([`AppConfig`], [`ContentLayout`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ContentConfig, ContentLayout, ServerConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, validate_config,
};
pub use error::{Result, StepLabError};
pub use types::{
    Article, AssetKind, ComposedAsset, FileRequest, ResolvedSource, STEP_PREFIX, SourceOrigin,
    Step, content_type, is_article_page, is_plain_name,
};
