//! File resolution and step progression engine for StepLab.
//!
//! This crate decides which physical file answers a tutorial request
//! ([`resolver`]), seeds new steps from their predecessor ([`initializer`]),
//! composes shared runtime assets ([`composer`]) and picks info/test content
//! ([`content`]). [`Tutorial`] bundles them for a given content tree.

pub mod api;
pub mod catalog;
pub mod composer;
pub mod content;
mod files;
pub mod initializer;
pub mod oracle;
pub mod pages;
pub mod resolver;
pub mod tutorial;

#[cfg(test)]
mod test_support;

pub use api::ApiResolver;
pub use composer::AssetComposer;
pub use content::{ContentSelector, InfoContent, InfoSource, TestContent};
pub use initializer::{InitOutcome, SkipReason, StepInitializer};
pub use oracle::{DiskOracle, FileOracle, MemoryOracle};
pub use pages::{PageContext, PageResolver, PageVariant};
pub use resolver::{PathResolver, Resolution, fetch, read_source};
pub use tutorial::Tutorial;
