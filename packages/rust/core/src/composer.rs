//! Composable asset concatenation.
//!
//! A handful of assets (the shared runtime script, stylesheet and service
//! worker) are never served from a single file. The shared base always comes
//! first so a step can append to it or redefine what it declares.

use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use steplab_shared::{ComposedAsset, ContentLayout, Result, Step, StepLabError, content_type};

use crate::files::read_optional;

/// Blank-line delimiter placed after the base and after the step content.
pub const SEPARATOR: &[u8] = b"\n\n";

/// Builds `base ++ SEPARATOR ++ step ++ SEPARATOR` bodies.
#[derive(Debug, Clone)]
pub struct AssetComposer {
    layout: ContentLayout,
}

impl AssetComposer {
    pub fn new(layout: ContentLayout) -> Self {
        Self { layout }
    }

    pub fn is_composable(&self, name: &str) -> bool {
        self.layout.is_composable(name)
    }

    /// Compose `name` for `step`.
    ///
    /// A missing step override counts as empty. A missing base file is a
    /// [`StepLabError::MissingBaseAsset`].
    #[instrument(skip_all, fields(step = %step, asset = name))]
    pub async fn compose(&self, step: Step, name: &str) -> Result<ComposedAsset> {
        if !self.is_composable(name) {
            return Err(StepLabError::validation(format!(
                "{name:?} is not a composable asset"
            )));
        }

        let base_path = self.layout.app_file(name);
        let base = read_optional(&base_path)
            .await?
            .ok_or(StepLabError::MissingBaseAsset { path: base_path })?;

        let step_path = self.layout.step_dir(step).join(name);
        let step_content = read_optional(&step_path).await?.unwrap_or_default();

        let body = concat(&base, &step_content);
        let etag = entity_tag(&body);

        debug!(
            base_len = base.len(),
            step_len = step_content.len(),
            total = body.len(),
            "composed asset"
        );

        Ok(ComposedAsset {
            body,
            content_type: content_type(name),
            etag,
        })
    }
}

/// `base ++ SEPARATOR ++ step ++ SEPARATOR`.
pub fn concat(base: &[u8], step: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(base.len() + step.len() + 2 * SEPARATOR.len());
    body.extend_from_slice(base);
    body.extend_from_slice(SEPARATOR);
    body.extend_from_slice(step);
    body.extend_from_slice(SEPARATOR);
    body
}

fn entity_tag(body: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body);
    format!("\"{:x}\"", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TempTree;

    #[test]
    fn concat_puts_base_first() {
        assert_eq!(concat(b"A", b"B"), b"A\n\nB\n\n".to_vec());
        assert_eq!(concat(b"A", b""), b"A\n\n\n\n".to_vec());
    }

    #[tokio::test]
    async fn compose_base_then_step() {
        let tree = TempTree::new("compose");
        tree.write("lib/app/index.js", "A");
        tree.write("step2/index.js", "B");

        let composer = AssetComposer::new(tree.layout());
        let asset = composer.compose(Step::new(2), "index.js").await.unwrap();

        assert_eq!(asset.body, b"A\n\nB\n\n");
        assert_eq!(asset.content_length(), 6);
        assert_eq!(asset.content_type, "application/javascript; charset=utf-8");
        assert!(asset.etag.starts_with('"') && asset.etag.ends_with('"'));
    }

    #[tokio::test]
    async fn missing_step_override_is_empty() {
        let tree = TempTree::new("compose-empty");
        tree.write("lib/app/index.css", "body{}");
        tree.mkdir("step1");

        let composer = AssetComposer::new(tree.layout());
        let asset = composer.compose(Step::new(1), "index.css").await.unwrap();
        assert_eq!(asset.body, b"body{}\n\n\n\n");
        assert_eq!(asset.content_type, "text/css; charset=utf-8");
    }

    #[tokio::test]
    async fn content_length_counts_bytes_not_chars() {
        let tree = TempTree::new("compose-utf8");
        tree.write("lib/app/sw.js", "// é");
        tree.write("step3/sw.js", "// ü");

        let composer = AssetComposer::new(tree.layout());
        let asset = composer.compose(Step::new(3), "sw.js").await.unwrap();
        assert_eq!(asset.content_length(), "// é\n\n// ü\n\n".len());
        assert_eq!(asset.content_length(), 14);
    }

    #[tokio::test]
    async fn missing_base_is_fatal() {
        let tree = TempTree::new("compose-nobase");
        tree.write("step2/index.js", "B");

        let composer = AssetComposer::new(tree.layout());
        let err = composer.compose(Step::new(2), "index.js").await.unwrap_err();
        assert!(matches!(err, StepLabError::MissingBaseAsset { .. }));
    }

    #[tokio::test]
    async fn non_composable_rejected() {
        let tree = TempTree::new("compose-reject");
        let composer = AssetComposer::new(tree.layout());
        let err = composer.compose(Step::new(2), "app.js").await.unwrap_err();
        assert!(matches!(err, StepLabError::Validation { .. }));
    }

    #[tokio::test]
    async fn identical_bodies_share_etag() {
        let tree = TempTree::new("compose-etag");
        tree.write("lib/app/index.js", "A");
        tree.mkdir("step1");
        tree.mkdir("step2");

        let composer = AssetComposer::new(tree.layout());
        let one = composer.compose(Step::new(1), "index.js").await.unwrap();
        let two = composer.compose(Step::new(2), "index.js").await.unwrap();
        assert_eq!(one.etag, two.etag);
    }
}
