//! Layered file resolution for step requests.
//!
//! [`PathResolver::decide`] is a pure function of the request and whatever
//! the [`FileOracle`] reports; [`PathResolver::resolve`] executes the decision,
//! which only does I/O when an asset has to be composed.
//!
//! Precedence, first match wins:
//! 1. the step directory must exist, otherwise `NotFound`
//! 2. composable asset names are handed to the [`AssetComposer`]
//! 3. `step<N>/<article>/<file>`, then `step<N>/<file>`
//! 4. `<app_dir>/<file>`
//! 5. `NotFound`

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, instrument};

use steplab_shared::{
    ContentLayout, FileRequest, ResolvedSource, Result, StepLabError, is_plain_name,
};

use crate::composer::AssetComposer;
use crate::files::read_optional;
use crate::oracle::{DiskOracle, FileOracle};

/// What the resolver decided for a request, before any file is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Hand off to the asset composer.
    Compose,
    StepSpecific(PathBuf),
    SharedBase(PathBuf),
    NotFound,
}

/// Maps a [`FileRequest`] to the source that satisfies it.
#[derive(Clone)]
pub struct PathResolver {
    layout: ContentLayout,
    composer: AssetComposer,
    oracle: Arc<dyn FileOracle>,
}

impl std::fmt::Debug for PathResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathResolver")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl PathResolver {
    /// Resolver backed by the real filesystem.
    pub fn new(layout: ContentLayout) -> Self {
        Self::with_oracle(layout, Arc::new(DiskOracle))
    }

    pub fn with_oracle(layout: ContentLayout, oracle: Arc<dyn FileOracle>) -> Self {
        Self {
            composer: AssetComposer::new(layout.clone()),
            layout,
            oracle,
        }
    }

    pub fn layout(&self) -> &ContentLayout {
        &self.layout
    }

    pub fn oracle(&self) -> &dyn FileOracle {
        self.oracle.as_ref()
    }

    /// Decide which source satisfies `request`. No side effects.
    pub fn decide(&self, request: &FileRequest) -> Resolution {
        if !is_plain_name(&request.filename) {
            return Resolution::NotFound;
        }

        let step_dir = self.layout.step_dir(request.step);
        if !self.oracle.is_dir(&step_dir) {
            return Resolution::NotFound;
        }

        if self.layout.is_composable(&request.filename) {
            return Resolution::Compose;
        }

        if let Some(article) = &request.article {
            let scoped = step_dir.join(article.as_str()).join(&request.filename);
            if self.oracle.is_file(&scoped) {
                return Resolution::StepSpecific(scoped);
            }
        }

        let step_file = step_dir.join(&request.filename);
        if self.oracle.is_file(&step_file) {
            return Resolution::StepSpecific(step_file);
        }

        let base = self.layout.app_file(&request.filename);
        if self.oracle.is_file(&base) {
            return Resolution::SharedBase(base);
        }

        Resolution::NotFound
    }

    /// Resolve `request`, composing the body when the decision says so.
    #[instrument(skip_all, fields(step = %request.step, file = %request.filename))]
    pub async fn resolve(&self, request: &FileRequest) -> Result<ResolvedSource> {
        let source = match self.decide(request) {
            Resolution::Compose => ResolvedSource::Synthesized(
                self.composer.compose(request.step, &request.filename).await?,
            ),
            Resolution::StepSpecific(path) => ResolvedSource::StepSpecific(path),
            Resolution::SharedBase(path) => ResolvedSource::SharedBase(path),
            Resolution::NotFound => ResolvedSource::NotFound,
        };

        debug!(origin = %source.origin(), "resolved");
        Ok(source)
    }
}

/// Read the body behind a resolved source. `None` for `NotFound`.
///
/// A file that disappeared between resolution and reading is also `None`.
pub async fn read_source(source: &ResolvedSource) -> Result<Option<Vec<u8>>> {
    match source {
        ResolvedSource::StepSpecific(path) | ResolvedSource::SharedBase(path) => {
            read_optional(path).await
        }
        ResolvedSource::Synthesized(asset) => Ok(Some(asset.body.clone())),
        ResolvedSource::NotFound => Ok(None),
    }
}

/// Resolve and read in one go, failing with `NotFound` when nothing matches.
pub async fn fetch(
    resolver: &PathResolver,
    request: &FileRequest,
) -> Result<(ResolvedSource, Vec<u8>)> {
    let source = resolver.resolve(request).await?;
    match read_source(&source).await? {
        Some(body) => Ok((source, body)),
        None => Err(StepLabError::not_found(format!(
            "{}/{}",
            request.step, request.filename
        ))),
    }
}
