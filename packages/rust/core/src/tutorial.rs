//! The assembled engine: every core component built from one [`ContentLayout`].

use std::sync::Arc;

use steplab_shared::{ContentLayout, Result, Step};

use crate::api::ApiResolver;
use crate::catalog;
use crate::content::ContentSelector;
use crate::initializer::StepInitializer;
use crate::oracle::{DiskOracle, FileOracle};
use crate::pages::PageResolver;
use crate::resolver::PathResolver;

/// Immutable bundle of the core components for one tutorial tree.
///
/// Cheap to clone; holds no mutable state, so a single value can serve any
/// number of concurrent requests.
#[derive(Debug, Clone)]
pub struct Tutorial {
    layout: ContentLayout,
    pub resolver: PathResolver,
    pub initializer: StepInitializer,
    pub content: ContentSelector,
    pub pages: PageResolver,
    pub api: ApiResolver,
}

impl Tutorial {
    /// Build the engine over the real filesystem.
    pub fn new(layout: ContentLayout) -> Result<Self> {
        Self::with_oracle(layout, Arc::new(DiskOracle))
    }

    pub fn with_oracle(layout: ContentLayout, oracle: Arc<dyn FileOracle>) -> Result<Self> {
        let resolver = PathResolver::with_oracle(layout.clone(), Arc::clone(&oracle));
        Ok(Self {
            initializer: StepInitializer::new(layout.clone())?,
            content: ContentSelector::new(layout.clone()),
            pages: PageResolver::new(resolver.clone()),
            api: ApiResolver::with_oracle(layout.api_dir.clone(), oracle),
            resolver,
            layout,
        })
    }

    pub fn layout(&self) -> &ContentLayout {
        &self.layout
    }

    /// Steps present on disk, in order.
    pub async fn steps(&self) -> Result<Vec<Step>> {
        catalog::list_steps(&self.layout).await
    }
}
