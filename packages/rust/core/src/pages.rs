//! App page dispatch.
//!
//! A step serves two kinds of page: its home page and article pages named
//! `<digit>.<8 digits>.html`. Each variant maps to a fixed template file,
//! resolved like any other file so a step may ship its own template.

use serde::Serialize;
use tracing::{debug, instrument};

use steplab_shared::{Article, FileRequest, ResolvedSource, Result, Step, StepLabError};

use crate::resolver::PathResolver;

/// File that marks a step as shipping a web app manifest.
pub const MANIFEST_FILE: &str = "manifest.json";

/// The finite set of app pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum PageVariant {
    Home,
    Article { id: String },
}

impl PageVariant {
    /// `None` article is the home page; otherwise it must match the article
    /// page pattern.
    pub fn from_article(article: Option<&Article>) -> Result<Self> {
        match article {
            None => Ok(Self::Home),
            Some(a) => a
                .page_id()
                .map(|id| Self::Article { id: id.to_string() })
                .ok_or_else(|| StepLabError::not_found(format!("page {a}"))),
        }
    }

    /// Template file that renders this variant.
    pub fn template(&self) -> &'static str {
        match self {
            Self::Home => "home.html",
            Self::Article { .. } => "article.html",
        }
    }
}

/// Everything the page renderer needs for one request.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub step: Step,
    pub variant: PageVariant,
    pub template: ResolvedSource,
    pub has_manifest: bool,
}

/// Resolves app pages through a [`PathResolver`].
#[derive(Debug, Clone)]
pub struct PageResolver {
    resolver: PathResolver,
}

impl PageResolver {
    pub fn new(resolver: PathResolver) -> Self {
        Self { resolver }
    }

    #[instrument(skip_all, fields(step = %step))]
    pub async fn page(&self, step: Step, article: Option<&Article>) -> Result<PageContext> {
        let variant = PageVariant::from_article(article)?;
        let request = FileRequest::new(step, None, variant.template());
        let template = self.resolver.resolve(&request).await?;

        if !template.is_found() {
            return Err(StepLabError::not_found(format!(
                "{} for {step}",
                variant.template()
            )));
        }

        let manifest = self
            .resolver
            .layout()
            .step_dir(step)
            .join(MANIFEST_FILE);
        let has_manifest = self.resolver.oracle().is_file(&manifest);

        debug!(?variant, origin = %template.origin(), has_manifest, "app page");

        Ok(PageContext {
            step,
            variant,
            template,
            has_manifest,
        })
    }
}
