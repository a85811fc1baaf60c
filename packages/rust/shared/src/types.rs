//! Core domain types for StepLab tutorials.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StepLabError};

/// Directory name prefix shared by every step.
pub const STEP_PREFIX: &str = "step";

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// A numbered tutorial unit backed by the directory `step<N>`.
///
/// Ordering is numeric: `step2 < step10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Step(u32);

impl Step {
    pub fn new(number: u32) -> Self {
        Self(number)
    }

    /// Parse `step<N>`. Leading zeros are rejected so that every step maps
    /// to exactly one directory name.
    pub fn parse(s: &str) -> Result<Self> {
        let digits = s
            .strip_prefix(STEP_PREFIX)
            .ok_or_else(|| StepLabError::validation(format!("not a step: {s:?}")))?;

        if digits.is_empty()
            || !digits.bytes().all(|b| b.is_ascii_digit())
            || (digits.len() > 1 && digits.starts_with('0'))
        {
            return Err(StepLabError::validation(format!("not a step: {s:?}")));
        }

        digits
            .parse::<u32>()
            .map(Self)
            .map_err(|e| StepLabError::validation(format!("step number {digits:?}: {e}")))
    }

    pub fn number(self) -> u32 {
        self.0
    }

    /// The step this one inherits from, `step(N-1)`. `None` for `step0`.
    pub fn previous(self) -> Option<Self> {
        self.0.checked_sub(1).map(Self)
    }

    /// Directory name of this step (`step<N>`).
    pub fn dir_name(self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{STEP_PREFIX}{}", self.0)
    }
}

impl std::str::FromStr for Step {
    type Err = StepLabError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Step {
    type Error = StepLabError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<Step> for String {
    fn from(step: Step) -> Self {
        step.to_string()
    }
}

// ---------------------------------------------------------------------------
// Article
// ---------------------------------------------------------------------------

static ARTICLE_PAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d\.\d{8}\.html$").expect("valid regex"));

/// An optional named sub-resource within a step.
///
/// Either a free-form slug (info/test panels, asset sub-directories) or an
/// app article page of the form `<digit>.<8 digits>.html`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Article(String);

impl Article {
    pub fn parse(s: &str) -> Result<Self> {
        if !is_plain_name(s) {
            return Err(StepLabError::validation(format!("not an article: {s:?}")));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The page id (`1.23456789`) when this article names an app article page.
    pub fn page_id(&self) -> Option<&str> {
        if ARTICLE_PAGE_RE.is_match(&self.0) {
            self.0.strip_suffix(".html")
        } else {
            None
        }
    }
}

impl std::fmt::Display for Article {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether the article pattern of app pages matches `name`.
pub fn is_article_page(name: &str) -> bool {
    ARTICLE_PAGE_RE.is_match(name)
}

/// A single, non-empty path component made of `[A-Za-z0-9._-]`, never `.` or `..`.
///
/// Anything else could escape the step directory and is refused before it
/// reaches the filesystem.
pub fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
}

// ---------------------------------------------------------------------------
// AssetKind
// ---------------------------------------------------------------------------

/// Classification of a requested file, derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Script,
    Style,
    Worker,
    Markup,
    Image,
    Data,
    Plain,
}

impl AssetKind {
    pub fn of(filename: &str) -> Self {
        if filename == "sw.js" {
            return Self::Worker;
        }
        match extension(filename).as_deref() {
            Some("js" | "mjs") => Self::Script,
            Some("css") => Self::Style,
            Some("html" | "htm") => Self::Markup,
            Some("jpg" | "jpeg" | "gif" | "webp" | "png" | "svg") => Self::Image,
            Some("json") => Self::Data,
            _ => Self::Plain,
        }
    }
}

/// HTTP content type for `filename`.
pub fn content_type(filename: &str) -> &'static str {
    match AssetKind::of(filename) {
        AssetKind::Script | AssetKind::Worker => "application/javascript; charset=utf-8",
        AssetKind::Style => "text/css; charset=utf-8",
        AssetKind::Markup => "text/html; charset=utf-8",
        AssetKind::Data => "application/json",
        AssetKind::Plain => "text/plain; charset=utf-8",
        AssetKind::Image => match extension(filename).as_deref() {
            Some("jpg" | "jpeg") => "image/jpeg",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            Some("png") => "image/png",
            _ => "image/svg+xml",
        },
    }
}

fn extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

// ---------------------------------------------------------------------------
// FileRequest
// ---------------------------------------------------------------------------

/// The unit of resolution: which file of which step (and article) is wanted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRequest {
    pub step: Step,
    pub article: Option<Article>,
    pub filename: String,
    pub kind: AssetKind,
}

impl FileRequest {
    pub fn new(step: Step, article: Option<Article>, filename: impl Into<String>) -> Self {
        let filename = filename.into();
        let kind = AssetKind::of(&filename);
        Self {
            step,
            article,
            filename,
            kind,
        }
    }
}

// ---------------------------------------------------------------------------
// ResolvedSource
// ---------------------------------------------------------------------------

/// Where a resolved body came from. Drives cache policy in the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceOrigin {
    StepSpecific,
    SharedBase,
    Composed,
    None,
}

impl std::fmt::Display for SourceOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::StepSpecific => "step-specific",
            Self::SharedBase => "shared-base",
            Self::Composed => "composed",
            Self::None => "none",
        };
        f.write_str(s)
    }
}

/// A body synthesized from the shared base asset and a step override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedAsset {
    /// `base ++ separator ++ step ++ separator`.
    pub body: Vec<u8>,
    pub content_type: &'static str,
    /// Quoted hex SHA-256 of `body`, usable as an HTTP `ETag`.
    pub etag: String,
}

impl ComposedAsset {
    /// Exact byte length of the composed body.
    pub fn content_length(&self) -> usize {
        self.body.len()
    }
}

/// Outcome of resolving a [`FileRequest`], tagged with its precedence level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedSource {
    StepSpecific(PathBuf),
    SharedBase(PathBuf),
    Synthesized(ComposedAsset),
    NotFound,
}

impl ResolvedSource {
    pub fn origin(&self) -> SourceOrigin {
        match self {
            Self::StepSpecific(_) => SourceOrigin::StepSpecific,
            Self::SharedBase(_) => SourceOrigin::SharedBase,
            Self::Synthesized(_) => SourceOrigin::Composed,
            Self::NotFound => SourceOrigin::None,
        }
    }

    /// Filesystem path backing this source, if it is a single file.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::StepSpecific(p) | Self::SharedBase(p) => Some(p),
            Self::Synthesized(_) | Self::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        !matches!(self, Self::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_parse_and_display() {
        let step: Step = "step12".parse().expect("parse step");
        assert_eq!(step.number(), 12);
        assert_eq!(step.to_string(), "step12");
        assert_eq!(step.dir_name(), "step12");
    }

    #[test]
    fn step_rejects_malformed() {
        for bad in ["", "step", "stepx", "step-1", "Step1", "step01", "step1/", "step+1"] {
            assert!(Step::parse(bad).is_err(), "{bad:?} should not parse");
        }
        assert!(Step::parse("step0").is_ok());
    }

    #[test]
    fn step_ordering_is_numeric() {
        let mut steps: Vec<Step> = ["step10", "step2", "step0"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        steps.sort();
        let names: Vec<String> = steps.iter().map(Step::to_string).collect();
        assert_eq!(names, vec!["step0", "step2", "step10"]);
    }

    #[test]
    fn step_previous() {
        assert_eq!(Step::new(5).previous(), Some(Step::new(4)));
        assert_eq!(Step::new(0).previous(), None);
    }

    #[test]
    fn step_serde_as_string() {
        let json = serde_json::to_string(&Step::new(3)).expect("serialize");
        assert_eq!(json, "\"step3\"");
        let parsed: Step = serde_json::from_str("\"step7\"").expect("deserialize");
        assert_eq!(parsed, Step::new(7));
        assert!(serde_json::from_str::<Step>("\"lesson7\"").is_err());
    }

    #[test]
    fn article_page_pattern() {
        let page = Article::parse("1.20230401.html").expect("parse");
        assert_eq!(page.page_id(), Some("1.20230401"));

        let slug = Article::parse("intro").expect("parse");
        assert_eq!(slug.page_id(), None);

        assert!(!is_article_page("12.20230401.html"));
        assert!(!is_article_page("1.2023040.html"));
        assert!(Article::parse("../secret").is_err());
        assert!(Article::parse("..").is_err());
    }

    #[test]
    fn plain_names() {
        assert!(is_plain_name("index.js"));
        assert!(is_plain_name(".test.js"));
        assert!(!is_plain_name("a/b.js"));
        assert!(!is_plain_name("a\\b.js"));
        assert!(!is_plain_name(""));
        assert!(!is_plain_name(".."));
    }

    #[test]
    fn asset_kinds() {
        assert_eq!(AssetKind::of("sw.js"), AssetKind::Worker);
        assert_eq!(AssetKind::of("index.js"), AssetKind::Script);
        assert_eq!(AssetKind::of("index.css"), AssetKind::Style);
        assert_eq!(AssetKind::of("home.html"), AssetKind::Markup);
        assert_eq!(AssetKind::of("cat.WEBP"), AssetKind::Image);
        assert_eq!(AssetKind::of("manifest.json"), AssetKind::Data);
        assert_eq!(AssetKind::of("README"), AssetKind::Plain);
    }

    #[test]
    fn content_types() {
        assert_eq!(content_type("sw.js"), "application/javascript; charset=utf-8");
        assert_eq!(content_type("photo.jpg"), "image/jpeg");
        assert_eq!(content_type("anim.gif"), "image/gif");
        assert_eq!(content_type("data.json"), "application/json");
    }

    #[test]
    fn resolved_source_origin() {
        assert_eq!(
            ResolvedSource::StepSpecific("step1/a.js".into()).origin(),
            SourceOrigin::StepSpecific
        );
        assert_eq!(ResolvedSource::NotFound.origin(), SourceOrigin::None);
        assert!(!ResolvedSource::NotFound.is_found());
        assert_eq!(
            ResolvedSource::SharedBase("lib/app/a.js".into()).path(),
            Some(Path::new("lib/app/a.js"))
        );
    }

    #[test]
    fn file_request_derives_kind() {
        let req = FileRequest::new(Step::new(1), None, "style.css");
        assert_eq!(req.kind, AssetKind::Style);
    }
}
