//! Application configuration for StepLab.
//!
//! User config lives at `~/.steplab/steplab.toml`; `--config` points at any
//! other file. CLI flags override config file values, which override defaults.
//! Every relative content path is interpreted against `content.root`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StepLabError};
use crate::types::Step;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "steplab.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".steplab";

// ---------------------------------------------------------------------------
// Config structs (matching steplab.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where tutorial content lives.
    #[serde(default)]
    pub content: ContentConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// `[content]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Directory containing the `step<N>` directories.
    #[serde(default = "default_root")]
    pub root: String,

    /// Shared application area holding base assets and page templates.
    #[serde(default = "default_app_dir")]
    pub app_dir: String,

    /// Mock API responses.
    #[serde(default = "default_api_dir")]
    pub api_dir: String,

    /// Info document served when a step has none of its own.
    #[serde(default = "default_fallback_info")]
    pub fallback_info: String,

    /// Per-step info document name.
    #[serde(default = "default_info_file")]
    pub info_file: String,

    /// Per-step test-definition file name.
    #[serde(default = "default_test_file")]
    pub test_file: String,

    /// Regex of file names never copied forward between steps.
    #[serde(default = "default_protected_pattern")]
    pub protected_pattern: String,

    /// Assets served as `base ++ step override`.
    #[serde(default = "default_composable")]
    pub composable: Vec<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            app_dir: default_app_dir(),
            api_dir: default_api_dir(),
            fallback_info: default_fallback_info(),
            info_file: default_info_file(),
            test_file: default_test_file(),
            protected_pattern: default_protected_pattern(),
            composable: default_composable(),
        }
    }
}

fn default_root() -> String {
    ".".into()
}
fn default_app_dir() -> String {
    "lib/app".into()
}
fn default_api_dir() -> String {
    "lib/app/api".into()
}
fn default_fallback_info() -> String {
    "lib/done.md".into()
}
fn default_info_file() -> String {
    "README.md".into()
}
fn default_test_file() -> String {
    ".test.js".into()
}
fn default_protected_pattern() -> String {
    "test|README".into()
}
fn default_composable() -> Vec<String> {
    vec!["index.js".into(), "index.css".into(), "sw.js".into()]
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address.
    #[serde(default = "default_addr")]
    pub addr: String,

    /// `max-age` (seconds) for step and shared assets.
    #[serde(default = "default_asset_max_age")]
    pub asset_max_age: u32,

    /// `max-age` (seconds) for mock API responses.
    #[serde(default = "default_api_max_age")]
    pub api_max_age: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            asset_max_age: default_asset_max_age(),
            api_max_age: default_api_max_age(),
        }
    }
}

fn default_addr() -> String {
    "127.0.0.1:3333".into()
}
fn default_asset_max_age() -> u32 {
    240
}
fn default_api_max_age() -> u32 {
    120
}

// ---------------------------------------------------------------------------
// Content layout (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Resolved directory roots handed to every core component.
#[derive(Debug, Clone)]
pub struct ContentLayout {
    /// Directory containing `step<N>` directories.
    pub root: PathBuf,
    /// Shared application area.
    pub app_dir: PathBuf,
    /// Mock API directory.
    pub api_dir: PathBuf,
    /// Fallback info document.
    pub fallback_info: PathBuf,
    /// Per-step info document name.
    pub info_file: String,
    /// Per-step test-definition file name.
    pub test_file: String,
    /// Regex of file names excluded from forward-copy.
    pub protected_pattern: String,
    /// Composable asset names.
    pub composable: Vec<String>,
}

impl ContentLayout {
    /// Build a layout rooted at `root` with default file names.
    pub fn rooted_at(root: impl Into<PathBuf>) -> Self {
        let mut config = AppConfig::default();
        config.content.root = root.into().to_string_lossy().into_owned();
        Self::from(&config)
    }

    /// Replace the content root, re-anchoring the other default-relative paths.
    pub fn with_root(config: &AppConfig, root: impl Into<PathBuf>) -> Self {
        let mut config = config.clone();
        config.content.root = root.into().to_string_lossy().into_owned();
        Self::from(&config)
    }

    pub fn step_dir(&self, step: Step) -> PathBuf {
        self.root.join(step.dir_name())
    }

    pub fn app_file(&self, name: &str) -> PathBuf {
        self.app_dir.join(name)
    }

    pub fn is_composable(&self, name: &str) -> bool {
        self.composable.iter().any(|c| c == name)
    }
}

impl From<&AppConfig> for ContentLayout {
    fn from(config: &AppConfig) -> Self {
        let c = &config.content;
        let root = PathBuf::from(&c.root);
        Self {
            app_dir: root.join(&c.app_dir),
            api_dir: root.join(&c.api_dir),
            fallback_info: root.join(&c.fallback_info),
            info_file: c.info_file.clone(),
            test_file: c.test_file.clone(),
            protected_pattern: c.protected_pattern.clone(),
            composable: c.composable.clone(),
            root,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.steplab/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| StepLabError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.steplab/steplab.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| StepLabError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        StepLabError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| StepLabError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| StepLabError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| StepLabError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Reject configs the core cannot work with.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    let c = &config.content;
    regex::Regex::new(&c.protected_pattern).map_err(|e| {
        StepLabError::config(format!("invalid protected_pattern {:?}: {e}", c.protected_pattern))
    })?;

    if let Some(bad) = c
        .composable
        .iter()
        .find(|name| !crate::types::is_plain_name(name))
    {
        return Err(StepLabError::config(format!(
            "composable asset {bad:?} must be a plain file name"
        )));
    }

    for (key, name) in [("info_file", &c.info_file), ("test_file", &c.test_file)] {
        if !crate::types::is_plain_name(name) {
            return Err(StepLabError::config(format!(
                "{key} {name:?} must be a plain file name"
            )));
        }
    }

    Ok(())
}
