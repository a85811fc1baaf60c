//! Mock JSON API backed by files.
//!
//! `users/42` is answered by `<api_dir>/users/42.json`, or failing that by
//! `<api_dir>/users/42/index.json`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use steplab_shared::{Result, is_plain_name};

use crate::files;
use crate::oracle::{DiskOracle, FileOracle};

#[derive(Clone)]
pub struct ApiResolver {
    api_dir: PathBuf,
    oracle: Arc<dyn FileOracle>,
}

impl std::fmt::Debug for ApiResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiResolver")
            .field("api_dir", &self.api_dir)
            .finish_non_exhaustive()
    }
}

impl ApiResolver {
    pub fn new(api_dir: impl Into<PathBuf>) -> Self {
        Self::with_oracle(api_dir, Arc::new(DiskOracle))
    }

    pub fn with_oracle(api_dir: impl Into<PathBuf>, oracle: Arc<dyn FileOracle>) -> Self {
        Self {
            api_dir: api_dir.into(),
            oracle,
        }
    }

    pub fn api_dir(&self) -> &Path {
        &self.api_dir
    }

    /// The JSON file answering `method`, if any.
    pub fn resolve(&self, method: &str) -> Option<PathBuf> {
        let segments: Vec<&str> = method.trim_matches('/').split('/').collect();
        if segments.iter().any(|s| !is_plain_name(s)) {
            return None;
        }

        let (last, parents) = segments.split_last()?;
        let dir = parents
            .iter()
            .fold(self.api_dir.clone(), |acc, s| acc.join(s));

        let direct = dir.join(format!("{last}.json"));
        if self.oracle.is_file(&direct) {
            return Some(direct);
        }

        let index = dir.join(last).join("index.json");
        self.oracle.is_file(&index).then_some(index)
    }

    /// Body of the JSON file answering `method`, or `None` if there is none.
    pub async fn load(&self, method: &str) -> Result<Option<Vec<u8>>> {
        match self.resolve(method) {
            Some(path) => files::read_optional(&path).await,
            None => Ok(None),
        }
    }
}
