//! Small async filesystem helpers shared by the core components.

use std::io::ErrorKind;
use std::path::Path;

use steplab_shared::{Result, StepLabError};

/// Read a file, mapping "not there" to `None`. Any other failure is an error.
pub(crate) async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StepLabError::io(path, e)),
    }
}

/// Like [`read_optional`], decoding as UTF-8 (lossy) and treating an empty
/// file the same as a missing one.
pub(crate) async fn read_optional_text(path: &Path) -> Result<Option<String>> {
    Ok(read_optional(path)
        .await?
        .filter(|bytes| !bytes.is_empty())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
}

/// `true` if anything (file, directory, symlink) exists at `path`.
pub(crate) async fn exists(path: &Path) -> Result<bool> {
    tokio::fs::try_exists(path)
        .await
        .map_err(|e| StepLabError::io(path, e))
}

/// `true` if `path` is an existing directory; `false` if missing or not a directory.
pub(crate) async fn is_dir(path: &Path) -> Result<bool> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(meta.is_dir()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(StepLabError::io(path, e)),
    }
}
