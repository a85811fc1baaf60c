//! File-existence oracles.
//!
//! Resolution decisions only ever ask "is there a file / directory here?".
//! Putting that question behind [`FileOracle`] keeps the decision pure and
//! lets tests describe a virtual tree without touching the disk.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Answers existence questions about the content tree.
pub trait FileOracle: Send + Sync {
    /// `true` if `path` exists and is a regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// `true` if `path` exists and is a directory.
    fn is_dir(&self, path: &Path) -> bool;
}

/// Oracle backed by the real filesystem. Nothing is cached.
///
/// Each check is a single blocking `stat`, made inline on the calling task.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskOracle;

impl FileOracle for DiskOracle {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

/// In-memory oracle describing a virtual tree.
///
/// Adding a file implicitly adds every ancestor directory.
#[derive(Debug, Clone, Default)]
pub struct MemoryOracle {
    files: HashSet<PathBuf>,
    dirs: HashSet<PathBuf>,
}

impl MemoryOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.add_ancestors(&path);
        self.files.insert(path);
        self
    }

    pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.add_ancestors(&path);
        self.dirs.insert(path);
        self
    }

    fn add_ancestors(&mut self, path: &Path) {
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(ancestor.to_path_buf());
        }
    }
}

impl FileOracle for MemoryOracle {
    fn is_file(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }
}
