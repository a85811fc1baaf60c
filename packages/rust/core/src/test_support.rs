//! Temporary content trees for tests.

use std::path::{Path, PathBuf};

use steplab_shared::ContentLayout;
use uuid::Uuid;

/// A throwaway content root under the system temp dir, removed on drop.
pub(crate) struct TempTree {
    root: PathBuf,
}

impl TempTree {
    pub(crate) fn new(label: &str) -> Self {
        let root = std::env::temp_dir().join(format!("steplab-{label}-{}", Uuid::now_v7()));
        std::fs::create_dir_all(&root).expect("create temp root");
        Self { root }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.root
    }

    pub(crate) fn layout(&self) -> ContentLayout {
        ContentLayout::rooted_at(&self.root)
    }

    pub(crate) fn mkdir(&self, rel: &str) -> PathBuf {
        let dir = self.root.join(rel);
        std::fs::create_dir_all(&dir).expect("create dir");
        dir
    }

    pub(crate) fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(&path, content).expect("write file");
        path
    }

    pub(crate) fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.root.join(rel)).expect("read file")
    }

    pub(crate) fn exists(&self, rel: &str) -> bool {
        self.root.join(rel).exists()
    }
}

impl Drop for TempTree {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}
