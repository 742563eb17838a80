//! Decides which traversal entries end up in the manifest.
//!
//! Only regular files under the root are recorded. The root itself and the
//! tool's own bookkeeping paths are never eligible, and traversal is pruned at
//! the manifest directory so nothing inside it is visited.

use std::path::{Path, PathBuf};
use walkdir::DirEntry;

#[derive(Debug, Clone)]
pub struct PathFilter {
    root: PathBuf,
    manifest_dir: PathBuf,
    manifest_file: PathBuf,
}

impl PathFilter {
    pub fn new(root: &Path, manifest_dir: &Path, manifest_file: &Path) -> Self {
        PathFilter {
            root: normalize(root),
            manifest_dir: normalize(manifest_dir),
            manifest_file: normalize(manifest_file),
        }
    }

    /// Whether the walker should yield this entry (and, for directories,
    /// descend into it).
    pub fn should_visit(&self, entry: &DirEntry) -> bool {
        !self.is_reserved(entry.path())
    }

    pub fn is_eligible(&self, entry: &DirEntry) -> bool {
        self.is_eligible_path(entry.path(), entry.file_type().is_file())
    }

    pub fn is_eligible_path(&self, path: &Path, is_regular_file: bool) -> bool {
        if !is_regular_file {
            return false;
        }

        let path = normalize(path);
        !path.as_os_str().is_empty() && path != self.root && !self.is_reserved(&path)
    }

    fn is_reserved(&self, path: &Path) -> bool {
        path == self.manifest_dir || path == self.manifest_file
    }
}

/// Strips trailing separators and interior `.` segments.
fn normalize(path: &Path) -> PathBuf {
    path.components().collect()
}
