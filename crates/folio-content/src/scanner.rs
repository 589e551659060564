//! Document discovery by filesystem walking.
//!
//! The scanner only identifies files that could be documents. Reading and
//! parsing is left to [`ContentStore`](crate::ContentStore), so bulk listing
//! goes through the same cached load path as single lookups.

use std::fs;
use std::path::{Path, PathBuf};

use crate::source::SourceFile;

/// Walks a content root for files with a supported extension.
pub(crate) struct Scanner {
    root: PathBuf,
}

impl Scanner {
    /// Create a scanner for a content root.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Scan the tree and return discovered documents, sorted by file path.
    ///
    /// Returns an empty Vec if the root doesn't exist.
    pub fn scan(&self) -> Vec<SourceFile> {
        let mut sources = Vec::new();
        if self.root.exists() {
            self.scan_directory(&self.root, &mut sources);
        }
        sources.sort_by(|a, b| a.file.cmp(&b.file));
        sources
    }

    fn scan_directory(&self, dir_path: &Path, sources: &mut Vec<SourceFile>) {
        let Ok(entries) = fs::read_dir(dir_path) else {
            tracing::debug!(path = %dir_path.display(), "Skipping unreadable directory");
            return;
        };

        for entry in entries.filter_map(Result::ok) {
            // Skip hidden files/dirs
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }

            let path = entry.path();
            if entry.file_type().is_ok_and(|t| t.is_dir()) {
                self.scan_directory(&path, sources);
            } else if let Some(source) = SourceFile::classify(path, &self.root) {
                sources.push(source);
            }
        }
    }
}
