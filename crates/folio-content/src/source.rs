//! Mapping between content files and logical paths.
//!
//! A logical path is the slash-separated, extension-stripped address of a
//! document relative to the content root. `index.<ext>` files stand for their
//! directory, so `guides/index.mdown` and `guides.mdown` both answer to
//! `guides`, and the root page is addressed by the empty path.

use std::path::{Component, Path, PathBuf};

use crate::error::ContentError;
use crate::format::Format;

/// A document file discovered under the content root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Logical path this file answers to (e.g. `""`, `"blog/first-post"`)
    pub path: String,
    /// Document format, from the extension
    pub format: Format,
    /// Absolute path to the file
    pub file: PathBuf,
}

impl SourceFile {
    /// Classify a file under `root` as a document source.
    ///
    /// Returns `None` for files outside `root` or with an unsupported extension.
    #[must_use]
    pub fn classify(file: PathBuf, root: &Path) -> Option<Self> {
        let format = Format::from_path(&file)?;
        let rel_path = file.strip_prefix(root).ok()?;
        let path = logical_path(rel_path);
        Some(Self { path, format, file })
    }
}

/// Convert a file path relative to the content root to a logical path.
///
/// # Examples
///
/// - `index.mdown` -> `""`
/// - `about.textile` -> `"about"`
/// - `blog/index.haml` -> `"blog"`
/// - `blog/first-post.mdown` -> `"blog/first-post"`
#[must_use]
pub fn logical_path(rel_path: &Path) -> String {
    let stem = rel_path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();

    let parent = rel_path
        .parent()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_default();

    if stem == "index" {
        parent
    } else if parent.is_empty() {
        stem.into_owned()
    } else {
        format!("{parent}/{stem}")
    }
}

/// Normalize a requested path into a cache key.
///
/// Drops empty and `.` segments and a trailing `index` segment, so
/// `/a/./b/index` and `a/b` share one key.
#[must_use]
pub fn normalize_key(path: &str) -> String {
    let mut segments: Vec<&str> = path
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();
    if segments.last() == Some(&"index") {
        segments.pop();
    }
    segments.join("/")
}

/// Reject keys that could escape the content root.
///
/// # Errors
///
/// Returns an `InvalidPath` error if the key has a `..` or absolute component.
pub fn validate_key(key: &str) -> Result<(), ContentError> {
    let escapes = Path::new(key)
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(ContentError::invalid_path(key));
    }
    Ok(())
}

/// Candidate files for a normalized key, in lookup order.
///
/// For each format in priority order: `key.<ext>` then `key/index.<ext>`.
/// The root key only has `index.<ext>` candidates.
#[must_use]
pub fn candidates(root: &Path, key: &str) -> Vec<(PathBuf, Format)> {
    let mut files = Vec::with_capacity(Format::ALL.len() * 2);
    for format in Format::ALL {
        let ext = format.extension();
        if key.is_empty() {
            files.push((root.join(format!("index.{ext}")), format));
        } else {
            files.push((root.join(format!("{key}.{ext}")), format));
            files.push((root.join(key).join(format!("index.{ext}")), format));
        }
    }
    files
}
