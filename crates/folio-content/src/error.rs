//! Error types for content loading.
//!
//! A document that does not exist is not an error: lookups return `Ok(None)`.
//! [`ContentError`] is reserved for I/O failures other than "not found" and
//! for requests that are invalid on their face.

use std::path::PathBuf;

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ContentErrorKind {
    /// Permission denied while reading or stating a file.
    PermissionDenied,
    /// Invalid logical path (e.g. escapes the content root).
    InvalidPath,
    /// File exists but is not valid UTF-8.
    InvalidData,
    /// Other/unknown error category.
    Other,
}

/// Content error with semantic kind and underlying source.
#[derive(Debug)]
pub struct ContentError {
    /// Semantic error category.
    pub kind: ContentErrorKind,
    /// Path context (if applicable).
    pub path: Option<PathBuf>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ContentError {
    /// Create a new content error.
    #[must_use]
    pub fn new(kind: ContentErrorKind) -> Self {
        Self {
            kind,
            path: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create an invalid path error.
    #[must_use]
    pub fn invalid_path(path: impl Into<PathBuf>) -> Self {
        Self::new(ContentErrorKind::InvalidPath).with_path(path)
    }

    /// Create a content error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::PermissionDenied => ContentErrorKind::PermissionDenied,
            std::io::ErrorKind::InvalidData => ContentErrorKind::InvalidData,
            _ => ContentErrorKind::Other,
        };
        Self::new(kind).with_source(err).with_path(path)
    }
}

impl std::fmt::Display for ContentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "Kind: message (path: /foo/bar)"
        let kind_str = match self.kind {
            ContentErrorKind::PermissionDenied => "Permission denied",
            ContentErrorKind::InvalidPath => "Invalid path",
            ContentErrorKind::InvalidData => "Invalid data",
            ContentErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for ContentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn test_io_permission_denied() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = ContentError::io(io_err, "/site/pages/a.mdown");

        assert_eq!(err.kind, ContentErrorKind::PermissionDenied);
        assert_eq!(err.path.as_deref(), Some(Path::new("/site/pages/a.mdown")));
    }

    #[test]
    fn test_io_other() {
        let io_err = std::io::Error::other("disk on fire");
        let err = ContentError::io(io_err, "/x");

        assert_eq!(err.kind, ContentErrorKind::Other);
    }

    #[test]
    fn test_display_simple() {
        let err = ContentError::new(ContentErrorKind::Other);
        assert_eq!(err.to_string(), "Error");
    }

    #[test]
    fn test_display_invalid_path() {
        let err = ContentError::invalid_path("../etc/passwd");
        assert_eq!(err.to_string(), "Invalid path (path: ../etc/passwd)");
    }

    #[test]
    fn test_display_full() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = ContentError::io(io_err, "/foo/bar.mdown");

        assert_eq!(
            err.to_string(),
            "Permission denied: access denied (path: /foo/bar.mdown)"
        );
    }

    #[test]
    fn test_source_is_exposed() {
        let io_err = std::io::Error::other("boom");
        let err = ContentError::io(io_err, "/x");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_content_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ContentError>();
    }
}
