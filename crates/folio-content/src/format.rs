//! Supported document formats.
//!
//! The set of formats is closed: each one maps to exactly one file extension
//! and one renderer, and knows how its top-level heading is written.

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

static MARKDOWN_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#\s*(.*?)(\s*#+|$)").unwrap());
static HAML_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*%h1\s+(.*)").unwrap());
static TEXTILE_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*h1\.\s+(.*)").unwrap());

static MARKDOWN_HEADING_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#[^#].*$\r?\n(\r?\n)?").unwrap());
static HAML_HEADING_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*%h1\s+.*$\r?\n(\r?\n)?").unwrap());
static TEXTILE_HEADING_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*h1\.\s+.*$\r?\n(\r?\n)?").unwrap());

/// Document format, selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Markdown (`.mdown`).
    Markdown,
    /// Haml templates (`.haml`).
    Haml,
    /// Textile lightweight markup (`.textile`).
    Textile,
}

impl Format {
    /// All formats in lookup priority order.
    pub const ALL: [Format; 3] = [Format::Markdown, Format::Haml, Format::Textile];

    /// File extension for this format (without the dot).
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Markdown => "mdown",
            Self::Haml => "haml",
            Self::Textile => "textile",
        }
    }

    /// Format for a file extension, if supported.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.extension() == ext)
    }

    /// Format for a file path, based on its extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Extract the first top-level heading from markup.
    #[must_use]
    pub fn heading(self, markup: &str) -> Option<String> {
        let re = match self {
            Self::Markdown => &*MARKDOWN_HEADING,
            Self::Haml => &*HAML_HEADING,
            Self::Textile => &*TEXTILE_HEADING,
        };
        re.captures(markup)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim_end().to_owned())
    }

    /// Markup with its first top-level heading line removed.
    ///
    /// One blank line directly after the heading is removed with it.
    #[must_use]
    pub fn strip_heading(self, markup: &str) -> String {
        let re = match self {
            Self::Markdown => &*MARKDOWN_HEADING_LINE,
            Self::Haml => &*HAML_HEADING_LINE,
            Self::Textile => &*TEXTILE_HEADING_LINE,
        };
        re.replace(markup, "").into_owned()
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Markdown => "markdown",
            Self::Haml => "haml",
            Self::Textile => "textile",
        };
        f.write_str(name)
    }
}
