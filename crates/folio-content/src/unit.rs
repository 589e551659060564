//! Parsed documents.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::format::Format;
use crate::locale::{ALL, LocalizedMap};
use crate::parser::{Metadata, ParsedDocument};

/// One parsed document.
///
/// Immutable after construction. A reloaded file produces a new unit rather
/// than mutating the cached one.
#[derive(Debug, Clone)]
pub struct ContentUnit {
    path: String,
    filename: PathBuf,
    format: Format,
    mtime: SystemTime,
    metadata: LocalizedMap<Metadata>,
    markup: LocalizedMap<String>,
    inferred_locale: Option<String>,
}

impl ContentUnit {
    /// Build a unit from a parsed document.
    ///
    /// # Arguments
    ///
    /// * `path` - Logical path (cache key) the unit was loaded under
    /// * `filename` - Source file
    /// * `format` - Document format derived from the extension
    /// * `mtime` - Modification time observed when the file was read
    /// * `doc` - Parsed metadata and markup
    #[must_use]
    pub fn new(
        path: impl Into<String>,
        filename: impl Into<PathBuf>,
        format: Format,
        mtime: SystemTime,
        doc: ParsedDocument,
    ) -> Self {
        Self {
            path: path.into(),
            filename: filename.into(),
            format,
            mtime,
            metadata: doc.metadata,
            markup: doc.markup,
            inferred_locale: doc.inferred_locale,
        }
    }

    /// Logical path, e.g. `""` for the root page or `"blog/first-post"`.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Source file on disk.
    #[must_use]
    pub fn filename(&self) -> &Path {
        &self.filename
    }

    #[must_use]
    pub fn format(&self) -> Format {
        self.format
    }

    /// Modification time observed when the file was read.
    #[must_use]
    pub fn mtime(&self) -> SystemTime {
        self.mtime
    }

    /// Whether this unit is the root page.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// Whether the source file is an `index.<ext>` file.
    #[must_use]
    pub fn is_index(&self) -> bool {
        self.filename.file_stem().is_some_and(|s| s == "index")
    }

    /// Metadata value for `key` in `locale`, falling back to [`ALL`].
    ///
    /// Keys are matched case-insensitively. An untagged document answers
    /// for every locale from its inferred bucket.
    #[must_use]
    pub fn metadata(&self, key: &str, locale: Option<&str>) -> Option<&str> {
        let key = key.to_lowercase();
        let lookup = |l: &str| self.metadata.get(l).and_then(|m| m.get(&key));
        locale
            .and_then(lookup)
            .or_else(|| lookup(ALL))
            .or_else(|| self.inferred_locale.as_deref().and_then(lookup))
            .map(String::as_str)
    }

    /// Raw markup for `locale`, falling back to [`ALL`] and then, for an
    /// untagged document, to its inferred locale.
    #[must_use]
    pub fn markup(&self, locale: Option<&str>) -> Option<&str> {
        match locale {
            Some(locale) => self.markup.resolve(locale),
            None => self.markup.get(ALL),
        }
        .or_else(|| {
            self.inferred_locale
                .as_deref()
                .and_then(|l| self.markup.get(l))
        })
        .map(String::as_str)
    }

    /// Locale assumed for a document without locale tagging.
    #[must_use]
    pub fn inferred_locale(&self) -> Option<&str> {
        self.inferred_locale.as_deref()
    }

    /// The locale the document was written in first.
    ///
    /// This is the first locale-specific markup block, ignoring [`ALL`].
    #[must_use]
    pub fn primary_locale(&self) -> Option<&str> {
        self.markup.locales().find(|l| *l != ALL)
    }

    /// Locales with markup of their own, in document order.
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.markup.locales().filter(|l| *l != ALL)
    }

    /// All metadata buckets.
    #[must_use]
    pub fn metadata_by_locale(&self) -> &LocalizedMap<Metadata> {
        &self.metadata
    }

    /// All markup blocks.
    #[must_use]
    pub fn markup_by_locale(&self) -> &LocalizedMap<String> {
        &self.markup
    }
}
