//! Cached document loading.
//!
//! [`ContentStore`] owns every loaded document. Documents are parsed on first
//! access, keyed by logical path, and reparsed only when the file on disk is
//! newer than the cached copy. Staleness is detected at access time; there is
//! no background invalidation.
//!
//! Concurrent loads of the same stale path may both parse the file. The last
//! one to publish wins; readers always see a complete unit because units are
//! immutable and published as a single `Arc` swap.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use crate::error::ContentError;
use crate::format::Format;
use crate::locale::LocalizationResolver;
use crate::parser::TextBlockParser;
use crate::scanner::Scanner;
use crate::source::{candidates, normalize_key, validate_key};
use crate::unit::ContentUnit;

/// A type the store can cache: a [`ContentUnit`] or a richer wrapper.
pub trait Model: Send + Sync + 'static {
    /// Wrap a freshly parsed unit.
    fn from_unit(unit: ContentUnit) -> Self;

    /// The underlying unit.
    fn unit(&self) -> &ContentUnit;
}

impl Model for ContentUnit {
    fn from_unit(unit: ContentUnit) -> Self {
        unit
    }

    fn unit(&self) -> &ContentUnit {
        self
    }
}

/// File that won candidate lookup for a path.
struct Located {
    file: PathBuf,
    format: Format,
    mtime: SystemTime,
}

/// Loads and caches documents from a content root.
pub struct ContentStore<M: Model = ContentUnit> {
    root: PathBuf,
    parser: TextBlockParser,
    resolver: Arc<LocalizationResolver>,
    cache: Mutex<HashMap<String, Arc<M>>>,
}

impl<M: Model> std::fmt::Debug for ContentStore<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentStore")
            .field("root", &self.root)
            .field("parser", &self.parser)
            .finish_non_exhaustive()
    }
}

impl<M: Model> ContentStore<M> {
    /// Create a store.
    ///
    /// # Arguments
    ///
    /// * `root` - Directory documents are loaded from
    /// * `parser` - Parser for document text
    /// * `resolver` - Receives every locale seen in loaded documents
    #[must_use]
    pub fn new(
        root: impl Into<PathBuf>,
        parser: TextBlockParser,
        resolver: Arc<LocalizationResolver>,
    ) -> Self {
        Self {
            root: root.into(),
            parser,
            resolver,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Content root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Locale resolver fed by this store.
    #[must_use]
    pub fn resolver(&self) -> &Arc<LocalizationResolver> {
        &self.resolver
    }

    /// Load the document at a logical path.
    ///
    /// Candidates are tried per format in priority order, `path.<ext>` before
    /// `path/index.<ext>`. A cached unit is returned as-is (same `Arc`) while
    /// its file is unchanged; otherwise the file is parsed and the new unit
    /// replaces the cache entry.
    ///
    /// Returns `Ok(None)` if no candidate file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the path escapes the content root, or if a
    /// candidate cannot be stat'ed or read for a reason other than not
    /// existing.
    ///
    /// # Panics
    ///
    /// Panics if the internal cache lock is poisoned.
    pub fn load(&self, path: &str) -> Result<Option<Arc<M>>, ContentError> {
        let key = normalize_key(path);
        validate_key(&key)?;

        let Some(located) = self.locate(&key)? else {
            if self.cache.lock().unwrap().remove(&key).is_some() {
                tracing::debug!(path = %key, "Evicted document whose file disappeared");
            }
            return Ok(None);
        };

        if let Some(cached) = self.cached(&key, &located) {
            tracing::trace!(path = %key, "Cache hit");
            return Ok(Some(cached));
        }

        let text = match fs::read_to_string(&located.file) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ContentError::io(e, &located.file)),
        };

        let doc = self.parser.parse(&text);
        for locale in doc.metadata.locales().chain(doc.markup.locales()) {
            self.resolver.record_locale(locale);
        }

        tracing::debug!(
            path = %key,
            file = %located.file.display(),
            format = %located.format,
            "Parsed document"
        );

        let unit = ContentUnit::new(
            key.as_str(),
            located.file,
            located.format,
            located.mtime,
            doc,
        );
        let model = Arc::new(M::from_unit(unit));
        self.cache
            .lock()
            .unwrap()
            .insert(key, Arc::clone(&model));
        Ok(Some(model))
    }

    /// Whether any candidate file exists for a logical path.
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as [`load`](Self::load),
    /// except that no file is read.
    pub fn exists(&self, path: &str) -> Result<bool, ContentError> {
        let key = normalize_key(path);
        validate_key(&key)?;
        Ok(self.locate(&key)?.is_some())
    }

    /// Load every document under the content root.
    ///
    /// Documents go through [`load`](Self::load), so bulk listing shares the
    /// cache with single lookups. When `a.<ext>` and `a/index.<ext>` both
    /// exist, the path is listed once.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`load`](Self::load).
    pub fn find_all(&self) -> Result<Vec<Arc<M>>, ContentError> {
        let mut seen = HashSet::new();
        let mut models = Vec::new();
        for source in Scanner::new(self.root.clone()).scan() {
            if !seen.insert(source.path.clone()) {
                continue;
            }
            if let Some(model) = self.load(&source.path)? {
                models.push(model);
            }
        }
        Ok(models)
    }

    /// Drop every cached document.
    ///
    /// # Panics
    ///
    /// Panics if the internal cache lock is poisoned.
    pub fn purge(&self) {
        let mut cache = self.cache.lock().unwrap();
        let count = cache.len();
        cache.clear();
        tracing::info!(count, "Purged content cache");
    }

    /// Number of cached documents.
    ///
    /// # Panics
    ///
    /// Panics if the internal cache lock is poisoned.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.lock().unwrap().len()
    }

    /// Cached unit for `key` if it came from the same file and is not older.
    fn cached(&self, key: &str, located: &Located) -> Option<Arc<M>> {
        let cache = self.cache.lock().unwrap();
        let cached = cache.get(key)?;
        let unit = cached.unit();
        (unit.filename() == located.file && unit.mtime() >= located.mtime)
            .then(|| Arc::clone(cached))
    }

    /// First candidate file that exists.
    fn locate(&self, key: &str) -> Result<Option<Located>, ContentError> {
        for (file, format) in candidates(&self.root, key) {
            match fs::metadata(&file) {
                Ok(meta) if meta.is_file() => {
                    let mtime = meta.modified().map_err(|e| ContentError::io(e, &file))?;
                    return Ok(Some(Located {
                        file,
                        format,
                        mtime,
                    }));
                }
                Ok(_) => {}
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                    ) => {}
                Err(e) => return Err(ContentError::io(e, &file)),
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::time::Duration;

    use static_assertions::assert_impl_all;

    use super::*;
    use crate::error::ContentErrorKind;

    assert_impl_all!(ContentStore: Send, Sync);

    fn create_test_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    fn store(root: &Path) -> ContentStore {
        ContentStore::new(
            root,
            TextBlockParser::default(),
            Arc::new(LocalizationResolver::default()),
        )
    }

    fn touch_forward(path: &Path, secs: u64) {
        let file = File::options().write(true).open(path).unwrap();
        let mtime = file.metadata().unwrap().modified().unwrap();
        file.set_modified(mtime + Duration::from_secs(secs)).unwrap();
    }

    #[test]
    fn test_load_not_found() {
        let dir = create_test_dir();
        let store = store(dir.path());

        assert!(store.load("missing").unwrap().is_none());
        assert!(!store.exists("missing").unwrap());
        assert_eq!(store.cached_len(), 0);
    }

    #[test]
    fn test_load_is_idempotent() {
        let dir = create_test_dir();
        fs::write(dir.path().join("about.mdown"), "Title: About\n\n# About\n").unwrap();
        let store = store(dir.path());

        let first = store.load("about").unwrap().unwrap();
        let second = store.load("/about/").unwrap().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.metadata("title", Some("en")), Some("About"));
    }

    #[test]
    fn test_dot_segments_share_entry() {
        let dir = create_test_dir();
        fs::create_dir_all(dir.path().join("blog")).unwrap();
        fs::write(dir.path().join("blog/post.mdown"), "# Post\n").unwrap();
        let store = store(dir.path());

        let plain = store.load("blog/post").unwrap().unwrap();
        let dotted = store.load("blog/./post").unwrap().unwrap();

        assert!(Arc::ptr_eq(&plain, &dotted));
        assert_eq!(store.cached_len(), 1);
    }

    #[test]
    fn test_newer_mtime_reloads() {
        let dir = create_test_dir();
        let file = dir.path().join("news.mdown");
        fs::write(&file, "Title: Old\n\nBody\n").unwrap();
        let store = store(dir.path());

        let first = store.load("news").unwrap().unwrap();
        fs::write(&file, "Title: New\n\nBody\n").unwrap();
        touch_forward(&file, 10);
        let second = store.load("news").unwrap().unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.metadata("title", Some("en")), Some("Old"));
        assert_eq!(second.metadata("title", Some("en")), Some("New"));
        assert!(second.mtime() > first.mtime());
    }

    #[test]
    fn test_candidate_priority() {
        let dir = create_test_dir();
        fs::create_dir_all(dir.path().join("guide")).unwrap();
        fs::write(dir.path().join("guide.textile"), "h1. Textile").unwrap();
        fs::write(dir.path().join("guide/index.mdown"), "# Markdown").unwrap();
        let store = store(dir.path());

        let unit = store.load("guide").unwrap().unwrap();

        assert_eq!(unit.format(), Format::Markdown);
        assert!(unit.is_index());
    }

    #[test]
    fn test_root_and_index_share_entry() {
        let dir = create_test_dir();
        fs::write(dir.path().join("index.haml"), "%h1 Home").unwrap();
        let store = store(dir.path());

        let root = store.load("").unwrap().unwrap();
        let index = store.load("index").unwrap().unwrap();

        assert!(Arc::ptr_eq(&root, &index));
        assert!(root.is_root());
    }

    #[test]
    fn test_deleted_file_is_evicted() {
        let dir = create_test_dir();
        let file = dir.path().join("gone.mdown");
        fs::write(&file, "x").unwrap();
        let store = store(dir.path());

        assert!(store.load("gone").unwrap().is_some());
        fs::remove_file(&file).unwrap();

        assert!(store.load("gone").unwrap().is_none());
        assert_eq!(store.cached_len(), 0);
    }

    #[test]
    fn test_purge_forces_reparse() {
        let dir = create_test_dir();
        fs::write(dir.path().join("a.mdown"), "x").unwrap();
        let store = store(dir.path());

        let first = store.load("a").unwrap().unwrap();
        store.purge();
        assert_eq!(store.cached_len(), 0);
        let second = store.load("a").unwrap().unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_find_all_uses_cache() {
        let dir = create_test_dir();
        fs::create_dir_all(dir.path().join("blog")).unwrap();
        fs::write(dir.path().join("index.mdown"), "# Home").unwrap();
        fs::write(dir.path().join("blog/post.mdown"), "# Post").unwrap();
        fs::write(dir.path().join("menu.txt"), "blog/post").unwrap();
        let store = store(dir.path());

        let post = store.load("blog/post").unwrap().unwrap();
        let all = store.find_all().unwrap();

        assert_eq!(all.len(), 2);
        let listed = all.iter().find(|u| u.path() == "blog/post").unwrap();
        assert!(Arc::ptr_eq(&post, listed));
    }

    #[test]
    fn test_find_all_dedupes_index_and_file() {
        let dir = create_test_dir();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        fs::write(dir.path().join("a.mdown"), "# A").unwrap();
        fs::write(dir.path().join("a/index.textile"), "h1. A").unwrap();
        let store = store(dir.path());

        let all = store.find_all().unwrap();

        assert_eq!(all.len(), 1);
        assert_eq!(all[0].format(), Format::Markdown);
    }

    #[test]
    fn test_records_locales() {
        let dir = create_test_dir();
        fs::write(
            dir.path().join("intl.mdown"),
            "Language: fr\n\nBonjour\nLanguage: en\n\nHello\n",
        )
        .unwrap();
        let store = store(dir.path());

        store.load("intl").unwrap();

        assert_eq!(store.resolver().known_locales(), vec!["fr", "en"]);
        assert_eq!(store.resolver().fallback_locale().as_deref(), Some("fr"));
    }

    #[test]
    fn test_escaping_path_rejected() {
        let dir = create_test_dir();
        let store = store(dir.path());

        let err = store.load("../etc/passwd").unwrap_err();
        assert_eq!(err.kind, ContentErrorKind::InvalidPath);
    }

    #[test]
    fn test_invalid_utf8_is_an_error() {
        let dir = create_test_dir();
        fs::write(dir.path().join("bin.mdown"), [0xff, 0xfe, 0x00]).unwrap();
        let store = store(dir.path());

        let err = store.load("bin").unwrap_err();
        assert_eq!(err.kind, ContentErrorKind::InvalidData);
    }

    #[test]
    fn test_empty_file() {
        let dir = create_test_dir();
        fs::write(dir.path().join("empty.mdown"), "").unwrap();
        let store = store(dir.path());

        let unit = store.load("empty").unwrap().unwrap();

        assert_eq!(unit.markup(Some("en")), Some(""));
        assert_eq!(unit.metadata("title", Some("en")), None);
    }
}
