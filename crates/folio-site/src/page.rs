//! Page model.
//!
//! [`Page`] wraps a [`ContentUnit`] with the accessors a site needs. Accessors
//! take the locale explicitly; [`Site`](crate::Site) supplies the current one.
//! Values derived from metadata (dates, category specifiers) are computed
//! lazily and memoised per raw metadata value, so a page stays immutable
//! apart from its memo tables.

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::{LazyLock, Mutex};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use folio_content::{ContentUnit, Format, Model, normalize_key};
use regex::Regex;

use crate::date::{DateError, parse_date};

static PRIORITY_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":(-?\d+)$").unwrap());

/// Default text for "read more" links.
pub const DEFAULT_READ_MORE: &str = "Continue reading";
/// Default layout name.
pub const DEFAULT_LAYOUT: &str = "layout";
/// Default template name.
pub const DEFAULT_TEMPLATE: &str = "page";

/// One entry of a page's `categories` metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySpec {
    /// Entry as written, e.g. `"guides:10"`.
    pub raw: String,
    /// Logical path of the category page, e.g. `"guides"`.
    pub path: String,
    /// Priority from the `:N` suffix, 0 if there is none.
    pub priority: i64,
}

impl CategorySpec {
    /// Parse one comma-separated entry.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (path, priority) = match PRIORITY_SUFFIX.captures(raw) {
            Some(caps) => {
                let suffix = caps.get(0).map_or(raw.len(), |m| m.start());
                let priority = caps.get(1).and_then(|m| m.as_str().parse().ok());
                (&raw[..suffix], priority.unwrap_or(0))
            }
            None => (raw, 0),
        };
        Self {
            raw: raw.to_owned(),
            path: normalize_key(path),
            priority,
        }
    }

    /// Priority of this entry if it names `category`.
    ///
    /// Paths are compared after normalisation, the same way category
    /// membership is decided.
    #[must_use]
    pub fn priority_for(&self, category: &str) -> Option<i64> {
        (self.path == normalize_key(category)).then_some(self.priority)
    }
}

/// Parse a comma-separated `categories` value.
#[must_use]
pub fn parse_categories(value: &str) -> Vec<CategorySpec> {
    value
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(CategorySpec::parse)
        .collect()
}

/// Memo table keyed by the raw metadata value it was derived from.
#[derive(Debug)]
struct Memo<T>(Mutex<HashMap<String, T>>);

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self(Mutex::new(HashMap::new()))
    }
}

impl<T: Clone> Memo<T> {
    fn get_or_insert_with(&self, key: &str, f: impl FnOnce() -> T) -> T {
        let mut map = self.0.lock().unwrap();
        if let Some(value) = map.get(key) {
            return value.clone();
        }
        let value = f();
        map.insert(key.to_owned(), value.clone());
        value
    }
}

/// A document served as a page.
#[derive(Debug)]
pub struct Page {
    unit: ContentUnit,
    dates: Memo<Result<DateTime<Utc>, DateError>>,
    categories: Memo<Vec<CategorySpec>>,
}

impl Model for Page {
    fn from_unit(unit: ContentUnit) -> Self {
        Self {
            unit,
            dates: Memo::default(),
            categories: Memo::default(),
        }
    }

    fn unit(&self) -> &ContentUnit {
        &self.unit
    }
}

impl Deref for Page {
    type Target = ContentUnit;

    fn deref(&self) -> &ContentUnit {
        &self.unit
    }
}

/// Pages are the same page when their logical paths match.
impl PartialEq for Page {
    fn eq(&self, other: &Self) -> bool {
        self.path() == other.path()
    }
}

impl Eq for Page {}

impl Page {
    /// Text of the first top-level heading in the markup.
    #[must_use]
    pub fn heading(&self, locale: Option<&str>) -> Option<String> {
        self.markup(locale).and_then(|m| self.format().heading(m))
    }

    /// Heading lower-cased for sorting; pages without one sort first.
    pub(crate) fn sort_heading(&self, locale: Option<&str>) -> String {
        self.heading(locale).unwrap_or_default().to_lowercase()
    }

    /// Markup with the first top-level heading removed.
    #[must_use]
    pub fn body_markup(&self, locale: Option<&str>) -> Option<String> {
        self.markup(locale).map(|m| self.format().strip_heading(m))
    }

    #[must_use]
    pub fn description(&self, locale: Option<&str>) -> Option<&str> {
        self.metadata("description", locale)
    }

    #[must_use]
    pub fn keywords(&self, locale: Option<&str>) -> Option<&str> {
        self.metadata("keywords", locale)
    }

    #[must_use]
    pub fn atom_id(&self, locale: Option<&str>) -> Option<&str> {
        self.metadata("atom id", locale)
    }

    #[must_use]
    pub fn read_more(&self, locale: Option<&str>) -> &str {
        self.metadata("read more", locale).unwrap_or(DEFAULT_READ_MORE)
    }

    #[must_use]
    pub fn layout(&self, locale: Option<&str>) -> &str {
        self.metadata("layout", locale).unwrap_or(DEFAULT_LAYOUT)
    }

    #[must_use]
    pub fn template(&self, locale: Option<&str>) -> &str {
        self.metadata("template", locale).unwrap_or(DEFAULT_TEMPLATE)
    }

    /// Comma-separated `flags` metadata, trimmed.
    #[must_use]
    pub fn flags(&self, locale: Option<&str>) -> Vec<&str> {
        self.metadata("flags", locale)
            .map(|f| f.split(',').map(str::trim).filter(|f| !f.is_empty()).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn flagged_as(&self, flag: &str, locale: Option<&str>) -> bool {
        self.flags(locale).contains(&flag)
    }

    #[must_use]
    pub fn is_draft(&self, locale: Option<&str>) -> bool {
        self.flagged_as("draft", locale)
    }

    /// `summary` metadata with literal `\n` sequences turned into newlines.
    #[must_use]
    pub fn summary_markup(&self, locale: Option<&str>) -> Option<String> {
        self.metadata("summary", locale).map(|s| s.replace("\\n", "\n"))
    }

    /// Format the summary is written in: Textile for Textile pages,
    /// Markdown otherwise.
    #[must_use]
    pub fn summary_format(&self) -> Format {
        match self.format() {
            Format::Textile => Format::Textile,
            Format::Markdown | Format::Haml => Format::Markdown,
        }
    }

    /// Last path segment.
    #[must_use]
    pub fn permalink(&self) -> &str {
        self.path().rsplit('/').next().unwrap_or_default()
    }

    #[must_use]
    pub fn last_modified(&self) -> SystemTime {
        self.mtime()
    }

    /// Site-absolute link to the page.
    ///
    /// A `?locale=` query is appended when `locale` is given and differs from
    /// the locale the page was written in first.
    #[must_use]
    pub fn href(&self, locale: Option<&str>) -> String {
        let mut href = format!("/{}", self.path());
        if let Some(locale) = locale
            && self.primary_locale() != Some(locale)
        {
            href.push_str("?locale=");
            href.push_str(locale);
        }
        href
    }

    /// Parsed `date` metadata.
    ///
    /// Returns `Ok(None)` when the page has no date.
    ///
    /// # Errors
    ///
    /// Returns [`DateError`] when the value cannot be parsed.
    pub fn date(&self, locale: Option<&str>) -> Result<Option<DateTime<Utc>>, DateError> {
        let Some(raw) = self.metadata("date", locale) else {
            return Ok(None);
        };
        self.dates
            .get_or_insert_with(raw, || parse_date(raw))
            .map(Some)
    }

    /// Parsed `categories` metadata.
    #[must_use]
    pub fn category_specs(&self, locale: Option<&str>) -> Vec<CategorySpec> {
        let Some(raw) = self.metadata("categories", locale) else {
            return Vec::new();
        };
        self.categories.get_or_insert_with(raw, || parse_categories(raw))
    }

    /// Whether the page lists `category` among its categories.
    #[must_use]
    pub fn in_category(&self, category: &str, locale: Option<&str>) -> bool {
        let category = normalize_key(category);
        self.category_specs(locale)
            .iter()
            .any(|spec| spec.path == category)
    }

    /// Priority of this page within `category`, 0 if unlisted.
    #[must_use]
    pub fn priority(&self, category: &str, locale: Option<&str>) -> i64 {
        self.category_specs(locale)
            .iter()
            .find_map(|spec| spec.priority_for(category))
            .unwrap_or(0)
    }
}
