//! Locale tracking and fallback resolution.
//!
//! Documents carry per-locale metadata and markup. Values that apply to every
//! locale are stored under the [`ALL`] sentinel. Lookups go through a two-step
//! chain: the requested locale first, then [`ALL`]. A missing value at the end
//! of the chain is a normal outcome, reported as `None`.

use std::sync::{Arc, RwLock};

/// Sentinel locale for locale-independent values.
pub const ALL: &str = "all";

/// Values keyed by locale, in order of first insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for LocalizedMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> LocalizedMap<V> {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value stored for exactly this locale.
    #[must_use]
    pub fn get(&self, locale: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(l, _)| l == locale)
            .map(|(_, v)| v)
    }

    /// Mutable value stored for exactly this locale.
    pub fn get_mut(&mut self, locale: &str) -> Option<&mut V> {
        self.entries
            .iter_mut()
            .find(|(l, _)| l == locale)
            .map(|(_, v)| v)
    }

    /// Insert or replace the value for a locale.
    ///
    /// Replacing keeps the locale's original position.
    pub fn insert(&mut self, locale: impl Into<String>, value: V) {
        let locale = locale.into();
        if let Some(slot) = self.get_mut(&locale) {
            *slot = value;
        } else {
            self.entries.push((locale, value));
        }
    }

    /// Value for `locale`, falling back to [`ALL`].
    #[must_use]
    pub fn resolve(&self, locale: &str) -> Option<&V> {
        self.get(locale).or_else(|| {
            if locale == ALL {
                None
            } else {
                self.get(ALL)
            }
        })
    }

    /// Whether the map holds a value for exactly this locale.
    #[must_use]
    pub fn contains(&self, locale: &str) -> bool {
        self.get(locale).is_some()
    }

    /// Locales in insertion order, including [`ALL`] if present.
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    /// Iterate over `(locale, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(l, v)| (l.as_str(), v))
    }

    /// Number of locales stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Source of the externally selected "active" locale.
///
/// Typically backed by the request layer (query string, cookie, header).
pub trait LocaleSource: Send + Sync {
    /// Currently active locale, if one was selected.
    fn active_locale(&self) -> Option<String>;
}

/// [`LocaleSource`] that never supplies an active locale.
#[derive(Debug, Default)]
pub struct NoActiveLocale;

impl LocaleSource for NoActiveLocale {
    fn active_locale(&self) -> Option<String> {
        None
    }
}

/// [`LocaleSource`] that always supplies the same locale.
#[derive(Debug, Clone)]
pub struct FixedLocale(pub String);

impl LocaleSource for FixedLocale {
    fn active_locale(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

#[derive(Debug, Default)]
struct LocaleState {
    known: Vec<String>,
    fallback: Option<String>,
}

/// Tracks known locales and resolves the current locale.
///
/// The fallback locale is either set explicitly or defaults to the first
/// locale ever recorded.
pub struct LocalizationResolver {
    state: RwLock<LocaleState>,
    source: Arc<dyn LocaleSource>,
}

impl std::fmt::Debug for LocalizationResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalizationResolver")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Default for LocalizationResolver {
    fn default() -> Self {
        Self::new(Arc::new(NoActiveLocale))
    }
}

impl LocalizationResolver {
    /// Create a resolver reading the active locale from `source`.
    #[must_use]
    pub fn new(source: Arc<dyn LocaleSource>) -> Self {
        Self {
            state: RwLock::new(LocaleState::default()),
            source,
        }
    }

    /// Preset the fallback locale, typically from configuration.
    ///
    /// Unlike [`set_fallback_locale`](Self::set_fallback_locale) this does not
    /// expect the locale to have been seen yet.
    #[must_use]
    pub fn with_fallback(mut self, id: impl Into<String>) -> Self {
        self.state.get_mut().unwrap().fallback = Some(id.into());
        self
    }

    /// Record a locale as known.
    ///
    /// Idempotent; the order of first appearance is preserved. The [`ALL`]
    /// sentinel is never recorded. The first recorded locale becomes the
    /// fallback unless one was set explicitly.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub fn record_locale(&self, id: &str) {
        if id == ALL || id.is_empty() {
            return;
        }
        let mut state = self.state.write().unwrap();
        if !state.known.iter().any(|l| l == id) {
            state.known.push(id.to_owned());
        }
        if state.fallback.is_none() {
            state.fallback = Some(id.to_owned());
        }
    }

    /// Set the fallback locale explicitly.
    ///
    /// Setting a locale that has not been seen yet is allowed but logged.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub fn set_fallback_locale(&self, id: &str) {
        let mut state = self.state.write().unwrap();
        if !state.known.iter().any(|l| l == id) {
            tracing::warn!(
                locale = %id,
                known = %state.known.join(", "),
                "Fallback locale is not known yet"
            );
        }
        state.fallback = Some(id.to_owned());
    }

    /// Fallback locale, if any.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn fallback_locale(&self) -> Option<String> {
        self.state.read().unwrap().fallback.clone()
    }

    /// All locales recorded so far, in order of first appearance.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn known_locales(&self) -> Vec<String> {
        self.state.read().unwrap().known.clone()
    }

    /// The active locale if one is supplied, else the fallback.
    #[must_use]
    pub fn current_locale(&self) -> Option<String> {
        self.source
            .active_locale()
            .or_else(|| self.fallback_locale())
    }

    /// Resolve `map` for the current locale.
    ///
    /// With no current locale at all, only the [`ALL`] entry can match.
    #[must_use]
    pub fn resolve<'a, V>(&self, map: &'a LocalizedMap<V>) -> Option<&'a V> {
        match self.current_locale() {
            Some(locale) => map.resolve(&locale),
            None => map.get(ALL),
        }
    }
}
