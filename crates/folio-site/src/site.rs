//! Site facade over the content store.
//!
//! [`Site`] ties a [`ContentStore`] of [`Page`]s to the host's settings and
//! renderer. Every query resolves the current locale through the store's
//! [`LocalizationResolver`](folio_content::LocalizationResolver), so one site
//! serves every locale it has seen.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use folio_content::{ContentStore, LocalizationResolver, TextBlockParser};
//! use folio_site::{Site, SiteSettings};
//!
//! let store = ContentStore::new(
//!     "content/pages",
//!     TextBlockParser::default(),
//!     Arc::new(LocalizationResolver::default()),
//! );
//! let site = Site::new(store, SiteSettings::default());
//!
//! for article in site.find_articles()? {
//!     println!("{}", article.href(None));
//! }
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use folio_content::ContentStore;

use crate::error::SiteError;
use crate::page::Page;
use crate::renderer::{MarkdownRenderer, Renderer};

/// Host-supplied settings for a [`Site`].
#[derive(Debug, Clone, Default)]
pub struct SiteSettings {
    /// Site title, used when a page has no title of its own.
    pub title: String,
    /// Whether draft pages are hidden.
    pub production: bool,
    /// Indented menu index file, if any.
    pub menu_file: Option<PathBuf>,
}

/// Pages, queries and rendering for one content root.
///
/// `Site` is `Send + Sync`; the store serializes access to its cache.
pub struct Site {
    store: ContentStore<Page>,
    settings: SiteSettings,
    renderer: Box<dyn Renderer>,
}

impl std::fmt::Debug for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Site")
            .field("store", &self.store)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Site {
    /// Create a site rendering Markdown with [`MarkdownRenderer`].
    #[must_use]
    pub fn new(store: ContentStore<Page>, settings: SiteSettings) -> Self {
        Self {
            store,
            settings,
            renderer: Box::new(MarkdownRenderer::new()),
        }
    }

    /// Replace the renderer.
    #[must_use]
    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    #[must_use]
    pub fn store(&self) -> &ContentStore<Page> {
        &self.store
    }

    #[must_use]
    pub fn settings(&self) -> &SiteSettings {
        &self.settings
    }

    /// Current locale: the active one if the host supplies it, else the
    /// fallback.
    #[must_use]
    pub fn locale(&self) -> Option<String> {
        self.store.resolver().current_locale()
    }

    /// Load a page, hidden or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid or the file cannot be read.
    pub fn load(&self, path: &str) -> Result<Option<Arc<Page>>, SiteError> {
        Ok(self.store.load(path)?)
    }

    /// Whether a page is hidden: a draft on a production site.
    #[must_use]
    pub fn is_hidden(&self, page: &Page) -> bool {
        self.settings.production && page.is_draft(self.locale().as_deref())
    }

    /// Load a page, treating hidden pages as missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid or the file cannot be read.
    pub fn find_by_path(&self, path: &str) -> Result<Option<Arc<Page>>, SiteError> {
        Ok(self.load(path)?.filter(|page| !self.is_hidden(page)))
    }

    /// Every visible page.
    ///
    /// # Errors
    ///
    /// Returns an error if any document fails to load.
    pub fn find_all(&self) -> Result<Vec<Arc<Page>>, SiteError> {
        let mut pages = self.store.find_all()?;
        pages.retain(|page| !self.is_hidden(page));
        Ok(pages)
    }

    /// Visible pages dated in the past, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if any document fails to load.
    pub fn find_articles(&self) -> Result<Vec<Arc<Page>>, SiteError> {
        self.find_articles_at(Utc::now())
    }

    /// Visible pages dated before `now`, newest first.
    ///
    /// Pages whose date cannot be parsed are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if any document fails to load.
    pub fn find_articles_at(&self, now: DateTime<Utc>) -> Result<Vec<Arc<Page>>, SiteError> {
        let locale = self.locale();
        let locale = locale.as_deref();

        let mut dated = Vec::new();
        for page in self.find_all()? {
            match page.date(locale) {
                Ok(Some(date)) if date < now => dated.push((date, page)),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(path = %page.path(), error = %e, "Skipping page with invalid date");
                }
            }
        }

        dated.sort_by(|(a, _), (b, _)| b.cmp(a));
        Ok(dated.into_iter().map(|(_, page)| page).collect())
    }

    /// Page date in the current locale.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Date`] if the `date` metadata cannot be parsed.
    pub fn date(&self, page: &Page) -> Result<Option<DateTime<Utc>>, SiteError> {
        page.date(self.locale().as_deref())
            .map_err(|source| SiteError::Date {
                path: page.path().to_owned(),
                source,
            })
    }

    /// Page title.
    ///
    /// In order of preference: `title` metadata; the heading followed by the
    /// parent's heading; the heading followed by the site title; the site
    /// title for the root page.
    ///
    /// # Errors
    ///
    /// Returns an error if loading the parent fails.
    pub fn title(&self, page: &Page) -> Result<Option<String>, SiteError> {
        let locale = self.locale();
        let locale = locale.as_deref();

        if let Some(title) = page.metadata("title", locale) {
            return Ok(Some(title.to_owned()));
        }

        let heading = page.heading(locale);
        if let Some(heading) = &heading {
            let parent_heading = self.parent(page)?.and_then(|p| p.heading(locale));
            if let Some(parent_heading) = parent_heading {
                return Ok(Some(format!("{heading} - {parent_heading}")));
            }
            return Ok(Some(format!("{heading} - {}", self.settings.title)));
        }

        Ok(page.is_root().then(|| self.settings.title.clone()))
    }

    /// Render the full markup, heading included.
    ///
    /// Returns `Ok(None)` if the page has no markup for the current locale.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    pub fn to_html(&self, page: &Page) -> Result<Option<String>, SiteError> {
        let locale = self.locale();
        page.markup(locale.as_deref())
            .map(|markup| self.renderer.render(page.format(), markup))
            .transpose()
            .map_err(SiteError::from)
    }

    /// Render the markup without its first heading.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    pub fn render_body(&self, page: &Page) -> Result<Option<String>, SiteError> {
        let locale = self.locale();
        page.body_markup(locale.as_deref())
            .map(|body| self.renderer.render(page.format(), &body))
            .transpose()
            .map_err(SiteError::from)
    }

    /// Render the `summary` metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    pub fn render_summary(&self, page: &Page) -> Result<Option<String>, SiteError> {
        let locale = self.locale();
        page.summary_markup(locale.as_deref())
            .map(|summary| self.renderer.render(page.summary_format(), &summary))
            .transpose()
            .map_err(SiteError::from)
    }

    /// Drop every cached page.
    pub fn purge(&self) {
        self.store.purge();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::fs;
    use std::path::Path;

    use chrono::TimeZone;
    use folio_content::{Format, LocalizationResolver, TextBlockParser};
    use static_assertions::assert_impl_all;

    use super::*;
    use crate::renderer::RenderError;

    assert_impl_all!(Site: Send, Sync);

    fn write_files(root: &Path, files: &[(&str, &str)]) {
        for (name, text) in files {
            let path = root.join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, text).unwrap();
        }
    }

    fn new_site(root: &Path, settings: SiteSettings) -> Site {
        let store = ContentStore::new(
            root,
            TextBlockParser::default(),
            Arc::new(LocalizationResolver::default()),
        );
        Site::new(store, settings)
    }

    pub(crate) fn site_with_settings(
        files: &[(&str, &str)],
        settings: SiteSettings,
    ) -> (tempfile::TempDir, Site) {
        let dir = tempfile::tempdir().unwrap();
        write_files(dir.path(), files);
        let site = new_site(dir.path(), settings);
        (dir, site)
    }

    /// Site over a temp content root holding `files`, with `menu.txt` as menu.
    pub(crate) fn site_with(files: &[(&str, &str)]) -> (tempfile::TempDir, Site) {
        let dir = tempfile::tempdir().unwrap();
        write_files(dir.path(), files);
        let settings = SiteSettings {
            title: "My Site".to_owned(),
            production: false,
            menu_file: Some(dir.path().join("menu.txt")),
        };
        let site = new_site(dir.path(), settings);
        (dir, site)
    }

    fn production() -> SiteSettings {
        SiteSettings {
            production: true,
            ..SiteSettings::default()
        }
    }

    fn paths(pages: &[Arc<Page>]) -> Vec<&str> {
        pages.iter().map(|p| p.path()).collect()
    }

    #[test]
    fn test_drafts_hidden_in_production() {
        let files = [("draft.mdown", "Flags: draft\n\n# Draft"), ("live.mdown", "# Live")];

        let (_dir, dev) = site_with_settings(&files, SiteSettings::default());
        assert!(dev.find_by_path("draft").unwrap().is_some());
        assert_eq!(dev.find_all().unwrap().len(), 2);

        let (_dir, prod) = site_with_settings(&files, production());
        assert!(prod.find_by_path("draft").unwrap().is_none());
        assert!(prod.load("draft").unwrap().is_some());
        assert_eq!(paths(&prod.find_all().unwrap()), vec!["live"]);
    }

    #[test]
    fn test_find_articles_newest_first() {
        let (_dir, site) = site_with(&[
            ("past.mdown", "Date: 2023-01-01\n\n# Past"),
            ("recent.mdown", "Date: 2023-12-24\n\n# Recent"),
            ("future.mdown", "Date: 2099-01-01\n\n# Future"),
            ("broken.mdown", "Date: tomorrow-ish\n\n# Broken"),
            ("plain.mdown", "# Plain"),
        ]);
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let articles = site.find_articles_at(now).unwrap();

        assert_eq!(paths(&articles), vec!["recent", "past"]);
    }

    #[test]
    fn test_find_articles_excludes_hidden() {
        let (_dir, site) = site_with_settings(
            &[("a.mdown", "Date: 2020-01-01\nFlags: draft\n\n# A")],
            production(),
        );
        assert!(site.find_articles().unwrap().is_empty());
    }

    #[test]
    fn test_date_error_names_page() {
        let (_dir, site) = site_with(&[("bad.mdown", "Date: nope\n\n# Bad")]);
        let page = site.load("bad").unwrap().unwrap();

        let err = site.date(&page).unwrap_err();
        assert!(matches!(err, SiteError::Date { ref path, .. } if path == "bad"));
    }

    #[test]
    fn test_title_from_metadata() {
        let (_dir, site) = site_with(&[("a.mdown", "Title: Custom\n\n# Heading")]);
        let page = site.load("a").unwrap().unwrap();

        assert_eq!(site.title(&page).unwrap().as_deref(), Some("Custom"));
    }

    #[test]
    fn test_title_with_parent_heading() {
        let (_dir, site) = site_with(&[("guides.mdown", "# Guides"), ("guides/install.mdown", "# Install")]);
        let page = site.load("guides/install").unwrap().unwrap();

        assert_eq!(site.title(&page).unwrap().as_deref(), Some("Install - Guides"));
    }

    #[test]
    fn test_title_with_site_title() {
        let (_dir, site) = site_with(&[("about.mdown", "# About")]);
        let page = site.load("about").unwrap().unwrap();

        assert_eq!(site.title(&page).unwrap().as_deref(), Some("About - My Site"));
    }

    #[test]
    fn test_root_title_falls_back_to_site_title() {
        let (_dir, site) = site_with(&[("index.mdown", "No heading here")]);
        let root = site.load("").unwrap().unwrap();

        assert_eq!(site.title(&root).unwrap().as_deref(), Some("My Site"));
    }

    #[test]
    fn test_untitled_page() {
        let (_dir, site) = site_with(&[("a.mdown", "Just text")]);
        let page = site.load("a").unwrap().unwrap();

        assert_eq!(site.title(&page).unwrap(), None);
    }

    #[test]
    fn test_render_body_strips_heading() {
        let (_dir, site) = site_with(&[(
            "a.mdown",
            "Summary: Short\\nversion\n\n# Title\n\nHello *there*\n",
        )]);
        let page = site.load("a").unwrap().unwrap();

        assert_eq!(
            site.render_body(&page).unwrap().as_deref(),
            Some("<p>Hello <em>there</em></p>\n")
        );
        assert_eq!(
            site.to_html(&page).unwrap().as_deref(),
            Some("<h1>Title</h1>\n<p>Hello <em>there</em></p>\n")
        );
        assert_eq!(
            site.render_summary(&page).unwrap().as_deref(),
            Some("<p>Short\nversion</p>\n")
        );
    }

    #[test]
    fn test_custom_renderer() {
        struct Echo;

        impl Renderer for Echo {
            fn render(&self, format: Format, text: &str) -> Result<String, RenderError> {
                Ok(format!("[{format}] {text}"))
            }
        }

        let (_dir, site) = site_with(&[("t.textile", "h1. T\n\np. Body")]);
        let site = site.with_renderer(Echo);
        let page = site.load("t").unwrap().unwrap();

        assert_eq!(site.render_body(&page).unwrap().as_deref(), Some("[textile] p. Body"));
    }

    #[test]
    fn test_unsupported_format_is_error() {
        let (_dir, site) = site_with(&[("h.haml", "%h1 H\n%p body")]);
        let page = site.load("h").unwrap().unwrap();

        assert!(matches!(
            site.to_html(&page),
            Err(SiteError::Render(RenderError::Unsupported(Format::Haml)))
        ));
    }

    #[test]
    fn test_locale_follows_fallback() {
        let (_dir, site) = site_with(&[(
            "intl.mdown",
            "Language: fr\nTitle: Bonjour\n\n# Salut\nLanguage: en\nTitle: Hello\n\n# Hi\n",
        )]);
        let page = site.load("intl").unwrap().unwrap();

        assert_eq!(site.locale().as_deref(), Some("fr"));
        assert_eq!(site.title(&page).unwrap().as_deref(), Some("Bonjour"));

        site.store().resolver().set_fallback_locale("en");
        assert_eq!(site.title(&page).unwrap().as_deref(), Some("Hello"));
    }

    #[test]
    fn test_untagged_pages_visible_under_other_fallback() {
        let files = [
            ("a-intl.mdown", "Language: fr\nTitle: Bonjour\n\n# Salut\n"),
            ("b-post.mdown", "Title: Post\nDate: 2020-01-01\n\n# Post\n"),
            ("c-draft.mdown", "Flags: draft\n\n# Draft\n"),
        ];
        let (_dir, site) = site_with_settings(&files, production());
        site.load("a-intl").unwrap();
        assert_eq!(site.locale().as_deref(), Some("fr"));

        let post = site.load("b-post").unwrap().unwrap();
        assert_eq!(site.title(&post).unwrap().as_deref(), Some("Post"));
        assert!(site.date(&post).unwrap().is_some());
        assert_eq!(paths(&site.find_articles().unwrap()), vec!["b-post"]);
        assert!(site.find_by_path("c-draft").unwrap().is_none());
    }
}
