//! Category membership and ordering.
//!
//! A page joins categories through its `categories` metadata, a comma-separated
//! list of category page paths with optional priorities:
//!
//! ```text
//! Categories: guides:10, recipes
//! ```
//!
//! Within a category, undated pages are ordered by descending priority, then
//! by heading. Dated pages are articles and are ordered newest first.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::SiteError;
use crate::page::Page;
use crate::site::Site;

impl Site {
    /// Category pages a page belongs to, sorted by heading (case-insensitive).
    ///
    /// Entries that do not resolve to a visible page are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if loading a category page fails for a reason other
    /// than not existing.
    pub fn categories(&self, page: &Page) -> Result<Vec<Arc<Page>>, SiteError> {
        let locale = self.locale();
        let locale = locale.as_deref();

        let mut categories = Vec::new();
        for spec in page.category_specs(locale) {
            if let Some(category) = self.find_by_path(&spec.path)? {
                categories.push(category);
            }
        }
        categories.sort_by_cached_key(|c| c.sort_heading(locale));
        Ok(categories)
    }

    /// Undated pages in a category.
    ///
    /// Sorted by descending priority for the category, ties broken by heading
    /// (case-insensitive). Pages whose date cannot be parsed are left out.
    ///
    /// # Errors
    ///
    /// Returns an error if listing the content fails.
    pub fn pages(&self, category: &Page) -> Result<Vec<Arc<Page>>, SiteError> {
        let locale = self.locale();
        let locale = locale.as_deref();

        let mut ranked = Vec::new();
        for page in self.find_all()? {
            if !page.in_category(category.path(), locale) {
                continue;
            }
            match page.date(locale) {
                Ok(None) => {}
                Ok(Some(_)) => continue,
                Err(e) => {
                    tracing::warn!(path = %page.path(), error = %e, "Skipping page with invalid date");
                    continue;
                }
            }
            let priority = page.priority(category.path(), locale);
            let heading = page.sort_heading(locale);
            ranked.push((priority, heading, page));
        }

        ranked.sort_by(|(pa, ha, _), (pb, hb, _)| pb.cmp(pa).then_with(|| ha.cmp(hb)));
        Ok(ranked.into_iter().map(|(_, _, page)| page).collect())
    }

    /// Articles in a category, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if listing the content fails.
    pub fn articles(&self, category: &Page) -> Result<Vec<Arc<Page>>, SiteError> {
        self.articles_at(category, Utc::now())
    }

    /// Articles in a category as of `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if listing the content fails.
    pub fn articles_at(
        &self,
        category: &Page,
        now: DateTime<Utc>,
    ) -> Result<Vec<Arc<Page>>, SiteError> {
        let locale = self.locale();
        let mut articles = self.find_articles_at(now)?;
        articles.retain(|a| a.in_category(category.path(), locale.as_deref()));
        Ok(articles)
    }
}
