//! Parent resolution by walking path segments.
//!
//! There is no precomputed tree. A page's parent is the nearest ancestor path
//! that loads, so intermediate directories without an index document are
//! skipped. The root page is the parent of last resort.

use std::sync::Arc;

use crate::error::SiteError;
use crate::page::Page;
use crate::site::Site;

/// Ancestor paths of a logical path, nearest first, excluding the root.
///
/// `a/b/c` yields `a/b` then `a`.
pub(crate) fn ancestor_paths(path: &str) -> impl Iterator<Item = &str> {
    std::iter::successors(parent_path(path), |p| parent_path(*p))
}

fn parent_path(path: &str) -> Option<&str> {
    path.rsplit_once('/').map(|(parent, _)| parent)
}

impl Site {
    /// Parent page.
    ///
    /// The root page has no parent. Other pages get the nearest ancestor
    /// that loads, else the root page.
    ///
    /// # Errors
    ///
    /// Returns an error if loading an ancestor fails for a reason other than
    /// not existing.
    pub fn parent(&self, page: &Page) -> Result<Option<Arc<Page>>, SiteError> {
        if page.is_root() {
            return Ok(None);
        }
        for path in ancestor_paths(page.path()) {
            if let Some(parent) = self.load(path)? {
                return Ok(Some(parent));
            }
        }
        self.load("")
    }

    /// Ancestors from the root down to the parent, for breadcrumbs.
    ///
    /// # Errors
    ///
    /// Returns an error if any ancestor fails to load.
    pub fn ancestors(&self, page: &Page) -> Result<Vec<Arc<Page>>, SiteError> {
        let mut chain = Vec::new();
        let mut current = self.parent(page)?;
        while let Some(parent) = current {
            current = self.parent(&parent)?;
            chain.push(parent);
        }
        chain.reverse();
        Ok(chain)
    }
}
