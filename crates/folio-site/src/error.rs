//! Site error types.

use folio_content::ContentError;

use crate::date::DateError;
use crate::renderer::RenderError;

/// Error returned by [`Site`](crate::Site) queries.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// Loading a document failed.
    #[error(transparent)]
    Content(#[from] ContentError),
    /// Rendering markup failed.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// A page's `date` metadata could not be parsed.
    #[error("Invalid date on page '/{path}': {source}")]
    Date {
        path: String,
        #[source]
        source: DateError,
    },
}
