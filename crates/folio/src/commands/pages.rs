//! `pages` command implementation.

use clap::Args;

use super::{GlobalArgs, label, require_page};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the pages command.
#[derive(Args)]
pub(crate) struct PagesArgs {
    /// Logical path of the category page.
    category: String,
}

impl PagesArgs {
    /// Execute the pages command.
    ///
    /// # Errors
    ///
    /// Returns an error if the site cannot be opened, the category page is
    /// missing, or listing the content fails.
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let site = global.open_site()?;
        let category = require_page(&site, &self.category)?;
        let locale = site.locale();

        let pages = site.pages(&category)?;
        if pages.is_empty() {
            output.info(&format!("No pages in {}", label(&site, &category)));
        }
        for page in &pages {
            let priority = page.priority(category.path(), locale.as_deref());
            output.line(&format!("{priority:>4}  {}", label(&site, page)));
        }
        Ok(())
    }
}
