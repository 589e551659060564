//! `show` command implementation.

use clap::Args;

use super::{GlobalArgs, label, require_page};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the show command.
#[derive(Args)]
pub(crate) struct ShowArgs {
    /// Logical path of the page (e.g. `guides/install`).
    path: String,

    /// Render the body to HTML and print it.
    #[arg(long)]
    html: bool,
}

impl ShowArgs {
    /// Execute the show command.
    ///
    /// # Errors
    ///
    /// Returns an error if the site cannot be opened or the page is missing.
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let site = global.open_site()?;
        let page = require_page(&site, &self.path)?;
        let locale = site.locale();
        let locale = locale.as_deref();

        output.highlight(&site.title(&page)?.unwrap_or_default());
        output.field("href", &page.href(locale));
        output.field("file", &page.filename().display().to_string());
        output.field("format", page.format().extension());

        match site.date(&page) {
            Ok(Some(date)) => output.field("date", &date.format("%Y-%m-%d").to_string()),
            Ok(None) => {}
            Err(e) => output.warning(&format!("Warning: {e}")),
        }

        let categories = site.categories(&page)?;
        if !categories.is_empty() {
            let names: Vec<_> = categories.iter().map(|c| label(&site, c)).collect();
            output.field("categories", &names.join(", "));
        }

        if let Some(parent) = site.parent(&page)? {
            output.field("parent", &label(&site, &parent));
        }

        let flags = page.flags(locale);
        if !flags.is_empty() {
            output.field("flags", &flags.join(", "));
        }

        if self.html
            && let Some(html) = site.to_html(&page)?
        {
            output.line("");
            output.line(html.trim_end());
        }
        Ok(())
    }
}
