//! `list` command implementation.

use super::{GlobalArgs, label};
use crate::error::CliError;
use crate::output::Output;

/// Execute the list command.
///
/// # Errors
///
/// Returns an error if the site cannot be opened or any page fails to load.
pub(crate) fn execute(global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
    let site = global.open_site()?;
    let pages = site.find_all()?;
    let locale = site.locale();

    for page in &pages {
        output.line(&format!(
            "{:<32} {}",
            page.href(locale.as_deref()),
            label(&site, page)
        ));
    }
    output.info(&format!("{} pages", pages.len()));
    Ok(())
}
