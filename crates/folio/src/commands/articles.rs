//! `articles` command implementation.

use clap::Args;

use super::{GlobalArgs, label, require_page};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the articles command.
#[derive(Args)]
pub(crate) struct ArticlesArgs {
    /// Only list articles in this category.
    #[arg(long)]
    category: Option<String>,
}

impl ArticlesArgs {
    /// Execute the articles command.
    ///
    /// # Errors
    ///
    /// Returns an error if the site cannot be opened, the category page is
    /// missing, or listing the content fails.
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let site = global.open_site()?;
        let articles = match &self.category {
            Some(path) => site.articles(&*require_page(&site, path)?)?,
            None => site.find_articles()?,
        };

        if articles.is_empty() {
            output.info("No articles");
        }
        for article in &articles {
            // find_articles only returns pages with a valid date
            let date = site
                .date(article)?
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            output.line(&format!("{date}  {}", label(&site, article)));
        }
        Ok(())
    }
}
