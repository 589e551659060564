//! `menu` command implementation.

use clap::Args;
use folio_site::{MenuNode, Site};

use super::{GlobalArgs, label};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the menu command.
#[derive(Args)]
pub(crate) struct MenuArgs {
    /// Only print the subtree for this logical path.
    path: Option<String>,
}

impl MenuArgs {
    /// Execute the menu command.
    ///
    /// # Errors
    ///
    /// Returns an error if the site cannot be opened, the menu cannot be
    /// read, or the path is not in the menu.
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let site = global.open_site()?;
        let menu = site.menu()?;

        let nodes = match &self.path {
            Some(path) => menu
                .for_path(path)
                .ok_or_else(|| CliError::NotFound(path.trim_matches('/').to_owned()))?,
            None => menu.items().to_vec(),
        };

        if nodes.is_empty() {
            output.info("Menu is empty");
        }
        for line in tree_lines(&site, &nodes) {
            output.line(&line);
        }
        Ok(())
    }
}

/// Render menu nodes as indented lines of `label (href)`.
fn tree_lines(site: &Site, nodes: &[MenuNode]) -> Vec<String> {
    let mut lines = Vec::new();
    push_lines(site, nodes, 0, &mut lines);
    lines
}

fn push_lines(site: &Site, nodes: &[MenuNode], depth: usize, lines: &mut Vec<String>) {
    let locale = site.locale();
    for node in nodes {
        let page = node.page();
        lines.push(format!(
            "{}{} ({})",
            "  ".repeat(depth),
            label(site, page),
            page.href(locale.as_deref())
        ));
        push_lines(site, node.children(), depth + 1, lines);
    }
}
