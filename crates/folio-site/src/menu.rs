//! Navigation menu built from an indented index file.
//!
//! The menu file lists one logical path per line. Two leading spaces per level
//! nest an entry under the entry above it:
//!
//! ```text
//! about
//! guides
//!   guides/install
//!   guides/usage
//! ```
//!
//! The menu is rebuilt from the file on every request; it is cheap to parse and
//! never goes stale.

use std::fs;
use std::io;
use std::sync::Arc;

use folio_content::{ContentError, normalize_key};

use crate::error::SiteError;
use crate::page::Page;
use crate::site::Site;

/// Indentation for one nesting level.
const INDENT: &str = "  ";

/// One menu entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuNode {
    /// A page without nested entries.
    Leaf(Arc<Page>),
    /// A page followed by its nested entries.
    Branch(Arc<Page>, Vec<MenuNode>),
}

impl MenuNode {
    /// The entry's page.
    #[must_use]
    pub fn page(&self) -> &Arc<Page> {
        match self {
            Self::Leaf(page) | Self::Branch(page, _) => page,
        }
    }

    /// Nested entries, empty for a leaf.
    #[must_use]
    pub fn children(&self) -> &[MenuNode] {
        match self {
            Self::Leaf(_) => &[],
            Self::Branch(_, children) => children,
        }
    }
}

/// A parsed menu tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Menu {
    items: Vec<MenuNode>,
}

impl Menu {
    /// Parse menu text, resolving each line to a page.
    ///
    /// Lines that are blank or do not resolve are skipped. An entry indented
    /// deeper than the entry above it nests exactly one level under it,
    /// however deep the indentation.
    ///
    /// # Errors
    ///
    /// Returns the first error from `resolve`.
    pub fn parse<E>(
        text: &str,
        mut resolve: impl FnMut(&str) -> Result<Option<Arc<Page>>, E>,
    ) -> Result<Self, E> {
        let mut entries = Vec::new();
        for line in text.lines() {
            let path = line.trim();
            if path.is_empty() {
                continue;
            }
            match resolve(path)? {
                Some(page) => entries.push((indent_depth(line), page)),
                None => tracing::debug!(path, "Skipping menu entry that does not resolve"),
            }
        }

        let mut pos = 0;
        let items = build_level(&entries, &mut pos, 0);
        Ok(Self { items })
    }

    /// The full tree.
    #[must_use]
    pub fn items(&self) -> &[MenuNode] {
        &self.items
    }

    /// Pages at the top level, without their nested entries.
    #[must_use]
    pub fn top_level(&self) -> Vec<Arc<Page>> {
        self.items.iter().map(|n| Arc::clone(n.page())).collect()
    }

    /// Subtree for a logical path.
    ///
    /// The root path returns the whole tree. Otherwise each level is searched
    /// before descending into nested entries, and the first entry whose page
    /// has this path is returned together with its nested entries. `None` if
    /// no entry matches.
    #[must_use]
    pub fn for_path(&self, path: &str) -> Option<Vec<MenuNode>> {
        let path = normalize_key(path);
        if path.is_empty() {
            return Some(self.items.clone());
        }
        find_in(&self.items, &path).map(|node| vec![node.clone()])
    }
}

/// Entry for `path` among `nodes`, then among their nested entries.
fn find_in<'a>(nodes: &'a [MenuNode], path: &str) -> Option<&'a MenuNode> {
    nodes
        .iter()
        .find(|node| node.page().path() == path)
        .or_else(|| nodes.iter().find_map(|node| find_in(node.children(), path)))
}

/// Nesting depth from leading indentation.
fn indent_depth(line: &str) -> usize {
    let mut depth = 0;
    let mut rest = line;
    while let Some(stripped) = rest.strip_prefix(INDENT) {
        depth += 1;
        rest = stripped;
    }
    depth
}

/// Build the nodes of one level, starting at `entries[*pos]`.
///
/// Consumes entries while they are at least `depth` deep. Each entry takes
/// the deeper entries directly after it as its children.
fn build_level(entries: &[(usize, Arc<Page>)], pos: &mut usize, depth: usize) -> Vec<MenuNode> {
    let mut nodes = Vec::new();
    while let Some((entry_depth, page)) = entries.get(*pos) {
        if *entry_depth < depth {
            break;
        }
        *pos += 1;

        let opens_children = entries
            .get(*pos)
            .is_some_and(|(next_depth, _)| next_depth > entry_depth);
        let node = if opens_children {
            let children = build_level(entries, pos, entry_depth + 1);
            MenuNode::Branch(Arc::clone(page), children)
        } else {
            MenuNode::Leaf(Arc::clone(page))
        };
        nodes.push(node);
    }
    nodes
}

impl Site {
    /// Menu built from the configured menu file.
    ///
    /// A missing menu file gives an empty menu.
    ///
    /// # Errors
    ///
    /// Returns an error if the menu file cannot be read or an entry fails to
    /// load for a reason other than not existing.
    pub fn menu(&self) -> Result<Menu, SiteError> {
        let Some(file) = &self.settings().menu_file else {
            return Ok(Menu::default());
        };
        let text = match fs::read_to_string(file) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Menu::default()),
            Err(e) => return Err(ContentError::io(e, file).into()),
        };
        Menu::parse(&text, |path| self.load(path))
    }
}
