//! Pages, hierarchy, categories and menus for folio.
//!
//! This crate provides:
//! - [`Page`]: a document with locale-aware accessors
//! - [`Site`]: page lookup, parent resolution, category listings, articles
//!   and rendering over a [`ContentStore`](folio_content::ContentStore)
//! - [`Menu`]: the navigation tree built from an indented menu file
//! - [`Renderer`]: the markup-to-HTML hook, with a Markdown default

mod categories;
mod date;
mod error;
mod hierarchy;
mod menu;
mod page;
mod renderer;
mod site;

pub use date::{DateError, parse_date};
pub use error::SiteError;
pub use menu::{Menu, MenuNode};
pub use page::{
    CategorySpec, DEFAULT_LAYOUT, DEFAULT_READ_MORE, DEFAULT_TEMPLATE, Page, parse_categories,
};
pub use renderer::{MarkdownRenderer, RenderError, Renderer};
pub use site::{Site, SiteSettings};
