//! Flat-file document loading for folio.
//!
//! This crate turns a directory of text documents into cached, locale-aware
//! [`ContentUnit`]s:
//!
//! - [`TextBlockParser`] splits a document into per-locale metadata and markup
//! - [`LocalizationResolver`] tracks known locales and resolves the current one
//! - [`ContentStore`] loads documents by logical path and reparses them only
//!   when their file changes
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use folio_content::{ContentStore, LocalizationResolver, TextBlockParser};
//!
//! let store: ContentStore = ContentStore::new(
//!     "content/pages",
//!     TextBlockParser::default(),
//!     Arc::new(LocalizationResolver::default()),
//! );
//! if let Some(unit) = store.load("blog/first-post")? {
//!     println!("{:?}", unit.metadata("title", Some("en")));
//! }
//! ```

mod error;
mod format;
mod locale;
mod parser;
mod scanner;
mod source;
mod store;
mod unit;

pub use error::{ContentError, ContentErrorKind};
pub use format::Format;
pub use locale::{
    ALL, FixedLocale, LocaleSource, LocalizationResolver, LocalizedMap, NoActiveLocale,
};
pub use parser::{Metadata, ParsedDocument, TextBlockParser, parse_metadata};
pub use source::{SourceFile, logical_path, normalize_key};
pub use store::{ContentStore, Model};
pub use unit::ContentUnit;
