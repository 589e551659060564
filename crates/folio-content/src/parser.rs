//! Metadata/markup block parser.
//!
//! Splits a raw document into locale-tagged metadata and markup.
//!
//! # Grammar
//!
//! A document optionally starts with a metadata paragraph of `key: value`
//! lines, separated from the body by a blank line:
//!
//! ```text
//! Title: Getting started
//! Categories: guides:10
//!
//! # Getting started
//! ...
//! ```
//!
//! When the first paragraph contains the language key (`language` unless the
//! document overrides it with `language_key: <key>`), the document is split
//! into recurring per-locale blocks:
//!
//! ```text
//! Date: 2024-03-01            <- shared, goes to the `all` bucket
//! Language: en
//! Title: Hello                <- English metadata
//!
//! English body...
//! Language: fr
//! Title: Bonjour              <- French metadata
//!
//! Corps en français...
//! ```
//!
//! Fields before the language line of a block merge into the `all` bucket,
//! fields after it belong to that block's locale, and everything up to the
//! next block (or the end of the text) is that locale's markup.
//!
//! Parsing never fails. Documents whose first line is not `key: value`
//! shaped are treated as plain markup for the default locale, and malformed
//! locale headers simply yield fewer locales.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::locale::{ALL, LocalizedMap};

/// Metadata for one locale: lower-cased keys to raw string values.
pub type Metadata = HashMap<String, String>;

static PARAGRAPH_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r?\n\r?\n").unwrap());
static METADATA_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_ ]+:").unwrap());
static FIELD_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*:\s*").unwrap());
static LANGUAGE_KEY_OVERRIDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"language_key\s*:\s*(\S+)\s*").unwrap());
static ALL_LANGUAGES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)languages:\s*all\s*").unwrap());

/// Per-locale metadata and markup extracted from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    /// Metadata by locale (or [`ALL`]).
    pub metadata: LocalizedMap<Metadata>,
    /// Raw body markup by locale (or [`ALL`]).
    pub markup: LocalizedMap<String>,
    /// Locale assumed for a document without locale tagging.
    ///
    /// `None` for documents split into per-locale blocks or shared with
    /// every locale.
    pub inferred_locale: Option<String>,
}

impl ParsedDocument {
    /// Single-locale document with the given metadata and markup.
    fn single(locale: &str, metadata: Metadata, markup: &str) -> Self {
        let mut doc = Self::default();
        doc.metadata.insert(locale, metadata);
        doc.markup.insert(locale, markup.to_owned());
        doc.inferred_locale = (locale != ALL).then(|| locale.to_owned());
        doc
    }
}

/// Patterns that depend on the document's language key.
struct LanguagePatterns {
    /// Detects the language key anywhere in the first paragraph.
    present: Regex,
    /// Matches one per-locale metadata block.
    block: Regex,
}

impl LanguagePatterns {
    fn new(key: &str) -> Option<Self> {
        let key = regex::escape(key);
        let present = Regex::new(&format!(r"(?i){key}\s*:\s*")).ok()?;
        let block = Regex::new(&format!(
            concat!(
                r"(?i)((?:[^\n]+\s*:[^\n]+\n)*)", // fields before the language field
                r"(?:{key}\s*:\s*([^\n]+)\n)",    // the language field
                r"((?:[^\n]+\s*:[^\n]+\n)*)",     // fields after the language field
            ),
            key = key
        ))
        .ok()?;
        Some(Self { present, block })
    }
}

/// Parser for the locale-aware metadata grammar.
#[derive(Debug, Clone)]
pub struct TextBlockParser {
    default_locale: String,
    language_key: String,
}

impl Default for TextBlockParser {
    fn default() -> Self {
        Self::new("en", "language")
    }
}

impl TextBlockParser {
    /// Create a parser.
    ///
    /// # Arguments
    ///
    /// * `default_locale` - Locale for documents without locale tagging
    /// * `language_key` - Metadata key that opens a per-locale block, unless
    ///   a document overrides it with `language_key: <key>`
    #[must_use]
    pub fn new(default_locale: impl Into<String>, language_key: impl Into<String>) -> Self {
        Self {
            default_locale: default_locale.into(),
            language_key: language_key.into(),
        }
    }

    /// Locale assigned to untagged documents.
    #[must_use]
    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// Parse raw document text.
    #[must_use]
    pub fn parse(&self, text: &str) -> ParsedDocument {
        if text.is_empty() {
            return ParsedDocument::single(&self.default_locale, Metadata::new(), "");
        }

        let mut parts = PARAGRAPH_BREAK.splitn(text, 2);
        let first_para = parts.next().unwrap_or_default();
        let remainder = parts.next().unwrap_or_default();

        if !is_metadata(first_para) {
            return ParsedDocument::single(&self.default_locale, Metadata::new(), text);
        }

        let language_key = LANGUAGE_KEY_OVERRIDE
            .captures(first_para)
            .and_then(|c| c.get(1))
            .map_or(self.language_key.as_str(), |m| m.as_str());

        let Some(patterns) = LanguagePatterns::new(language_key) else {
            return self.parse_untagged(first_para, remainder);
        };

        if !patterns.present.is_match(first_para) {
            return self.parse_untagged(first_para, remainder);
        }

        let doc = self.parse_locale_blocks(text, &patterns.block);
        if doc.markup.is_empty() {
            return self.parse_untagged(first_para, remainder);
        }
        doc
    }

    /// Header metadata with no per-locale blocks.
    fn parse_untagged(&self, first_para: &str, remainder: &str) -> ParsedDocument {
        let locale = if ALL_LANGUAGES.is_match(first_para) {
            ALL
        } else {
            &self.default_locale
        };
        ParsedDocument::single(locale, parse_metadata(first_para), remainder)
    }

    /// Repeatedly match per-locale blocks until no further block is found.
    fn parse_locale_blocks(&self, text: &str, block: &Regex) -> ParsedDocument {
        let mut doc = ParsedDocument::default();
        let mut rest = text;
        let mut next = block.captures(rest);

        while let Some(caps) = next {
            let Some(whole) = caps.get(0) else { break };

            let locale = caps.get(2).map_or("", |m| m.as_str().trim());
            let locale = if locale.is_empty() {
                self.default_locale.clone()
            } else {
                locale.to_owned()
            };

            let shared = parse_metadata(caps.get(1).map_or("", |m| m.as_str()));
            match doc.metadata.get_mut(ALL) {
                Some(all) => all.extend(shared),
                None => doc.metadata.insert(ALL, shared),
            }
            doc.metadata.insert(
                locale.as_str(),
                parse_metadata(caps.get(3).map_or("", |m| m.as_str())),
            );

            rest = &rest[whole.end()..];
            next = block.captures(rest);
            let body_end = next
                .as_ref()
                .and_then(|c| c.get(0))
                .map_or(rest.len(), |m| m.start());
            doc.markup.insert(locale, rest[..body_end].to_owned());
        }

        doc
    }
}

/// Whether a paragraph's first line looks like `key: value`.
fn is_metadata(paragraph: &str) -> bool {
    paragraph
        .split('\n')
        .next()
        .is_some_and(|line| METADATA_LINE.is_match(line))
}

/// Parse `key: value` lines into metadata.
///
/// Keys are lower-cased and values lose their trailing line terminator.
/// Blank lines and lines without a colon are skipped.
pub fn parse_metadata(paragraph: &str) -> Metadata {
    let mut metadata = Metadata::new();
    for line in paragraph.split('\n') {
        if line.trim().is_empty() {
            continue;
        }
        let Some(sep) = FIELD_SEPARATOR.find(line) else {
            continue;
        };
        let key = line[..sep.start()].to_lowercase();
        let value = chomp(&line[sep.end()..]);
        metadata.insert(key, value.to_owned());
    }
    metadata
}

/// Strip one trailing line terminator.
fn chomp(value: &str) -> &str {
    value
        .strip_suffix("\r\n")
        .or_else(|| value.strip_suffix('\n'))
        .or_else(|| value.strip_suffix('\r'))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn meta(pairs: &[(&str, &str)]) -> Metadata {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_plain_markup_uses_default_locale() {
        let doc = TextBlockParser::default().parse("# Hello\n\nJust a body.\n");

        assert_eq!(doc.markup.get("en").map(String::as_str), Some("# Hello\n\nJust a body.\n"));
        assert_eq!(doc.metadata.get("en"), Some(&Metadata::new()));
        assert_eq!(doc.markup.len(), 1);
        assert_eq!(doc.inferred_locale.as_deref(), Some("en"));
    }

    #[test]
    fn test_empty_document() {
        let doc = TextBlockParser::new("de", "language").parse("");

        assert_eq!(doc.markup.get("de").map(String::as_str), Some(""));
        assert_eq!(doc.metadata.get("de"), Some(&Metadata::new()));
    }

    #[test]
    fn test_header_without_language_key() {
        let text = "Title: My Page\nDate: 2024-01-02\n\n# My Page\n\nBody.\n";
        let doc = TextBlockParser::default().parse(text);

        assert_eq!(
            doc.metadata.get("en"),
            Some(&meta(&[("title", "My Page"), ("date", "2024-01-02")]))
        );
        assert_eq!(
            doc.markup.get("en").map(String::as_str),
            Some("# My Page\n\nBody.\n")
        );
    }

    #[test]
    fn test_header_only_document() {
        let doc = TextBlockParser::default().parse("Title: Stub\n");

        assert_eq!(doc.metadata.get("en"), Some(&meta(&[("title", "Stub")])));
        assert_eq!(doc.markup.get("en").map(String::as_str), Some(""));
    }

    #[test]
    fn test_languages_all_goes_to_sentinel() {
        let text = "Languages: all\nTitle: Everywhere\n\nBody";
        let doc = TextBlockParser::default().parse(text);

        assert!(doc.metadata.contains(ALL));
        assert!(!doc.metadata.contains("en"));
        assert_eq!(doc.markup.get(ALL).map(String::as_str), Some("Body"));
        assert_eq!(
            doc.metadata.get(ALL).and_then(|m| m.get("title")).map(String::as_str),
            Some("Everywhere")
        );
    }

    #[test]
    fn test_crlf_paragraph_break() {
        let doc = TextBlockParser::default().parse("Title: Windows\r\n\r\nBody\r\n");

        assert_eq!(doc.metadata.get("en"), Some(&meta(&[("title", "Windows")])));
        assert_eq!(doc.markup.get("en").map(String::as_str), Some("Body\r\n"));
    }

    #[test]
    fn test_keys_lowercased_values_kept() {
        let metadata = parse_metadata("Read More : Keep going  \nATOM ID: tag:example.com,2024:1\r");

        assert_eq!(
            metadata,
            meta(&[
                ("read more", "Keep going  "),
                ("atom id", "tag:example.com,2024:1"),
            ])
        );
    }

    #[test]
    fn test_metadata_roundtrip() {
        let pairs = [
            ("title", "A page"),
            ("categories", "guides:5, news"),
            ("summary", "First line\\nsecond line"),
            ("flags", "draft"),
        ];
        let text: String = pairs.iter().map(|(k, v)| format!("{k}: {v}\n")).collect();

        assert_eq!(parse_metadata(&text), meta(&pairs));
    }

    #[test]
    fn test_lines_without_colon_are_skipped() {
        let metadata = parse_metadata("title: ok\njust words\n\nflags: draft");
        assert_eq!(metadata, meta(&[("title", "ok"), ("flags", "draft")]));
    }

    #[test]
    fn test_non_metadata_first_line() {
        let text = "Some prose: with a colon later\nis still markup";
        // The first line matches `[\w ]+:` so it is metadata-shaped...
        let doc = TextBlockParser::default().parse(text);
        assert!(doc.metadata.get("en").is_some_and(|m| m.contains_key("some prose")));

        // ...but punctuation before the colon makes it markup.
        let doc = TextBlockParser::default().parse("Hello, world: again\n\nMore");
        assert_eq!(doc.metadata.get("en"), Some(&Metadata::new()));
        assert_eq!(
            doc.markup.get("en").map(String::as_str),
            Some("Hello, world: again\n\nMore")
        );
    }

    #[test]
    fn test_locale_blocks() {
        let text = "\
Date: 2024-03-01
Language: en
Title: Hello

English body.
Language: fr
Title: Bonjour

Corps français.
";
        let doc = TextBlockParser::default().parse(text);

        assert_eq!(doc.metadata.get(ALL), Some(&meta(&[("date", "2024-03-01")])));
        assert_eq!(doc.metadata.get("en"), Some(&meta(&[("title", "Hello")])));
        assert_eq!(doc.metadata.get("fr"), Some(&meta(&[("title", "Bonjour")])));
        assert_eq!(
            doc.markup.get("en").map(String::as_str),
            Some("\nEnglish body.\n")
        );
        assert_eq!(
            doc.markup.get("fr").map(String::as_str),
            Some("\nCorps français.\n")
        );
        assert_eq!(doc.markup.locales().collect::<Vec<_>>(), vec!["en", "fr"]);
        assert_eq!(doc.inferred_locale, None);
    }

    #[test]
    fn test_shared_fields_merge_across_blocks() {
        let text = "\
Date: 2024-03-01
Language: en
Title: Hello

Body en
Flags: draft
Language: de
Title: Hallo

Body de
";
        let doc = TextBlockParser::default().parse(text);

        assert_eq!(
            doc.metadata.get(ALL),
            Some(&meta(&[("date", "2024-03-01"), ("flags", "draft")]))
        );
        assert_eq!(doc.markup.get("en").map(String::as_str), Some("\nBody en\n"));
    }

    #[test]
    fn test_language_key_override() {
        let text = "\
language_key: lang
lang: en
title: Hi

Hello
lang: es
title: Hola

Hola mundo
";
        let doc = TextBlockParser::default().parse(text);

        assert_eq!(
            doc.metadata.get(ALL).and_then(|m| m.get("language_key")).map(String::as_str),
            Some("lang")
        );
        assert_eq!(doc.metadata.get("es"), Some(&meta(&[("title", "Hola")])));
        assert_eq!(doc.markup.get("es").map(String::as_str), Some("\nHola mundo\n"));
    }

    #[test]
    fn test_configured_language_key() {
        let text = "locale: en\ntitle: Hi\n\nHello\n";
        let doc = TextBlockParser::new("en", "locale").parse(text);

        assert_eq!(doc.metadata.get("en"), Some(&meta(&[("title", "Hi")])));
        assert_eq!(doc.markup.get("en").map(String::as_str), Some("\nHello\n"));
    }

    #[test]
    fn test_malformed_locale_header_degrades() {
        // The language key is present but never followed by a newline, so no
        // block matches; the header is treated as untagged metadata.
        let text = "Title: x\nLanguage: en";
        let doc = TextBlockParser::default().parse(text);

        assert_eq!(doc.markup.len(), 1);
        assert_eq!(
            doc.metadata.get("en"),
            Some(&meta(&[("title", "x"), ("language", "en")]))
        );
    }

    #[test]
    fn test_every_markup_locale_has_metadata() {
        let text = "Language: en\n\nA\nLanguage: fr\n\nB\n";
        let doc = TextBlockParser::default().parse(text);

        for locale in doc.markup.locales() {
            assert!(doc.metadata.resolve(locale).is_some(), "missing {locale}");
        }
    }

    #[test]
    fn test_chomp() {
        assert_eq!(chomp("a\r\n"), "a");
        assert_eq!(chomp("a\n"), "a");
        assert_eq!(chomp("a\r"), "a");
        assert_eq!(chomp("a "), "a ");
    }
}
