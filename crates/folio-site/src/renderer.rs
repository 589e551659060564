//! Markup-to-HTML rendering hook.
//!
//! Rendering is delegated to a [`Renderer`] chosen by the host. The bundled
//! [`MarkdownRenderer`] handles Markdown only; hosts that serve Haml or
//! Textile pages plug in their own implementation.

use folio_content::Format;
use pulldown_cmark::{Options, Parser, html};

/// Error returned when rendering fails.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// No renderer is available for the format.
    #[error("No renderer for {0} documents")]
    Unsupported(Format),
    /// The renderer failed.
    #[error("Render failed: {0}")]
    Failed(String),
}

/// Converts raw markup to HTML.
pub trait Renderer: Send + Sync {
    /// Render `text` written in `format`.
    fn render(&self, format: Format, text: &str) -> Result<String, RenderError>;
}

/// Markdown renderer backed by `pulldown-cmark`.
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer {
    gfm: bool,
}

impl MarkdownRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable GitHub Flavored Markdown extensions (tables, strikethrough,
    /// task lists).
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }
}

impl Renderer for MarkdownRenderer {
    fn render(&self, format: Format, text: &str) -> Result<String, RenderError> {
        if format != Format::Markdown {
            return Err(RenderError::Unsupported(format));
        }
        let parser = Parser::new_ext(text, self.parser_options());
        let mut out = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut out, parser);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_markdown() {
        let html = MarkdownRenderer::new()
            .render(Format::Markdown, "Hello *world*")
            .unwrap();
        assert_eq!(html, "<p>Hello <em>world</em></p>\n");
    }

    #[test]
    fn test_gfm_tables() {
        let text = "| a |\n|---|\n| 1 |\n";
        let plain = MarkdownRenderer::new().render(Format::Markdown, text).unwrap();
        let gfm = MarkdownRenderer::new()
            .with_gfm(true)
            .render(Format::Markdown, text)
            .unwrap();

        assert!(!plain.contains("<table>"));
        assert!(gfm.contains("<table>"));
    }

    #[test]
    fn test_other_formats_unsupported() {
        let err = MarkdownRenderer::new()
            .render(Format::Textile, "h1. Title")
            .unwrap_err();
        assert!(matches!(err, RenderError::Unsupported(Format::Textile)));
        assert_eq!(err.to_string(), "No renderer for textile documents");
    }
}
