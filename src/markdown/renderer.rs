//! Markdown to HTML rendering
//!
//! One configuration, fixed for the process lifetime, shared by the preview
//! and the export path so both produce the same HTML for the same text.
//!
//! Trust model: raw HTML in the source is passed through unescaped. The
//! author of the document is its only reader, so embedded HTML is treated as
//! intentional markup, not as untrusted input. Do not add sanitisation here;
//! it would change what both surfaces render.

use super::linkify::linkify;
use pulldown_cmark::{html, Options, Parser};
use std::sync::{Arc, OnceLock};

/// Deterministic markdown renderer
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    options: Options,
    linkify: bool,
}

impl MarkdownRenderer {
    /// Create a renderer with tables, strikethrough, typographic
    /// substitutions and bare-URL autolinking
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_SMART_PUNCTUATION);

        Self {
            options,
            linkify: true,
        }
    }

    /// Process-wide instance, built on first use
    pub fn shared() -> Arc<MarkdownRenderer> {
        static SHARED: OnceLock<Arc<MarkdownRenderer>> = OnceLock::new();
        Arc::clone(SHARED.get_or_init(|| Arc::new(MarkdownRenderer::new())))
    }

    /// Render markdown to an HTML fragment
    pub fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);
        let mut html_content = String::with_capacity(markdown.len() * 3 / 2);

        if self.linkify {
            html::push_html(&mut html_content, linkify(parser).into_iter());
        } else {
            html::push_html(&mut html_content, parser);
        }

        html_content
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_is_deterministic() {
        let renderer = MarkdownRenderer::new();
        let source = crate::templates::default_template().markdown;
        assert_eq!(renderer.render(source), renderer.render(source));
        assert_eq!(renderer.render(source), MarkdownRenderer::shared().render(source));
    }

    #[test]
    fn test_raw_html_passes_through() {
        let html = MarkdownRenderer::new().render("<div class=\"note\">kept</div>\n\nText <b>bold</b>");
        assert!(html.contains("<div class=\"note\">kept</div>"));
        assert!(html.contains("<b>bold</b>"));
    }

    #[test]
    fn test_typographic_substitution() {
        let html = MarkdownRenderer::new().render("\"quoted\" -- dash --- em");
        assert!(html.contains("\u{201c}quoted\u{201d}"));
        assert!(html.contains("\u{2013}"));
        assert!(html.contains("\u{2014}"));
    }

    #[test]
    fn test_tables_render() {
        let html = MarkdownRenderer::new().render("| a | b |\n| --- | --- |\n| 1 | 2 |");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>2</td>"));
    }

    #[test]
    fn test_diagram_fence_is_tagged() {
        let html = MarkdownRenderer::new().render("```mermaid\ngraph TD\n  A --> B\n```");
        assert_eq!(
            html,
            "<pre><code class=\"language-mermaid\">graph TD\n  A --&gt; B\n</code></pre>\n"
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(MarkdownRenderer::new().render(""), "");
    }
}
