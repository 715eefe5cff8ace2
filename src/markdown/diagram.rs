//! Diagram post-processing
//!
//! Finds diagram source blocks in rendered HTML (fenced blocks tagged with
//! the diagram language) and replaces each one with the output of a
//! [`DiagramBackend`]. A failing block is logged and left as it was; it never
//! aborts the rest of the pass.

use crate::config::DIAGRAM_LANGUAGE;
use crate::error::{DiagramError, DiagramResult};
use crate::theme::DiagramPalette;
use crate::utils::{escape_html, unescape_html};
use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

fn re_diagram_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(
            r#"(?s)<pre><code class="language-{}">(.*?)</code></pre>"#,
            regex::escape(DIAGRAM_LANGUAGE)
        );
        Regex::new(&pattern).expect("valid diagram block pattern")
    })
}

/// Turns diagram description text into displayable markup
pub trait DiagramBackend: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Render one diagram with the given palette
    fn render(&self, source: &str, palette: DiagramPalette) -> DiagramResult<String>;
}

/// A diagram source block located in an HTML fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramBlock {
    /// Byte range of the whole `<pre>` element
    pub range: Range<usize>,
    /// Unescaped diagram description text
    pub source: String,
}

/// Locate every diagram source block in rendered HTML
pub fn find_blocks(html: &str) -> Vec<DiagramBlock> {
    re_diagram_block()
        .captures_iter(html)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(DiagramBlock {
                range: whole.range(),
                source: unescape_html(&caps[1]),
            })
        })
        .collect()
}

/// Whether an HTML fragment contains any diagram source block
pub fn has_diagrams(html: &str) -> bool {
    re_diagram_block().is_match(html)
}

/// Result of one diagram pass over a fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramPass {
    pub html: String,
    pub rendered: usize,
    pub failed: Vec<DiagramError>,
}

/// Replaces diagram blocks using a backend
pub struct DiagramRenderer {
    backend: Box<dyn DiagramBackend>,
}

impl DiagramRenderer {
    pub fn new(backend: Box<dyn DiagramBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Render every diagram block in `html`
    pub fn render(&self, html: &str, palette: DiagramPalette) -> DiagramPass {
        let mut out = String::with_capacity(html.len());
        let mut rendered = 0;
        let mut failed = Vec::new();
        let mut last = 0;

        for block in find_blocks(html) {
            out.push_str(&html[last..block.range.start]);
            match self.backend.render(&block.source, palette) {
                Ok(markup) => {
                    out.push_str(&markup);
                    rendered += 1;
                }
                Err(e) => {
                    log::warn!("Diagram render error ({}): {}", self.backend.name(), e);
                    out.push_str(&html[block.range.clone()]);
                    failed.push(e);
                }
            }
            last = block.range.end;
        }
        out.push_str(&html[last..]);

        DiagramPass {
            html: out,
            rendered,
            failed,
        }
    }
}

impl Default for DiagramRenderer {
    fn default() -> Self {
        Self::new(Box::new(MermaidBackend))
    }
}

/// Hands diagrams to the mermaid browser library.
///
/// The block becomes a `<pre class="mermaid">` element carrying the palette,
/// which the library's page script draws on load. Only blocks with no
/// diagram statement at all are rejected; the library reports its own syntax
/// errors in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct MermaidBackend;

impl MermaidBackend {
    /// First statement of the diagram, skipping blank lines, `%%` comments
    /// and a leading `---` front-matter block
    fn diagram_type(source: &str) -> Option<&str> {
        let mut lines = source.lines().map(str::trim).peekable();
        if lines.peek() == Some(&"---") {
            lines.next();
            for line in lines.by_ref() {
                if line == "---" {
                    break;
                }
            }
        }
        lines
            .filter(|l| !l.is_empty() && !l.starts_with("%%"))
            .find_map(|l| l.split_whitespace().next())
    }
}

impl DiagramBackend for MermaidBackend {
    fn name(&self) -> &'static str {
        "mermaid"
    }

    fn render(&self, source: &str, palette: DiagramPalette) -> DiagramResult<String> {
        let kind = Self::diagram_type(source).ok_or(DiagramError::EmptySource)?;
        log::trace!("Handing {} diagram to the page script", kind);

        Ok(format!(
            "<pre class=\"mermaid\" data-palette=\"{}\">{}</pre>",
            palette,
            escape_html(source.trim_end())
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::MarkdownRenderer;

    struct FailingBackend;

    impl DiagramBackend for FailingBackend {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn render(&self, _source: &str, _palette: DiagramPalette) -> DiagramResult<String> {
            Err(DiagramError::Backend {
                backend: "failing",
                reason: "boom".to_string(),
            })
        }
    }

    #[test]
    fn test_find_blocks_unescapes_source() {
        let html = MarkdownRenderer::new().render("Intro\n\n```mermaid\ngraph LR\n  A --> B\n```\n");
        let blocks = find_blocks(&html);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].source, "graph LR\n  A --> B\n");
        assert!(html[blocks[0].range.clone()].starts_with("<pre><code class=\"language-mermaid\">"));
    }

    #[test]
    fn test_other_languages_are_ignored() {
        let html = MarkdownRenderer::new().render("```rust\nfn main() {}\n```");
        assert!(!has_diagrams(&html));
        let pass = DiagramRenderer::default().render(&html, DiagramPalette::Default);
        assert_eq!(pass.html, html);
        assert_eq!(pass.rendered, 0);
    }

    #[test]
    fn test_mermaid_backend_uses_palette() {
        let html = MarkdownRenderer::new().render("```mermaid\ngraph TD\n  A --> B\n```\n\nAfter");
        let pass = DiagramRenderer::default().render(&html, DiagramPalette::Neutral);
        assert_eq!(pass.rendered, 1);
        assert!(pass.failed.is_empty());
        assert!(pass
            .html
            .starts_with("<pre class=\"mermaid\" data-palette=\"neutral\">graph TD\n  A --&gt; B</pre>"));
        assert!(pass.html.ends_with("<p>After</p>\n"));
    }

    #[test]
    fn test_failed_block_is_left_in_place() {
        let source = "```mermaid\n%% nothing yet\n```\n\n```mermaid\npie\n  \"A\" : 1\n```";
        let html = MarkdownRenderer::new().render(source);
        let pass = DiagramRenderer::default().render(&html, DiagramPalette::Forest);

        assert_eq!(pass.rendered, 1);
        assert_eq!(pass.failed, vec![DiagramError::EmptySource]);
        assert!(pass.html.contains("<pre><code class=\"language-mermaid\">%% nothing yet\n</code></pre>"));
        assert!(pass.html.contains("data-palette=\"forest\""));
    }

    #[test]
    fn test_any_diagram_statement_is_handed_on() {
        let source = "```mermaid\nflowchart-elk TD\n  A --> B\n```\n\n```mermaid\nzenuml\n  A.b()\n```\n\n```mermaid\nxychart\n```";
        let html = MarkdownRenderer::new().render(source);
        let pass = DiagramRenderer::default().render(&html, DiagramPalette::Default);

        assert_eq!(pass.rendered, 3);
        assert!(pass.failed.is_empty());
        assert!(pass
            .html
            .contains("<pre class=\"mermaid\" data-palette=\"default\">flowchart-elk TD\n  A --&gt; B</pre>"));
        assert!(!pass.html.contains("language-mermaid"));
    }

    #[test]
    fn test_backend_name() {
        assert_eq!(DiagramRenderer::default().backend_name(), "mermaid");
        assert_eq!(DiagramRenderer::new(Box::new(FailingBackend)).backend_name(), "failing");
    }

    #[test]
    fn test_backend_failure_is_contained() {
        let html = MarkdownRenderer::new().render("# T\n\n```mermaid\ngraph TD\n```\n\ntext");
        let pass = DiagramRenderer::new(Box::new(FailingBackend)).render(&html, DiagramPalette::Default);
        assert_eq!(pass.html, html);
        assert_eq!(pass.failed.len(), 1);
    }

    #[test]
    fn test_diagram_type_detection() {
        assert_eq!(MermaidBackend::diagram_type("%% note\n\ngraph TD"), Some("graph"));
        assert_eq!(
            MermaidBackend::diagram_type("---\ntitle: Flow\n---\nflowchart LR"),
            Some("flowchart")
        );
        assert_eq!(MermaidBackend::diagram_type("  \n"), None);
        assert_eq!(
            MermaidBackend.render("", DiagramPalette::Default),
            Err(DiagramError::EmptySource)
        );
    }
}
