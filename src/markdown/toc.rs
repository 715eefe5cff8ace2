//! Heading extraction for the table of contents
//!
//! A lexical line scan, not a markdown parse: a `#` line inside a fenced
//! code block is reported as a heading too. Only levels 1 to 3 are listed.

use crate::utils::escape_html;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

fn re_heading() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(#{1,3})\s+(.+)$").expect("valid heading pattern"))
}

/// One table-of-contents entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocItem {
    /// `heading-<line index>`, stable for a given source text
    pub id: String,
    /// 1, 2 or 3
    pub level: u8,
    pub text: String,
}

/// Extract level 1-3 headings in document order
pub fn extract_headings(markdown: &str) -> Vec<TocItem> {
    markdown
        .split('\n')
        .enumerate()
        .filter_map(|(index, line)| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            let caps = re_heading().captures(line)?;
            let text = caps[2].trim();
            if text.is_empty() {
                return None;
            }
            Some(TocItem {
                id: format!("heading-{}", index),
                level: caps[1].len() as u8,
                text: text.to_string(),
            })
        })
        .collect()
}

/// The side panel listing the current headings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocPanel {
    pub items: Vec<TocItem>,
    /// Whether the panel is expanded; the toggle button is always shown
    pub open: bool,
}

impl TocPanel {
    pub fn new(items: Vec<TocItem>, open: bool) -> Self {
        Self { items, open }
    }

    /// HTML for the toggle button and, when open, the panel itself
    pub fn to_html(&self) -> String {
        let mut html = String::from(
            "<button class=\"toc-toggle no-print\" title=\"Contents\" aria-label=\"Contents\">&#9776;</button>\n",
        );
        if !self.open {
            return html;
        }

        html.push_str("<aside class=\"toc-panel no-print\">\n<h3>Contents</h3>\n");
        if self.items.is_empty() {
            html.push_str("<p class=\"toc-empty\">No H1-H3 headings found.</p>\n");
        } else {
            for item in &self.items {
                html.push_str(&format!(
                    "<div class=\"toc-item toc-level-{}\" data-target=\"{}\">{}</div>\n",
                    item.level,
                    item.id,
                    escape_html(&item.text)
                ));
            }
        }
        html.push_str("</aside>\n");
        html
    }
}

/// Level-based emphasis of panel entries: level 1 bold, level 2 lightly
/// indented, level 3 further indented and muted.
pub const TOC_PANEL_CSS: &str = r#"
        .toc-toggle { position: absolute; top: 1rem; right: 1rem; z-index: 20; padding: 0.5rem; border: 1px solid #e5e7eb; border-radius: 9999px; background: rgba(255,255,255,0.8); cursor: pointer; }
        .toc-panel { position: absolute; top: 0; right: 0; height: 100%; width: 16rem; overflow-y: auto; background: #ffffff; border-left: 1px solid #e5e7eb; box-shadow: -4px 0 12px rgba(0,0,0,0.1); z-index: 30; padding: 1rem; }
        .toc-panel h3 { margin-top: 0; color: #374151; }
        .toc-item { font-size: 0.875rem; margin: 0.5rem 0; cursor: pointer; }
        .toc-item:hover { color: #2563eb; }
        .toc-level-1 { font-weight: bold; }
        .toc-level-2 { padding-left: 0.5rem; }
        .toc-level-3 { padding-left: 1rem; color: #6b7280; }
        .toc-empty { color: #9ca3af; font-size: 0.75rem; }
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn levels_and_text(items: &[TocItem]) -> Vec<(u8, &str)> {
        items.iter().map(|i| (i.level, i.text.as_str())).collect()
    }

    #[test]
    fn test_extracts_three_levels_only() {
        let items = extract_headings("# Title\nsome text\n## Section\n### Sub\n#### TooDeep");
        assert_eq!(
            levels_and_text(&items),
            vec![(1, "Title"), (2, "Section"), (3, "Sub")]
        );
        assert_eq!(items[0].id, "heading-0");
        assert_eq!(items[1].id, "heading-2");
    }

    #[test]
    fn test_empty_input() {
        assert!(extract_headings("").is_empty());
        assert!(extract_headings("no headings\nat all").is_empty());
    }

    #[test]
    fn test_requires_whitespace_and_text() {
        let items = extract_headings("#NoSpace\n#   \n##\tTabbed  \n  # Indented");
        assert_eq!(levels_and_text(&items), vec![(2, "Tabbed")]);
    }

    #[test]
    fn test_crlf_lines() {
        let items = extract_headings("# One\r\n## Two\r\n");
        assert_eq!(levels_and_text(&items), vec![(1, "One"), (2, "Two")]);
    }

    #[test]
    fn test_fenced_code_is_not_special() {
        let items = extract_headings("```bash\n# a shell comment\n```");
        assert_eq!(levels_and_text(&items), vec![(1, "a shell comment")]);
    }

    #[test]
    fn test_panel_html() {
        let items = extract_headings("# A & B\n### C");
        let closed = TocPanel::new(items.clone(), false).to_html();
        assert!(closed.contains("toc-toggle"));
        assert!(!closed.contains("toc-panel"));

        let open = TocPanel::new(items, true).to_html();
        assert!(open.contains("<div class=\"toc-item toc-level-1\" data-target=\"heading-0\">A &amp; B</div>"));
        assert!(open.contains("toc-level-3"));

        let empty = TocPanel::new(Vec::new(), true).to_html();
        assert!(empty.contains("No H1-H3 headings found."));
    }
}
