//! Standalone HTML export
//!
//! Compiles a document snapshot into one self-contained HTML file: all
//! styling is inlined in a single `<style>` block, and the diagram library
//! and web fonts are referenced by URL (the file is expected to be opened
//! with network access). Diagrams are not pre-rendered; a bootstrap script
//! draws them when the file is opened, always with the `default` palette.

use super::renderer::MarkdownRenderer;
use crate::config::{ExportConfig, DIAGRAM_LANGUAGE};
use crate::state::DocumentState;
use crate::theme::{NOTEBOOK_MARGIN_COLOR, NOTEBOOK_RULE_COLOR};
use crate::utils::escape_html;
use std::sync::Arc;

/// Palette the exported bootstrap script initialises diagrams with
pub const EXPORT_DIAGRAM_PALETTE: &str = "default";

/// Compiles document snapshots into standalone HTML documents
#[derive(Debug, Clone)]
pub struct StandaloneCompiler {
    renderer: Arc<MarkdownRenderer>,
    options: ExportConfig,
}

impl StandaloneCompiler {
    pub fn new(renderer: Arc<MarkdownRenderer>, options: ExportConfig) -> Self {
        Self { renderer, options }
    }

    /// Compile `state` into a complete HTML document. Pure.
    pub fn compile(&self, state: &DocumentState) -> String {
        let theme = state.theme.theme();
        let rendered_content = self.renderer.render(&state.markdown);

        let header = if state.has_header() {
            format!(
                "        <header>\n{}        </header>\n",
                self.renderer.render(&state.header)
            )
        } else {
            String::new()
        };
        let footer = if state.has_footer() {
            format!(
                "        <footer>\n{}        </footer>\n",
                self.renderer.render(&state.footer)
            )
        } else {
            String::new()
        };

        let notebook_styles = if theme.is_ruled() {
            notebook_styles()
        } else {
            String::new()
        };

        let mut print_rules = String::new();
        if state.header_mode.is_fixed() {
            print_rules.push_str("            header { position: fixed; top: 0; width: 100%; }\n");
        }
        if state.footer_mode.is_fixed() {
            print_rules.push_str("            footer { position: fixed; bottom: 0; width: 100%; }\n");
        }

        format!(
            r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <script src="{script}"></script>
    <link href="{fonts}" rel="stylesheet">
    <style>
        body {{
            margin: 0;
            padding: 40px;
            background-color: {bg};
            color: {text};
            font-family: {font};
            font-size: {size}px;
            line-height: 1.6;
        }}
        .container {{
            max-width: 800px;
            margin: 0 auto;
        }}
        header {{
            border-bottom: 1px solid #ddd;
            margin-bottom: 2rem;
            font-size: 0.9em;
            color: #666;
        }}
        footer {{
            border-top: 1px solid #ddd;
            margin-top: 4rem;
            padding-top: 1rem;
            font-size: 0.8em;
            color: #666;
        }}
        h1, h2, h3 {{ color: {accent}; margin-top: 1.5em; }}
        a {{ color: {accent}; }}
        pre {{ background: #f3f4f6; padding: 1rem; border-radius: 4px; overflow-x: auto; color: #1f2937; }}
        code {{ font-family: "JetBrains Mono", monospace; font-size: 0.9em; }}
        table {{ border-collapse: collapse; width: 100%; margin: 1rem 0; }}
        th, td {{ border: 1px solid #e5e7eb; padding: 8px; text-align: left; }}
        th {{ background: #f9fafb; }}
        blockquote {{ border-left: 4px solid {accent}; padding-left: 1rem; font-style: italic; color: #4b5563; }}
        img {{ max-width: 100%; height: auto; border-radius: 4px; }}
{notebook}
        @media print {{
            body {{ padding: 0; }}
            .container {{ max-width: 100%; }}
            pre, blockquote, table {{ page-break-inside: avoid; }}
            h1, h2, h3 {{ page-break-after: avoid; }}
{print_rules}        }}
    </style>
</head>
<body>
    <div class="container">
{header}        <div class="content-wrapper">
{content}        </div>
{footer}    </div>
    <script>
        document.querySelectorAll('pre > code.language-{diagram_lang}').forEach(function (node) {{
            node.classList.add('mermaid');
        }});
        mermaid.initialize({{ startOnLoad: true, theme: '{palette}' }});
    </script>
</body>
</html>
"#,
            lang = escape_html(&self.options.lang),
            title = escape_html(&self.options.title),
            script = escape_html(&self.options.diagram_script_url),
            fonts = escape_html(&self.options.font_stylesheet_url),
            bg = theme.bg,
            text = theme.text,
            font = state.font_family.stack(),
            size = state.font_size,
            accent = theme.accent,
            notebook = notebook_styles,
            print_rules = print_rules,
            header = header,
            content = rendered_content,
            footer = footer,
            diagram_lang = DIAGRAM_LANGUAGE,
            palette = EXPORT_DIAGRAM_PALETTE,
        )
    }
}

impl Default for StandaloneCompiler {
    fn default() -> Self {
        Self::new(MarkdownRenderer::shared(), ExportConfig::default())
    }
}

/// Ruled paper and margin line of the notebook theme
fn notebook_styles() -> String {
    format!(
        r#"        .content-wrapper {{
            background-image: linear-gradient({rule} 1px, transparent 1px);
            background-size: 100% 1.5rem;
            position: relative;
            padding-left: 60px !important;
        }}
        .content-wrapper::before {{
            content: "";
            position: absolute;
            top: 0;
            left: 50px;
            bottom: 0;
            width: 2px;
            background-color: {margin};
        }}
"#,
        rule = NOTEBOOK_RULE_COLOR,
        margin = NOTEBOOK_MARGIN_COLOR,
    )
}

/// Compile a snapshot with the shared renderer and default export settings
pub fn compile_standalone_document(state: &DocumentState) -> String {
    StandaloneCompiler::default().compile(state)
}
