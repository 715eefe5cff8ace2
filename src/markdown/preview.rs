//! Live preview composition
//!
//! The composer turns a [`DocumentState`] into a [`PreviewView`] and mounts
//! it on a shared [`PreviewTarget`]. Diagram expansion runs afterwards as a
//! separate task, after a short settle delay. Every mount bumps a generation
//! number; a diagram pass whose generation is no longer mounted discards its
//! result instead of writing over newer content.

use super::diagram::{has_diagrams, DiagramRenderer};
use super::renderer::MarkdownRenderer;
use super::toc::{extract_headings, TocItem, TocPanel, TOC_PANEL_CSS};
use crate::config::{ExportConfig, DEFAULT_DIAGRAM_SETTLE_MS};
use crate::state::DocumentState;
use crate::theme::{DiagramPalette, FontId, ThemeId, NOTEBOOK_MARGIN_COLOR, NOTEBOOK_RULE_COLOR};
use crate::utils::escape_html;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

/// A rendered header or footer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub html: String,
    /// Pinned to the viewport edge instead of scrolling with the content
    pub fixed: bool,
}

/// Everything the live view shows for one document snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewView {
    pub generation: u64,
    pub theme: ThemeId,
    pub font_family: FontId,
    pub font_size: u32,
    pub header: Option<Region>,
    /// Renderer output for the document body, before diagram expansion
    pub source_html: String,
    /// What is currently displayed; diagram-expanded once the pass lands
    pub content_html: String,
    /// Whether a diagram pass has landed on this view
    pub diagrams_applied: bool,
    pub footer: Option<Region>,
    /// Present only when the document shows a table of contents
    pub toc: Option<TocPanel>,
}

impl PreviewView {
    /// Whether the diagram pass has not replaced the content yet
    pub fn diagrams_pending(&self) -> bool {
        !self.diagrams_applied && has_diagrams(&self.source_html)
    }

    /// Palette the diagram pass uses for this view
    pub fn palette(&self) -> DiagramPalette {
        self.theme.diagram_palette()
    }

    /// Scoped stylesheet of the preview surface
    pub fn styles(&self) -> String {
        let theme = self.theme.theme();
        format!(
            r#"
        .preview-root {{ position: relative; height: 100%; overflow: hidden; }}
        .preview-scroll {{ height: 100%; overflow-y: auto; padding: 3rem; background-color: {bg}; color: {text}; font-family: {font}; }}
        .preview-page {{ max-width: 48rem; margin: 0 auto; }}
        .preview-header {{ padding-bottom: 1rem; border-bottom: 1px solid #e5e7eb; font-size: 0.875rem; opacity: 0.7; margin-bottom: 2rem; }}
        .preview-footer {{ padding-top: 2rem; border-top: 1px solid #e5e7eb; font-size: 0.75rem; opacity: 0.6; text-align: center; margin-top: 2rem; }}
        .preview-header.pinned {{ position: sticky; top: 0; background: inherit; z-index: 10; }}
        .preview-footer.pinned {{ position: sticky; bottom: 0; background: inherit; z-index: 10; }}
        .preview-content {{ font-size: {size}px; line-height: 1.6; }}
        .preview-content.ruled {{ background-image: linear-gradient({rule} 1px, transparent 1px); background-size: 100% 1.5rem; position: relative; padding-left: 60px; }}
        .notebook-margin {{ position: absolute; top: 0; left: 50px; bottom: 0; width: 2px; background-color: {margin}; pointer-events: none; }}
        .preview-content h1 {{ color: {accent}; font-weight: 800; font-size: 2em; margin-top: 0; }}
        .preview-content h2 {{ color: {accent}; font-weight: 700; font-size: 1.5em; border-bottom: 1px solid #eee; padding-bottom: 0.3em; }}
        .preview-content h3 {{ color: {accent}; font-weight: 600; font-size: 1.25em; }}
        .preview-content blockquote {{ border-left: 4px solid {accent}; padding-left: 1rem; font-style: italic; color: #4b5563; }}
        .preview-content table {{ border-collapse: collapse; width: 100%; }}
        .preview-content th, .preview-content td {{ border: 1px solid #cbd5e1; padding: 0.5rem; text-align: left; }}
        .preview-content th {{ background-color: rgba(0,0,0,0.05); }}
        .preview-content pre {{ background-color: #f8fafc; padding: 1rem; border-radius: 0.5rem; overflow-x: auto; margin: 1rem 0; border: 1px solid #e2e8f0; color: #1e293b; }}
        .preview-content code {{ font-family: 'JetBrains Mono', monospace; font-size: 0.9em; }}
        .preview-content img {{ max-width: 100%; border-radius: 0.5rem; }}
        .preview-content p {{ margin-bottom: 1rem; }}
        .preview-content a {{ color: {accent}; text-decoration: underline; }}
{toc}
        @media print {{
            .no-print {{ display: none !important; }}
            .preview-scroll {{ padding: 0; overflow: visible; }}
            .preview-content {{ padding-left: 0 !important; background-image: none !important; }}
        }}
"#,
            bg = theme.bg,
            text = theme.text,
            font = self.font_family.stack(),
            size = self.font_size,
            rule = NOTEBOOK_RULE_COLOR,
            margin = NOTEBOOK_MARGIN_COLOR,
            accent = theme.accent,
            toc = if self.toc.is_some() { TOC_PANEL_CSS } else { "" },
        )
    }

    /// Markup of the preview surface, to be placed inside a host page
    pub fn to_html(&self) -> String {
        let theme = self.theme.theme();
        let mut html = format!("<div class=\"preview-root {}\">\n", theme.class_name);

        if let Some(toc) = &self.toc {
            html.push_str(&toc.to_html());
        }

        html.push_str("<div class=\"preview-scroll\">\n<div class=\"preview-page\">\n");

        if let Some(header) = &self.header {
            html.push_str(&region_html("preview-header", header));
        }

        if theme.is_ruled() {
            html.push_str("<div class=\"preview-content ruled\">\n");
            html.push_str("<div class=\"notebook-margin no-print\"></div>\n");
        } else {
            html.push_str("<div class=\"preview-content\">\n");
        }
        html.push_str(&self.content_html);
        html.push_str("</div>\n");

        if let Some(footer) = &self.footer {
            html.push_str(&region_html("preview-footer", footer));
        }

        html.push_str("</div>\n</div>\n</div>\n");
        html
    }

    /// A complete page hosting the preview, with the diagram library set to
    /// the theme-derived palette
    pub fn to_page(&self, export: &ExportConfig) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
    <meta charset="UTF-8">
    <title>Preview - StaticMD</title>
    <script src="{script}"></script>
    <link href="{fonts}" rel="stylesheet">
    <style>{styles}</style>
</head>
<body style="margin: 0; height: 100vh;">
{body}<script>
        mermaid.initialize({{ startOnLoad: true, theme: '{palette}', securityLevel: 'loose' }});
    </script>
</body>
</html>
"#,
            lang = escape_html(&export.lang),
            script = escape_html(&export.diagram_script_url),
            fonts = escape_html(&export.font_stylesheet_url),
            styles = self.styles(),
            body = self.to_html(),
            palette = self.palette(),
        )
    }
}

fn region_html(class: &str, region: &Region) -> String {
    let pinned = if region.fixed { " pinned" } else { "" };
    format!("<div class=\"{}{}\">\n{}</div>\n", class, pinned, region.html)
}

/// The rendering target the preview writes into.
///
/// Holds at most one mounted view; a later mount replaces an earlier one.
#[derive(Debug, Default)]
pub struct PreviewTarget {
    mounted: Mutex<Option<PreviewView>>,
}

impl PreviewTarget {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<PreviewView>> {
        self.mounted.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replace whatever is mounted
    pub fn mount(&self, view: PreviewView) {
        *self.lock() = Some(view);
    }

    /// Copy of the mounted view
    pub fn snapshot(&self) -> Option<PreviewView> {
        self.lock().clone()
    }

    /// Generation of the mounted view
    pub fn generation(&self) -> Option<u64> {
        self.lock().as_ref().map(|v| v.generation)
    }

    /// Currently displayed content
    pub fn content_html(&self) -> Option<String> {
        self.lock().as_ref().map(|v| v.content_html.clone())
    }

    /// Swap in diagram-expanded content.
    ///
    /// Applied only if `generation` is still mounted and its content is still
    /// the unexpanded `expected` fragment; returns whether it was applied.
    pub fn apply_diagrams(&self, generation: u64, expected: &str, expanded: String) -> bool {
        let mut mounted = self.lock();
        match mounted.as_mut() {
            Some(view)
                if view.generation == generation
                    && !view.diagrams_applied
                    && view.content_html == expected =>
            {
                view.content_html = expanded;
                view.diagrams_applied = true;
                true
            }
            _ => false,
        }
    }

    /// Open or close the mounted TOC panel without re-rendering
    pub fn set_toc_open(&self, open: bool) {
        if let Some(toc) = self.lock().as_mut().and_then(|v| v.toc.as_mut()) {
            toc.open = open;
        }
    }
}

/// How a diagram pass ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramOutcome {
    /// Expanded content replaced the mounted fragment
    Applied { rendered: usize, failed: usize },
    /// A newer render superseded this one; the result was dropped
    Stale,
}

fn run_diagram_pass(
    target: &PreviewTarget,
    diagrams: &DiagramRenderer,
    generation: u64,
    source_html: &str,
    palette: DiagramPalette,
) -> DiagramOutcome {
    if target.generation() != Some(generation) {
        log::debug!("Skipping diagram pass for superseded generation {}", generation);
        return DiagramOutcome::Stale;
    }

    let pass = diagrams.render(source_html, palette);
    let (rendered, failed) = (pass.rendered, pass.failed.len());

    if target.apply_diagrams(generation, source_html, pass.html) {
        log::debug!(
            "Diagram pass {} applied by {}: {} rendered, {} failed",
            generation,
            diagrams.backend_name(),
            rendered,
            failed
        );
        DiagramOutcome::Applied { rendered, failed }
    } else {
        log::debug!("Discarding stale diagram pass {}", generation);
        DiagramOutcome::Stale
    }
}

/// Builds the live view from document snapshots
pub struct PreviewComposer {
    renderer: Arc<MarkdownRenderer>,
    diagrams: Arc<DiagramRenderer>,
    target: Arc<PreviewTarget>,
    settle_delay: Duration,
    generation: u64,
    toc: Vec<TocItem>,
    toc_open: bool,
    last_state: Option<DocumentState>,
}

impl PreviewComposer {
    pub fn new(
        renderer: Arc<MarkdownRenderer>,
        diagrams: Arc<DiagramRenderer>,
        target: Arc<PreviewTarget>,
    ) -> Self {
        Self {
            renderer,
            diagrams,
            target,
            settle_delay: Duration::from_millis(DEFAULT_DIAGRAM_SETTLE_MS),
            generation: 0,
            toc: Vec::new(),
            toc_open: false,
            last_state: None,
        }
    }

    /// Delay between mounting and running the diagram pass
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn target(&self) -> &Arc<PreviewTarget> {
        &self.target
    }

    /// Generation of the most recent render
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Headings of the most recently rendered document
    pub fn toc(&self) -> &[TocItem] {
        &self.toc
    }

    pub fn is_toc_open(&self) -> bool {
        self.toc_open
    }

    /// Flip the TOC panel. The flag survives re-renders.
    pub fn toggle_toc(&mut self) -> bool {
        self.set_toc_open(!self.toc_open);
        self.toc_open
    }

    pub fn set_toc_open(&mut self, open: bool) {
        self.toc_open = open;
        self.target.set_toc_open(open);
    }

    /// Re-render only if the snapshot differs from the last one rendered
    pub fn update(&mut self, state: &DocumentState) -> Option<JoinHandle<DiagramOutcome>> {
        if self.last_state.as_ref() == Some(state) {
            return None;
        }
        self.render_preview(state)
    }

    /// Render `state` and mount it on the target.
    ///
    /// Returns the handle of the scheduled diagram pass, if one was needed
    /// and a tokio runtime is available. Without a runtime the pass runs
    /// inline before this returns.
    pub fn render_preview(&mut self, state: &DocumentState) -> Option<JoinHandle<DiagramOutcome>> {
        self.generation += 1;
        let generation = self.generation;

        self.toc = extract_headings(&state.markdown);
        let source_html = self.renderer.render(&state.markdown);

        let header = state.has_header().then(|| Region {
            html: self.renderer.render(&state.header),
            fixed: state.header_mode.is_fixed(),
        });
        let footer = state.has_footer().then(|| Region {
            html: self.renderer.render(&state.footer),
            fixed: state.footer_mode.is_fixed(),
        });

        let view = PreviewView {
            generation,
            theme: state.theme,
            font_family: state.font_family,
            font_size: state.font_size,
            header,
            content_html: source_html.clone(),
            diagrams_applied: false,
            source_html,
            footer,
            toc: state
                .show_toc
                .then(|| TocPanel::new(self.toc.clone(), self.toc_open)),
        };

        let needs_diagrams = view.diagrams_pending();
        let palette = view.palette();
        let source_html = view.source_html.clone();
        self.target.mount(view);
        self.last_state = Some(state.clone());
        log::debug!(
            "Preview generation {} mounted ({} headings)",
            generation,
            self.toc.len()
        );

        if !needs_diagrams {
            return None;
        }

        let target = Arc::clone(&self.target);
        let diagrams = Arc::clone(&self.diagrams);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let delay = self.settle_delay;
                Some(handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    run_diagram_pass(&target, &diagrams, generation, &source_html, palette)
                }))
            }
            Err(_) => {
                log::debug!("No async runtime, running diagram pass inline");
                run_diagram_pass(&target, &diagrams, generation, &source_html, palette);
                None
            }
        }
    }
}
