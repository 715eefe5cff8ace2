//! Markdown module for StaticMD
//!
//! Handles the rendering pipeline:
//! - Markdown to HTML rendering (shared by preview and export)
//! - Bare-URL autolinking
//! - Heading extraction for the table of contents
//! - Diagram post-processing
//! - Live preview composition
//! - Standalone HTML export

mod linkify;

pub mod diagram;
pub mod export;
pub mod preview;
pub mod renderer;
pub mod toc;

pub use diagram::{
    find_blocks, has_diagrams, DiagramBackend, DiagramBlock, DiagramPass, DiagramRenderer,
    MermaidBackend,
};
pub use export::{compile_standalone_document, StandaloneCompiler, EXPORT_DIAGRAM_PALETTE};
pub use preview::{DiagramOutcome, PreviewComposer, PreviewTarget, PreviewView, Region};
pub use renderer::MarkdownRenderer;
pub use toc::{extract_headings, TocItem, TocPanel};
