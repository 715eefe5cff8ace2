//! StaticMD - Markdown documents rendered to a themed live preview and to
//! self-contained HTML files.
//!
//! The library holds the whole pipeline; `main.rs` is a thin command-line
//! shell over it.

pub mod config;
pub mod error;
pub mod file_handler;
pub mod markdown;
pub mod state;
pub mod templates;
pub mod theme;
pub mod utils;

pub use error::{AppError, AppResult};
pub use markdown::{
    compile_standalone_document, extract_headings, DiagramRenderer, MarkdownRenderer,
    PreviewComposer, PreviewTarget, StandaloneCompiler, TocItem,
};
pub use state::{DocumentState, HeaderFooterMode};
pub use theme::{DiagramPalette, FontId, Theme, ThemeId, THEMES};
