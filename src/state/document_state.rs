//! Document snapshot
//!
//! `DocumentState` is the single input of both the preview and the export
//! path. Every user action produces a new snapshot; nothing mutates one in
//! place once it has been handed to a renderer.

use crate::config::{DEFAULT_FONT_SIZE, MAX_FONT_SIZE, MIN_FONT_SIZE};
use crate::templates::{self, Template};
use crate::theme::{FontId, ThemeId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a header or footer scrolls with the content or is pinned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderFooterMode {
    #[default]
    Normal,
    Fixed,
}

impl HeaderFooterMode {
    pub fn is_fixed(&self) -> bool {
        matches!(self, HeaderFooterMode::Fixed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderFooterMode::Normal => "normal",
            HeaderFooterMode::Fixed => "fixed",
        }
    }
}

impl fmt::Display for HeaderFooterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable value of the full document state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentState {
    /// Primary document body
    pub markdown: String,
    pub header: String,
    pub footer: String,
    pub header_mode: HeaderFooterMode,
    pub footer_mode: HeaderFooterMode,
    pub theme: ThemeId,
    pub font_family: FontId,
    /// Already validated by the caller; see [`clamp_font_size`]
    pub font_size: u32,
    #[serde(rename = "showTOC")]
    pub show_toc: bool,
}

impl Default for DocumentState {
    fn default() -> Self {
        let template = templates::default_template();
        Self {
            markdown: template.markdown.to_string(),
            header: template.header.to_string(),
            footer: template.footer.to_string(),
            header_mode: HeaderFooterMode::Normal,
            footer_mode: HeaderFooterMode::Normal,
            theme: ThemeId::Modern,
            font_family: FontId::Sans,
            font_size: DEFAULT_FONT_SIZE,
            show_toc: true,
        }
    }
}

impl DocumentState {
    /// A snapshot with empty body, header and footer
    pub fn empty() -> Self {
        Self {
            markdown: String::new(),
            header: String::new(),
            footer: String::new(),
            ..Self::default()
        }
    }

    /// Replace body, header and footer with a template's content
    pub fn apply_template(&self, template: &Template) -> Self {
        Self {
            markdown: template.markdown.to_string(),
            header: template.header.to_string(),
            footer: template.footer.to_string(),
            ..self.clone()
        }
    }

    pub fn with_markdown(&self, markdown: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
            ..self.clone()
        }
    }

    pub fn with_header(&self, header: impl Into<String>, mode: HeaderFooterMode) -> Self {
        Self {
            header: header.into(),
            header_mode: mode,
            ..self.clone()
        }
    }

    pub fn with_footer(&self, footer: impl Into<String>, mode: HeaderFooterMode) -> Self {
        Self {
            footer: footer.into(),
            footer_mode: mode,
            ..self.clone()
        }
    }

    pub fn with_theme(&self, theme: ThemeId) -> Self {
        Self {
            theme,
            ..self.clone()
        }
    }

    pub fn with_font(&self, font_family: FontId, font_size: u32) -> Self {
        Self {
            font_family,
            font_size,
            ..self.clone()
        }
    }

    pub fn with_toc(&self, show_toc: bool) -> Self {
        Self {
            show_toc,
            ..self.clone()
        }
    }

    /// Whether the header region should be emitted at all. Any non-empty
    /// source counts, whitespace included.
    pub fn has_header(&self) -> bool {
        !self.header.is_empty()
    }

    /// Whether the footer region should be emitted at all
    pub fn has_footer(&self) -> bool {
        !self.footer.is_empty()
    }
}

/// Clamp a user-entered font size into the accepted range.
///
/// Renderers trust `DocumentState::font_size`; input surfaces call this first.
pub fn clamp_font_size(size: u32) -> u32 {
    size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}
