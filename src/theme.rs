//! Theme and font registry
//!
//! A static catalog of presentation profiles. Lookup is total: an unknown
//! identifier resolves to the first registered entry instead of failing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a visual theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ThemeId {
    #[default]
    Modern,
    Sepia,
    Notebook,
}

impl ThemeId {
    /// Wire name used in persisted state and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeId::Modern => "MODERN",
            ThemeId::Sepia => "SEPIA",
            ThemeId::Notebook => "NOTEBOOK",
        }
    }

    /// Parse a wire name, case-insensitively, falling back to the first
    /// registered theme when the name is unknown.
    pub fn parse_or_default(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "MODERN" => ThemeId::Modern,
            "SEPIA" => ThemeId::Sepia,
            "NOTEBOOK" => ThemeId::Notebook,
            other => {
                let fallback = THEMES[0].id;
                log::debug!("Unknown theme '{}', using {}", other, fallback);
                fallback
            }
        }
    }

    /// Resolve to the registered profile
    pub fn theme(&self) -> &'static Theme {
        lookup(*self)
    }

    /// Diagram palette used by the live preview for this theme
    pub fn diagram_palette(&self) -> DiagramPalette {
        match self {
            ThemeId::Modern => DiagramPalette::Default,
            ThemeId::Sepia => DiagramPalette::Neutral,
            ThemeId::Notebook => DiagramPalette::Forest,
        }
    }
}

impl From<String> for ThemeId {
    fn from(raw: String) -> Self {
        Self::parse_or_default(&raw)
    }
}

impl From<ThemeId> for String {
    fn from(id: ThemeId) -> Self {
        id.as_str().to_string()
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// An immutable presentation profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub id: ThemeId,
    pub name: &'static str,
    /// Page background color
    pub bg: &'static str,
    /// Body text color
    pub text: &'static str,
    /// Heading, link and blockquote accent color
    pub accent: &'static str,
    pub class_name: &'static str,
}

impl Theme {
    /// Whether this theme draws ruled paper with a margin line
    pub fn is_ruled(&self) -> bool {
        self.id == ThemeId::Notebook
    }
}

/// Registered themes. The first entry is the fallback.
pub static THEMES: [Theme; 3] = [
    Theme {
        id: ThemeId::Modern,
        name: "Modern Clean",
        bg: "#ffffff",
        text: "#1f2937",
        accent: "#2563eb",
        class_name: "theme-modern",
    },
    Theme {
        id: ThemeId::Sepia,
        name: "Reader Sepia",
        bg: "#f4ecd8",
        text: "#433422",
        accent: "#8b5e3c",
        class_name: "theme-sepia",
    },
    Theme {
        id: ThemeId::Notebook,
        name: "Ruled Notebook",
        bg: "#fdfdf7",
        text: "#334155",
        accent: "#f43f5e",
        class_name: "theme-notebook",
    },
];

/// Look up a theme, falling back to the first registered profile
pub fn lookup(id: ThemeId) -> &'static Theme {
    THEMES.iter().find(|t| t.id == id).unwrap_or(&THEMES[0])
}

/// Ruled-paper line color of the notebook theme
pub const NOTEBOOK_RULE_COLOR: &str = "#e5e7eb";

/// Margin line color of the notebook theme
pub const NOTEBOOK_MARGIN_COLOR: &str = "#fca5a5";

/// Identifier of a font family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FontId {
    #[default]
    Sans,
    Serif,
    Mono,
}

impl FontId {
    pub fn as_str(&self) -> &'static str {
        match self {
            FontId::Sans => "sans",
            FontId::Serif => "serif",
            FontId::Mono => "mono",
        }
    }

    /// Parse a wire name, falling back to sans
    pub fn parse_or_default(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "serif" => FontId::Serif,
            "mono" => FontId::Mono,
            _ => FontId::Sans,
        }
    }

    /// CSS `font-family` value
    pub fn stack(&self) -> &'static str {
        match self {
            FontId::Sans => "\"Inter\", sans-serif",
            FontId::Serif => "\"Lora\", serif",
            FontId::Mono => "\"JetBrains Mono\", monospace",
        }
    }
}

impl From<String> for FontId {
    fn from(raw: String) -> Self {
        Self::parse_or_default(&raw)
    }
}

impl From<FontId> for String {
    fn from(id: FontId) -> Self {
        id.as_str().to_string()
    }
}

impl fmt::Display for FontId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Color scheme handed to the diagram library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DiagramPalette {
    #[default]
    Default,
    Neutral,
    Forest,
}

impl DiagramPalette {
    /// Name understood by the diagram library's `theme` option
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagramPalette::Default => "default",
            DiagramPalette::Neutral => "neutral",
            DiagramPalette::Forest => "forest",
        }
    }
}

impl fmt::Display for DiagramPalette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_every_id() {
        for id in [ThemeId::Modern, ThemeId::Sepia, ThemeId::Notebook] {
            assert_eq!(lookup(id).id, id);
        }
    }

    #[test]
    fn test_unknown_name_falls_back_to_first() {
        assert_eq!(ThemeId::parse_or_default("NEON").theme().id, THEMES[0].id);
        assert_eq!(ThemeId::parse_or_default("").theme().id, THEMES[0].id);
        assert_eq!(ThemeId::parse_or_default("sepia").theme().id, ThemeId::Sepia);
    }

    #[test]
    fn test_unknown_theme_deserializes_to_fallback() {
        let id: ThemeId = serde_json::from_str("\"VAPORWAVE\"").unwrap();
        assert_eq!(id, ThemeId::Modern);
        assert_eq!(serde_json::to_string(&ThemeId::Notebook).unwrap(), "\"NOTEBOOK\"");
    }

    #[test]
    fn test_diagram_palette_mapping() {
        assert_eq!(ThemeId::Modern.diagram_palette(), DiagramPalette::Default);
        assert_eq!(ThemeId::Sepia.diagram_palette(), DiagramPalette::Neutral);
        assert_eq!(ThemeId::Notebook.diagram_palette(), DiagramPalette::Forest);
    }

    #[test]
    fn test_font_stack() {
        assert_eq!(FontId::parse_or_default("serif").stack(), "\"Lora\", serif");
        assert_eq!(FontId::parse_or_default("comic").stack(), "\"Inter\", sans-serif");
        let font: FontId = serde_json::from_str("\"mono\"").unwrap();
        assert_eq!(font, FontId::Mono);
    }
}
