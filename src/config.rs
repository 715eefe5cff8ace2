//! Configuration management for StaticMD
//!
//! Holds the fixed constants of the rendering pipeline and the small set of
//! user-tunable settings, persisted as JSON in the platform config directory.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier following reverse-DNS convention
pub const APP_ID: &str = "com.staticmd.StaticMD";

/// Conventional file name for the standalone export
pub const EXPORT_FILE_NAME: &str = "documento-staticmd.html";

/// Diagram library loaded by exported documents and the preview page
pub const DIAGRAM_SCRIPT_URL: &str = "https://cdn.jsdelivr.net/npm/mermaid@11/dist/mermaid.min.js";

/// Web fonts referenced by exported documents and the preview page
pub const FONT_STYLESHEET_URL: &str = "https://fonts.googleapis.com/css2?family=Inter:wght@400;700&family=Lora:ital,wght@0,400;0,700;1,400&family=JetBrains+Mono:wght@400;500&display=swap";

/// Fence language that marks a diagram source block
pub const DIAGRAM_LANGUAGE: &str = "mermaid";

/// Smallest font size the UI accepts
pub const MIN_FONT_SIZE: u32 = 10;

/// Largest font size the UI accepts
pub const MAX_FONT_SIZE: u32 = 48;

/// Font size of a fresh document
pub const DEFAULT_FONT_SIZE: u32 = 16;

/// Delay before the diagram pass runs on freshly mounted preview content
pub const DEFAULT_DIAGRAM_SETTLE_MS: u64 = 50;

/// Debounce applied by the shell to source changes and autosave
pub const DEFAULT_WATCH_DEBOUNCE_MS: u64 = 1000;

/// Maximum file size to import (in bytes) - 10MB
pub const MAX_IMPORT_SIZE: u64 = 10 * 1024 * 1024;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Standalone export settings
    pub export: ExportConfig,

    /// Live preview settings
    pub preview: PreviewConfig,
}

impl Config {
    /// Load configuration from the default location or return defaults
    pub fn load() -> ConfigResult<Self> {
        let path = Self::config_dir()?.join("config.json");
        Self::load_from(&path)
    }

    /// Load configuration from an explicit path. A missing file is not an error.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;

        serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Get the configuration directory path
    pub fn config_dir() -> ConfigResult<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_ID))
            .ok_or(ConfigError::DirectoryError)
    }

    /// Get the data directory path (session data)
    pub fn data_dir() -> ConfigResult<PathBuf> {
        dirs::data_dir()
            .map(|p| p.join(APP_ID))
            .ok_or(ConfigError::DirectoryError)
    }
}

/// Settings for the standalone export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// `lang` attribute of the exported document
    pub lang: String,

    /// `<title>` of the exported document
    pub title: String,

    /// Default output file name
    pub file_name: String,

    /// Diagram library script reference
    pub diagram_script_url: String,

    /// Web font stylesheet reference
    pub font_stylesheet_url: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            lang: "pt-br".to_string(),
            title: "Exported Document - StaticMD".to_string(),
            file_name: EXPORT_FILE_NAME.to_string(),
            diagram_script_url: DIAGRAM_SCRIPT_URL.to_string(),
            font_stylesheet_url: FONT_STYLESHEET_URL.to_string(),
        }
    }
}

/// Settings for the live preview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Milliseconds to wait after mounting before running the diagram pass
    pub diagram_settle_ms: u64,

    /// Milliseconds a source change must settle before re-rendering
    pub watch_debounce_ms: u64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            diagram_settle_ms: DEFAULT_DIAGRAM_SETTLE_MS,
            watch_debounce_ms: DEFAULT_WATCH_DEBOUNCE_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.export.file_name, "documento-staticmd.html");
        assert_eq!(config.preview.diagram_settle_ms, DEFAULT_DIAGRAM_SETTLE_MS);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"export": {"lang": "en"}}"#).unwrap();
        assert_eq!(config.export.lang, "en");
        assert_eq!(config.export.diagram_script_url, DIAGRAM_SCRIPT_URL);
        assert_eq!(config.preview, PreviewConfig::default());
    }

    #[test]
    fn test_missing_config_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_config_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));
    }
}
