//! Utilities module for StaticMD
//!
//! Shared helpers:
//! - Path utilities for import filtering and output naming
//! - Text utilities for document statistics
//! - HTML escaping for text the renderer does not produce itself

use std::path::{Path, PathBuf};

/// Path utilities
pub mod path {
    use super::*;

    /// Check if path has an extension the importer accepts
    pub fn is_importable(path: &Path) -> bool {
        matches!(
            path.extension()
                .and_then(|s| s.to_str())
                .map(|s| s.to_ascii_lowercase())
                .as_deref(),
            Some("md" | "markdown" | "mdown" | "mkd" | "txt")
        )
    }

    /// Sibling path with a different file name, e.g. the export next to its source
    pub fn sibling(path: &Path, file_name: &str) -> PathBuf {
        match path.parent() {
            Some(parent) => parent.join(file_name),
            None => PathBuf::from(file_name),
        }
    }

    /// Expand tilde to home directory
    pub fn expand_tilde(path: &Path) -> PathBuf {
        if let Ok(stripped) = path.strip_prefix("~") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        }
        path.to_path_buf()
    }
}

/// Text utilities
pub mod text {
    /// Count words in text
    pub fn word_count(text: &str) -> usize {
        text.split_whitespace().count()
    }

    /// Count characters in text
    pub fn char_count(text: &str) -> usize {
        text.chars().count()
    }
}

/// Escape text for use inside HTML element content or a quoted attribute
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse the entity escaping applied by the markdown renderer to code
pub fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_importable() {
        assert!(path::is_importable(Path::new("notes.md")));
        assert!(path::is_importable(Path::new("NOTES.TXT")));
        assert!(!path::is_importable(Path::new("image.png")));
        assert!(!path::is_importable(Path::new("README")));
    }

    #[test]
    fn test_sibling() {
        assert_eq!(
            path::sibling(Path::new("/docs/a.md"), "out.html"),
            PathBuf::from("/docs/out.html")
        );
    }

    #[test]
    fn test_counts() {
        assert_eq!(text::word_count("hello  world\n"), 2);
        assert_eq!(text::word_count("  "), 0);
        assert_eq!(text::char_count("glicólise"), 9);
    }

    #[test]
    fn test_escape_round_trip_of_renderer_entities() {
        let raw = "A --> B & \"C\" <D>";
        assert_eq!(escape_html(raw), "A --&gt; B &amp; &quot;C&quot; &lt;D&gt;");
        assert_eq!(unescape_html(&escape_html(raw)), raw);
        assert_eq!(unescape_html("&amp;lt;"), "&lt;");
    }
}
