//! Error types for StaticMD
//!
//! This module defines the error types used outside the rendering core.
//! The rendering pipeline itself is total: theme lookup falls back, diagram
//! failures are contained per block, and empty input renders empty output.
//! Only file I/O, configuration and session persistence can fail.

use std::path::PathBuf;
use thiserror::Error;

/// Main application error type encompassing all error categories
#[derive(Error, Debug)]
pub enum AppError {
    /// File I/O related errors
    #[error(transparent)]
    FileIO(#[from] FileError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Session persistence errors
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Diagram rendering errors
    #[error(transparent)]
    Diagram(#[from] DiagramError),
}

/// File I/O related errors
#[derive(Error, Debug)]
pub enum FileError {
    /// File not found at specified path
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// File is too large to import
    #[error("File too large: {path} ({size} bytes, max {max_size} bytes)")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// Error reading file
    #[error("Could not read file: {path}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error writing file
    #[error("Could not save file: {path}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory operation error
    #[error("Directory error: {path}")]
    DirectoryError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error loading configuration file
    #[error("Could not load configuration: {0}")]
    LoadError(String),

    /// Error parsing configuration
    #[error("Invalid configuration format: {0}")]
    ParseError(String),

    /// Configuration directory error
    #[error("Could not access configuration directory")]
    DirectoryError,
}

/// Session persistence errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Could not load session: {0}")]
    LoadError(String),

    #[error("Could not parse session: {0}")]
    ParseError(String),

    #[error("Could not save session: {0}")]
    SaveError(String),

    #[error("Could not access session directory")]
    DirectoryError,
}

/// Diagram rendering errors
///
/// These never escape a render pass; they are logged and the offending
/// block is left as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiagramError {
    /// The diagram block has no description text
    #[error("Diagram source is empty")]
    EmptySource,

    /// The diagram backend failed for another reason
    #[error("Diagram backend '{backend}' failed: {reason}")]
    Backend {
        backend: &'static str,
        reason: String,
    },
}

/// Result type alias for operations that can fail with AppError
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for file operations
pub type FileResult<T> = Result<T, FileError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for session persistence
pub type SessionResult<T> = Result<T, SessionError>;

/// Result type alias for a single diagram render
pub type DiagramResult<T> = Result<T, DiagramError>;

impl FileError {
    /// Create a user-friendly error message suitable for the command line
    pub fn user_message(&self) -> String {
        match self {
            FileError::NotFound(_) => {
                "The file could not be found. It may have been moved or deleted.".to_string()
            }
            FileError::FileTooLarge { max_size, .. } => {
                format!(
                    "This file is too large to import. Maximum file size is {} bytes.",
                    max_size
                )
            }
            FileError::WriteError { .. } => {
                "Could not save the file. Check disk space and permissions.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_error_display() {
        let err = FileError::NotFound(PathBuf::from("/test/notes.md"));
        assert!(err.to_string().contains("/test/notes.md"));
    }

    #[test]
    fn test_file_error_user_message() {
        let err = FileError::FileTooLarge {
            path: PathBuf::from("/test/big.md"),
            size: 20,
            max_size: 10,
        };
        assert!(err.user_message().contains("10 bytes"));
    }

    #[test]
    fn test_app_error_from_diagram_error() {
        let app_err: AppError = DiagramError::EmptySource.into();
        assert!(matches!(app_err, AppError::Diagram(_)));
        assert_eq!(app_err.to_string(), "Diagram source is empty");
    }
}
