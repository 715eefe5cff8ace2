//! Session state for persistence
//!
//! Stores the last document snapshot so the next run picks up where the
//! previous one left off. A missing or malformed session never blocks the
//! user: it is logged and replaced by the default document.

use super::DocumentState;
use crate::error::{SessionError, SessionResult};
use crate::file_handler::{ensure_parent_dir, write_file_atomic_sync};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current on-disk format version
const SESSION_VERSION: u32 = 1;

/// Session file name inside the data directory
const SESSION_FILE: &str = "session.json";

/// Session state that can be serialized and restored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// The persisted document snapshot
    pub document: DocumentState,

    /// When the snapshot was written
    pub saved_at: chrono::DateTime<chrono::Utc>,

    /// Session version for migration
    pub version: u32,
}

impl SessionState {
    pub fn new(document: DocumentState) -> Self {
        Self {
            document,
            saved_at: chrono::Utc::now(),
            version: SESSION_VERSION,
        }
    }
}

/// Reads and writes the session file
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store backed by an explicit file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the platform data directory
    pub fn default_location() -> SessionResult<Self> {
        crate::config::Config::data_dir()
            .map(|dir| Self::new(dir.join(SESSION_FILE)))
            .map_err(|_| SessionError::DirectoryError)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted session
    pub fn load(&self) -> SessionResult<Option<SessionState>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| SessionError::LoadError(e.to_string()))?;

        let session: SessionState = serde_json::from_str(&content)
            .map_err(|e| SessionError::ParseError(e.to_string()))?;

        if session.version != SESSION_VERSION {
            log::info!(
                "Session version {} differs from {}, loading as-is",
                session.version,
                SESSION_VERSION
            );
        }

        Ok(Some(session))
    }

    /// Load the persisted document, falling back to the default document on
    /// any failure.
    pub fn load_or_default(&self) -> DocumentState {
        match self.load() {
            Ok(Some(session)) => {
                log::debug!("Restored session saved at {}", session.saved_at);
                session.document
            }
            Ok(None) => DocumentState::default(),
            Err(e) => {
                log::error!("Error loading saved data: {}", e);
                DocumentState::default()
            }
        }
    }

    /// Persist a document snapshot
    pub fn save(&self, document: &DocumentState) -> SessionResult<()> {
        ensure_parent_dir(&self.path).map_err(|e| SessionError::SaveError(e.to_string()))?;

        let content = serde_json::to_string_pretty(&SessionState::new(document.clone()))
            .map_err(|e| SessionError::SaveError(e.to_string()))?;

        write_file_atomic_sync(&self.path, &content)
            .map_err(|e| SessionError::SaveError(e.to_string()))?;

        log::debug!("Session saved to {}", self.path.display());
        Ok(())
    }
}
