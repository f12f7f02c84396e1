// crates/workcert-client/src/session.rs
// ============================================================================
// Module: Session Store
// Description: Persisted identity tokens for the student and reviewer portals.
// Purpose: Remember who is signed in across invocations.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The session is a small JSON file holding the signed-in student email and
//! the signed-in reviewer email and id. There is no authentication; these
//! values only select which records the portal shows. Writes go to a sibling
//! temporary file that is renamed over the target.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::ErrorKind;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted session file size in bytes.
const MAX_SESSION_FILE_BYTES: u64 = 64 * 1024;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Persisted identity tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Signed-in student email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_email: Option<String>,
    /// Signed-in reviewer email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_email: Option<String>,
    /// Signed-in reviewer id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_id: Option<String>,
}

impl Session {
    /// Returns true when no identity is stored.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.student_email.is_none() && self.reviewer_email.is_none() && self.reviewer_id.is_none()
    }
}

/// Session persistence errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// I/O failure.
    #[error("session io error: {0}")]
    Io(String),
    /// Stored file is not a valid session.
    #[error("session file is invalid: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// File-backed session store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStore {
    /// Session file path.
    path: PathBuf,
}

impl SessionStore {
    /// Creates a store over `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
        }
    }

    /// Returns the session file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the session; a missing file is an empty session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the file cannot be read or decoded.
    pub fn load(&self) -> Result<Session, SessionError> {
        let metadata = match fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Session::default()),
            Err(err) => return Err(SessionError::Io(err.to_string())),
        };
        if metadata.len() > MAX_SESSION_FILE_BYTES {
            return Err(SessionError::Invalid("file exceeds size limit".to_string()));
        }
        let bytes = fs::read(&self.path).map_err(|err| SessionError::Io(err.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|err| SessionError::Invalid(err.to_string()))
    }

    /// Writes the session atomically.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the file cannot be written.
    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        let payload = serde_json::to_vec_pretty(session)
            .map_err(|err| SessionError::Invalid(err.to_string()))?;
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| SessionError::Io(err.to_string()))?;
        }
        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|err| SessionError::Io(err.to_string()))?;
        file.write_all(&payload).map_err(|err| SessionError::Io(err.to_string()))?;
        file.sync_all().map_err(|err| SessionError::Io(err.to_string()))?;
        drop(file);
        fs::rename(&temp_path, &self.path).map_err(|err| SessionError::Io(err.to_string()))
    }

    /// Applies `change` to the stored session and persists the result.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when loading or saving fails.
    pub fn update(&self, change: impl FnOnce(&mut Session)) -> Result<Session, SessionError> {
        let mut session = self.load()?;
        change(&mut session);
        self.save(&session)?;
        Ok(session)
    }

    /// Removes the session file; a missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the file exists but cannot be removed.
    pub fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(SessionError::Io(err.to_string())),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
