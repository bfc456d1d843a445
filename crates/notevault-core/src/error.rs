//! Error types for Notevault core operations.
//!
//! This module defines the error hierarchy for all core operations.
//! Errors are descriptive at the core level; the CLI layer maps these
//! to user-friendly messages and exit codes.

use thiserror::Error;

use crate::storage::types::NoteId;

/// Result type alias for Notevault operations.
pub type Result<T> = std::result::Result<T, NoteError>;

/// Which encrypted field of a note failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteField {
    Title,
    Content,
}

impl std::fmt::Display for NoteField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoteField::Title => write!(f, "title"),
            NoteField::Content => write!(f, "content"),
        }
    }
}

/// Core error type for Notevault operations.
#[derive(Debug, Error)]
pub enum NoteError {
    /// Secure storage or the notes table could not be reached
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The block cipher or its random source cannot be used
    #[error("Cipher unavailable: {0}")]
    CipherUnavailable(String),

    /// Initialization vector is absent or has the wrong length
    #[error("Invalid IV: {0}")]
    InvalidIv(String),

    /// Wrong key, corrupted ciphertext, or padding check failure
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// A stored record could not be turned back into a note
    #[error("Failed to decode {field} of note {id}: {source}")]
    DecodeFailed {
        id: NoteId,
        field: NoteField,
        #[source]
        source: Box<NoteError>,
    },

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// The unlock gate rejected the user
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl NoteError {
    /// True for per-field crypto failures and their note-level aggregate.
    pub fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            NoteError::InvalidIv(_) | NoteError::DecryptionFailed(_) | NoteError::DecodeFailed { .. }
        )
    }
}

impl From<rusqlite::Error> for NoteError {
    fn from(err: rusqlite::Error) -> Self {
        NoteError::StorageUnavailable(format!("SQLite error: {}", err))
    }
}

impl From<std::io::Error> for NoteError {
    fn from(err: std::io::Error) -> Self {
        NoteError::StorageUnavailable(err.to_string())
    }
}
