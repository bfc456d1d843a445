//! Core data types for the storage layer.
//!
//! A [`Note`] is plaintext and only lives for the duration of one
//! operation. An [`EncryptedNoteRecord`] is what actually reaches the
//! `notes` table. Timestamps are epoch milliseconds throughout.

use chrono::Utc;

/// Identity of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NoteId {
    /// Not yet persisted; saving inserts a new row.
    #[default]
    Unsaved,
    /// Persisted under this row id; saving updates the row.
    Saved(i64),
}

impl NoteId {
    pub fn as_saved(&self) -> Option<i64> {
        match self {
            NoteId::Unsaved => None,
            NoteId::Saved(id) => Some(*id),
        }
    }
}

impl std::fmt::Display for NoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoteId::Unsaved => write!(f, "(unsaved)"),
            NoteId::Saved(id) => write!(f, "{}", id),
        }
    }
}

impl From<i64> for NoteId {
    fn from(id: i64) -> Self {
        NoteId::Saved(id)
    }
}

/// A plaintext note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: NoteId,

    pub title: String,

    /// May be empty.
    pub content: String,

    /// Defaults to the save time when absent.
    pub created_at: Option<i64>,

    /// Assigned by the store on every save.
    pub updated_at: Option<i64>,
}

impl Note {
    /// A note that has never been saved.
    pub fn draft(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: NoteId::Unsaved,
            title: title.into(),
            content: content.into(),
            created_at: None,
            updated_at: None,
        }
    }

    /// New contents for an already saved note.
    pub fn revision(id: i64, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: NoteId::Saved(id),
            ..Self::draft(title, content)
        }
    }
}

/// Ciphertext paired with the IV it was produced under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedField {
    /// Base64 ciphertext.
    pub ciphertext: String,

    /// Hex IV.
    pub iv: String,
}

/// The persisted form of a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedNoteRecord {
    pub id: NoteId,
    pub title: EncryptedField,
    pub content: EncryptedField,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Current time in epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
