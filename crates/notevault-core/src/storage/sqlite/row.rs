//! Note row type for database queries.

use rusqlite::Row;

use crate::storage::types::{EncryptedField, EncryptedNoteRecord, NoteId};

/// Column list shared by every SELECT on the notes table, in `NoteRow` order.
pub const NOTE_COLUMNS: &str =
    "id, titleEncrypted, titleIv, contentEncrypted, contentIv, createdAt, updatedAt";

/// Raw row data from the notes table, before decryption.
#[derive(Debug)]
pub struct NoteRow {
    pub id: i64,
    pub title_encrypted: String,
    pub title_iv: String,
    pub content_encrypted: String,
    pub content_iv: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl NoteRow {
    /// Read a row selected with [`NOTE_COLUMNS`].
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title_encrypted: row.get(1)?,
            title_iv: row.get(2)?,
            content_encrypted: row.get(3)?,
            content_iv: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

impl From<NoteRow> for EncryptedNoteRecord {
    fn from(row: NoteRow) -> Self {
        EncryptedNoteRecord {
            id: NoteId::Saved(row.id),
            title: EncryptedField {
                ciphertext: row.title_encrypted,
                iv: row.title_iv,
            },
            content: EncryptedField {
                ciphertext: row.content_encrypted,
                iv: row.content_iv,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
