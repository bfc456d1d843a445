//! Mapping between plaintext notes and encrypted records.

use crate::crypto::FieldCipher;
use crate::error::{NoteError, NoteField, Result};
use crate::storage::types::{EncryptedNoteRecord, Note, NoteId};

/// Crosses the plaintext/ciphertext boundary for whole notes.
pub struct NoteCodec {
    cipher: FieldCipher,
}

impl NoteCodec {
    pub fn new(cipher: FieldCipher) -> Self {
        Self { cipher }
    }

    pub fn cipher(&self) -> &FieldCipher {
        &self.cipher
    }

    /// Encrypt title and content independently, each under its own IV.
    ///
    /// `created_at` is carried over (or set to `now_ms`); `updated_at` is
    /// always `now_ms`.
    pub fn to_record(&self, note: &Note, now_ms: i64) -> Result<EncryptedNoteRecord> {
        let title = self.cipher.encrypt_field(&note.title)?;
        let content = self.cipher.encrypt_field(&note.content)?;

        Ok(EncryptedNoteRecord {
            id: note.id,
            title,
            content,
            created_at: note.created_at.unwrap_or(now_ms),
            updated_at: now_ms,
        })
    }

    /// Decrypt both fields.
    ///
    /// # Errors
    ///
    /// Returns `NoteError::DecodeFailed` naming the first field that could
    /// not be decrypted.
    pub fn to_note(&self, record: &EncryptedNoteRecord) -> Result<Note> {
        let title = self.decode_field(record, NoteField::Title)?;
        let content = self.decode_field(record, NoteField::Content)?;

        Ok(Note {
            id: record.id,
            title,
            content,
            created_at: Some(record.created_at),
            updated_at: Some(record.updated_at),
        })
    }

    fn decode_field(&self, record: &EncryptedNoteRecord, field: NoteField) -> Result<String> {
        let encrypted = match field {
            NoteField::Title => &record.title,
            NoteField::Content => &record.content,
        };
        self.cipher
            .decrypt_field(&encrypted.ciphertext, &encrypted.iv)
            .map_err(|err| decode_failed(record.id, field, err))
    }
}

fn decode_failed(id: NoteId, field: NoteField, err: NoteError) -> NoteError {
    match err {
        // Secret store trouble is not a property of this record.
        NoteError::StorageUnavailable(_) | NoteError::CipherUnavailable(_) => err,
        other => NoteError::DecodeFailed {
            id,
            field,
            source: Box::new(other),
        },
    }
}
