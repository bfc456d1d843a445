//! Note repository trait definition.
//!
//! The `NoteRepository` trait is the seam between the presenter and the
//! persistence backend. `SqliteNoteStore` is the production implementation;
//! tests may substitute their own.

use super::types::Note;
use crate::error::Result;

/// CRUD interface over encrypted notes.
///
/// All implementations must ensure:
/// - Notes are encrypted before they reach persistent storage
/// - `list` returns notes most recently updated first
/// - `delete` is idempotent
///
/// Implementations provide no internal serialization between callers:
/// concurrent saves of the same note resolve as last writer wins.
pub trait NoteRepository: Send + Sync {
    /// Insert an unsaved note or update a saved one.
    ///
    /// # Returns
    ///
    /// Returns the row id of the note: newly assigned on insert, unchanged
    /// on update.
    ///
    /// # Errors
    ///
    /// - `NoteError::NotFound` when updating an id with no row
    /// - `NoteError::StorageUnavailable` if the table or key cannot be reached
    fn save(&self, note: &Note) -> Result<i64>;

    /// Get a note by id.
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(note))` if found, `Ok(None)` if not found.
    ///
    /// # Errors
    ///
    /// Returns `NoteError::DecodeFailed` if the row cannot be decrypted.
    fn get(&self, id: i64) -> Result<Option<Note>>;

    /// List all notes, most recently updated first.
    ///
    /// Rows that cannot be decrypted are omitted rather than failing the
    /// whole listing.
    fn list(&self) -> Result<Vec<Note>>;

    /// Delete a note. Deleting a missing id is not an error.
    fn delete(&self, id: i64) -> Result<()>;

    /// Drop every note and destroy the encryption key.
    ///
    /// Irreversible; intended for recovering from a corrupted state.
    fn reset(&self) -> Result<()>;

    /// Release the underlying connection. Later calls reopen it.
    fn close(&self) -> Result<()>;
}
