//! SQLite note storage backend.
//!
//! Notes are encrypted field by field before they reach SQLite, so the
//! database file itself is plain SQLite holding only ciphertext, IVs and
//! timestamps. The connection is opened on demand, shared by all
//! operations, and released by [`SqliteNoteStore::close`] or on drop.

mod row;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{NoteError, Result};
use crate::storage::codec::NoteCodec;
use crate::storage::traits::NoteRepository;
use crate::storage::types::{now_millis, EncryptedNoteRecord, Note, NoteId};

use row::{NoteRow, NOTE_COLUMNS};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS notes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        titleEncrypted TEXT NOT NULL,
        titleIv TEXT NOT NULL,
        contentEncrypted TEXT NOT NULL,
        contentIv TEXT NOT NULL,
        createdAt INTEGER NOT NULL,
        updatedAt INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS notes_updated_at ON notes (updatedAt DESC);
"#;

/// Where the notes database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    File(PathBuf),
    /// Private in-memory database. Closing the store discards its contents.
    Memory,
}

/// Encrypted note store over a single SQLite connection.
pub struct SqliteNoteStore {
    location: DatabaseLocation,
    conn: Mutex<Option<Connection>>,
    codec: NoteCodec,
}

impl SqliteNoteStore {
    /// Create a store without touching the database yet.
    pub fn new(location: DatabaseLocation, codec: NoteCodec) -> Self {
        Self {
            location,
            conn: Mutex::new(None),
            codec,
        }
    }

    /// Create a store and open its connection immediately.
    pub fn open(location: DatabaseLocation, codec: NoteCodec) -> Result<Self> {
        let store = Self::new(location, codec);
        store.ensure_open()?;
        Ok(store)
    }

    pub fn location(&self) -> &DatabaseLocation {
        &self.location
    }

    pub fn is_open(&self) -> bool {
        self.lock_conn().map(|conn| conn.is_some()).unwrap_or(false)
    }

    /// Open the connection and create the table if needed. Idempotent.
    pub fn ensure_open(&self) -> Result<()> {
        self.with_conn(|_| Ok(()))
    }

    /// Number of stored rows, including ones that would fail to decode.
    pub fn count(&self) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))?;
            Ok(count)
        })
    }

    fn lock_conn(&self) -> Result<MutexGuard<'_, Option<Connection>>> {
        self.conn
            .lock()
            .map_err(|_| NoteError::StorageUnavailable("SQLite connection poisoned".to_string()))
    }

    fn with_conn<T>(&self, op: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let mut guard = self.lock_conn()?;
        if guard.is_none() {
            *guard = Some(Self::connect(&self.location)?);
        }
        let conn = guard.as_mut().ok_or_else(|| {
            NoteError::StorageUnavailable("SQLite connection unavailable".to_string())
        })?;
        op(conn)
    }

    fn connect(location: &DatabaseLocation) -> Result<Connection> {
        let conn = match location {
            DatabaseLocation::File(path) => {
                ensure_parent_dir(path)?;
                Connection::open(path)?
            }
            DatabaseLocation::Memory => Connection::open_in_memory()?,
        };
        conn.execute_batch(SCHEMA)?;
        tracing::debug!(location = ?location, "Opened notes database");
        Ok(conn)
    }

    /// Timestamp for the next write: `now`, or one past the newest row.
    ///
    /// Keeps every write strictly later than all earlier ones, so the most
    /// recently saved note always lists first.
    fn next_stamp(conn: &Connection, now: i64) -> Result<i64> {
        let stamp = conn.query_row(
            "SELECT MAX(?1, COALESCE(MAX(updatedAt), 0) + 1) FROM notes",
            [now],
            |row| row.get(0),
        )?;
        Ok(stamp)
    }

    fn insert(conn: &Connection, record: &EncryptedNoteRecord) -> Result<i64> {
        let stamp = Self::next_stamp(conn, record.updated_at)?;
        // Fresh drafts carry createdAt == updatedAt; keep them equal after the bump.
        let created_at = if record.created_at == record.updated_at {
            stamp
        } else {
            record.created_at
        };
        conn.execute(
            r#"
            INSERT INTO notes (
                titleEncrypted,
                titleIv,
                contentEncrypted,
                contentIv,
                createdAt,
                updatedAt
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                record.title.ciphertext,
                record.title.iv,
                record.content.ciphertext,
                record.content.iv,
                created_at,
                stamp,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update(conn: &Connection, id: i64, record: &EncryptedNoteRecord) -> Result<i64> {
        let stamp = Self::next_stamp(conn, record.updated_at)?;
        let changed = conn.execute(
            r#"
            UPDATE notes
            SET titleEncrypted = ?1,
                titleIv = ?2,
                contentEncrypted = ?3,
                contentIv = ?4,
                updatedAt = ?5
            WHERE id = ?6
            "#,
            params![
                record.title.ciphertext,
                record.title.iv,
                record.content.ciphertext,
                record.content.iv,
                stamp,
                id,
            ],
        )?;

        if changed == 0 {
            return Err(NoteError::NotFound(format!("Note {} not found", id)));
        }
        Ok(id)
    }

    fn save_at(&self, note: &Note, now: i64) -> Result<i64> {
        let record = self.codec.to_record(note, now)?;
        self.with_conn(|conn| match record.id {
            NoteId::Unsaved => Self::insert(conn, &record),
            NoteId::Saved(id) => Self::update(conn, id, &record),
        })
    }
}

impl NoteRepository for SqliteNoteStore {
    fn save(&self, note: &Note) -> Result<i64> {
        self.save_at(note, now_millis())
    }

    fn get(&self, id: i64) -> Result<Option<Note>> {
        let row = self.with_conn(|conn| {
            let query = format!("SELECT {} FROM notes WHERE id = ?1", NOTE_COLUMNS);
            let row = conn
                .query_row(&query, [id], NoteRow::from_row)
                .optional()?;
            Ok(row)
        })?;

        match row {
            Some(row) => Ok(Some(self.codec.to_note(&row.into())?)),
            None => Ok(None),
        }
    }

    fn list(&self) -> Result<Vec<Note>> {
        let rows = self.with_conn(|conn| {
            let query = format!(
                "SELECT {} FROM notes ORDER BY updatedAt DESC, id DESC",
                NOTE_COLUMNS
            );
            let mut stmt = conn.prepare(&query)?;
            let rows = stmt
                .query_map([], NoteRow::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })?;

        let mut notes = Vec::with_capacity(rows.len());
        for row in rows {
            let record: EncryptedNoteRecord = row.into();
            match self.codec.to_note(&record) {
                Ok(note) => notes.push(note),
                Err(err) if err.is_decode_failure() => {
                    tracing::warn!(id = %record.id, error = %err, "Skipping note that failed to decode");
                }
                Err(err) => return Err(err),
            }
        }

        Ok(notes)
    }

    fn delete(&self, id: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM notes WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    fn reset(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute_batch("DROP TABLE IF EXISTS notes;")?;
            let key_reset = self.codec.cipher().reset_key();
            conn.execute_batch(SCHEMA)?;
            key_reset?;
            tracing::debug!("Notes table and encryption key reset");
            Ok(())
        })
    }

    fn close(&self) -> Result<()> {
        let mut guard = self.lock_conn()?;
        if let Some(conn) = guard.take() {
            conn.close().map_err(|(_, err)| NoteError::from(err))?;
            tracing::debug!(location = ?self.location, "Closed notes database");
        }
        Ok(())
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            NoteError::StorageUnavailable(format!(
                "Failed to create database directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::crypto::key::test_kdf;
    use crate::crypto::{FieldCipher, KeyStore, KeyStoreOptions, MemorySecretStore};

    fn store(location: DatabaseLocation) -> SqliteNoteStore {
        let keys = KeyStore::new(
            Box::new(Arc::new(MemorySecretStore::new())),
            KeyStoreOptions {
                kdf: test_kdf(),
                ..KeyStoreOptions::default()
            },
        );
        SqliteNoteStore::new(location, NoteCodec::new(FieldCipher::new(keys)))
    }

    #[test]
    fn test_connection_opens_lazily() {
        let store = store(DatabaseLocation::Memory);
        assert!(!store.is_open());
        store.list().unwrap();
        assert!(store.is_open());
    }

    #[test]
    fn test_ensure_open_is_idempotent() {
        let store = store(DatabaseLocation::Memory);
        store.ensure_open().unwrap();
        store.save(&Note::draft("kept", "")).unwrap();
        store.ensure_open().unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_close_then_reopen_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(DatabaseLocation::File(dir.path().join("nested/notes.db")));

        let id = store.save(&Note::draft("persisted", "body")).unwrap();
        store.close().unwrap();
        assert!(!store.is_open());

        let note = store.get(id).unwrap().unwrap();
        assert_eq!(note.title, "persisted");
        assert!(store.is_open());
    }

    #[test]
    fn test_close_twice_is_ok() {
        let store = store(DatabaseLocation::Memory);
        store.ensure_open().unwrap();
        store.close().unwrap();
        store.close().unwrap();
    }

    #[test]
    fn test_stored_columns_hold_no_plaintext() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.db");
        let store = store(DatabaseLocation::File(path.clone()));
        store
            .save(&Note::draft("secret title", "secret body"))
            .unwrap();
        store.close().unwrap();

        let conn = Connection::open(&path).unwrap();
        let (title, content): (String, String) = conn
            .query_row(
                "SELECT titleEncrypted, contentEncrypted FROM notes",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert!(!title.contains("secret"));
        assert!(!content.contains("secret"));
    }

    #[test]
    fn test_update_missing_id_is_not_found() {
        let store = store(DatabaseLocation::Memory);
        let result = store.save(&Note::revision(404, "T", "C"));
        assert!(matches!(result, Err(NoteError::NotFound(_))));
    }

    #[test]
    fn test_update_in_same_millisecond_lists_first() {
        let store = store(DatabaseLocation::Memory);
        let now = 1_700_000_000_000;
        let a = store.save_at(&Note::draft("A", ""), now).unwrap();
        store.save_at(&Note::draft("B", ""), now).unwrap();
        store.save_at(&Note::draft("C", ""), now).unwrap();

        store.save_at(&Note::revision(a, "A", "edited"), now).unwrap();

        let notes = store.list().unwrap();
        let titles: Vec<&str> = notes.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "C", "B"]);

        let stamps: Vec<i64> = notes.iter().map(|n| n.updated_at.unwrap()).collect();
        assert!(stamps.windows(2).all(|pair| pair[0] > pair[1]));
    }

    #[test]
    fn test_insert_keeps_created_equal_to_updated_after_bump() {
        let store = store(DatabaseLocation::Memory);
        let now = 1_700_000_000_000;
        store.save_at(&Note::draft("first", ""), now).unwrap();
        let id = store.save_at(&Note::draft("second", ""), now).unwrap();

        let note = store.get(id).unwrap().unwrap();
        assert_eq!(note.created_at, note.updated_at);
        assert_eq!(note.updated_at, Some(now + 1));
    }

    #[test]
    fn test_clock_ahead_of_rows_uses_now() {
        let store = store(DatabaseLocation::Memory);
        let id = store.save_at(&Note::draft("early", ""), 1_000).unwrap();
        store.save_at(&Note::revision(id, "early", "later"), 5_000).unwrap();

        let note = store.get(id).unwrap().unwrap();
        assert_eq!(note.created_at, Some(1_000));
        assert_eq!(note.updated_at, Some(5_000));
    }
}
