use std::path::Path;
use std::sync::Arc;

use rusqlite::Connection;

use notevault_core::crypto::{
    FieldCipher, KdfParams, KeyStore, KeyStoreOptions, MemorySecretStore, SecretStore,
};
use notevault_core::storage::{DatabaseLocation, Note, NoteCodec, NoteId, SqliteNoteStore};
use notevault_core::{NoteError, NoteRepository};

fn fast_kdf() -> KdfParams {
    KdfParams {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    }
}

fn codec(secrets: Arc<MemorySecretStore>) -> NoteCodec {
    let keys = KeyStore::new(
        Box::new(secrets),
        KeyStoreOptions {
            kdf: fast_kdf(),
            ..KeyStoreOptions::default()
        },
    );
    NoteCodec::new(FieldCipher::new(keys))
}

fn memory_store() -> SqliteNoteStore {
    SqliteNoteStore::new(
        DatabaseLocation::Memory,
        codec(Arc::new(MemorySecretStore::new())),
    )
}

fn file_store(path: &Path, secrets: Arc<MemorySecretStore>) -> SqliteNoteStore {
    SqliteNoteStore::new(DatabaseLocation::File(path.to_path_buf()), codec(secrets))
}

fn titles(notes: &[Note]) -> Vec<&str> {
    notes.iter().map(|note| note.title.as_str()).collect()
}

#[test]
fn test_save_get_round_trip() {
    let store = memory_store();

    let id = store
        .save(&Note::draft("T", "C"))
        .expect("save should succeed");
    let note = store.get(id).expect("get should succeed").expect("note exists");

    assert_eq!(note.id, NoteId::Saved(id));
    assert_eq!(note.title, "T");
    assert_eq!(note.content, "C");
    assert!(note.created_at.is_some());
    assert_eq!(note.created_at, note.updated_at);
}

#[test]
fn test_unicode_and_empty_fields_round_trip() {
    let store = memory_store();
    let id = store
        .save(&Note::draft("zażółć 🗒️", ""))
        .expect("save should succeed");

    let note = store.get(id).unwrap().unwrap();
    assert_eq!(note.title, "zażółć 🗒️");
    assert_eq!(note.content, "");
}

#[test]
fn test_update_keeps_created_at_and_advances_updated_at() {
    let store = memory_store();
    let id = store.save(&Note::draft("first", "v1")).unwrap();
    let before = store.get(id).unwrap().unwrap();

    let returned = store.save(&Note::revision(id, "second", "v2")).unwrap();
    assert_eq!(returned, id);

    let after = store.get(id).unwrap().unwrap();
    assert_eq!(after.title, "second");
    assert_eq!(after.content, "v2");
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at.unwrap() > before.updated_at.unwrap());
}

#[test]
fn test_repeated_updates_strictly_increase_updated_at() {
    let store = memory_store();
    let id = store.save(&Note::draft("n", "")).unwrap();

    let mut last = store.get(id).unwrap().unwrap().updated_at.unwrap();
    for round in 0..5 {
        store
            .save(&Note::revision(id, "n", format!("round {}", round)))
            .unwrap();
        let current = store.get(id).unwrap().unwrap().updated_at.unwrap();
        assert!(current > last);
        last = current;
    }
}

#[test]
fn test_list_orders_by_most_recent_update() {
    let store = memory_store();
    let a = store.save(&Note::draft("A", "")).unwrap();
    store.save(&Note::draft("B", "")).unwrap();
    store.save(&Note::draft("C", "")).unwrap();

    store.save(&Note::revision(a, "A", "edited")).unwrap();

    let notes = store.list().expect("list should succeed");
    assert_eq!(titles(&notes), vec!["A", "C", "B"]);
}

#[test]
fn test_list_empty_store() {
    let store = memory_store();
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn test_delete_is_idempotent() {
    let store = memory_store();
    let id = store.save(&Note::draft("gone soon", "")).unwrap();

    store.delete(id).expect("first delete should succeed");
    store.delete(id).expect("second delete should succeed");
    assert!(store.get(id).unwrap().is_none());
}

#[test]
fn test_get_missing_returns_none() {
    let store = memory_store();
    assert!(store.get(12345).unwrap().is_none());
}

#[test]
fn test_corrupted_row_is_skipped_in_list_but_fails_get() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");
    let store = file_store(&path, Arc::new(MemorySecretStore::new()));

    let keep_1 = store.save(&Note::draft("keep 1", "")).unwrap();
    let broken = store.save(&Note::draft("broken", "")).unwrap();
    let keep_2 = store.save(&Note::draft("keep 2", "")).unwrap();

    let conn = Connection::open(&path).unwrap();
    conn.execute(
        "UPDATE notes SET contentEncrypted = ?1 WHERE id = ?2",
        ("%%% not ciphertext %%%", broken),
    )
    .unwrap();

    let notes = store.list().expect("list should skip the corrupted row");
    let ids: Vec<_> = notes.iter().map(|note| note.id).collect();
    assert_eq!(ids, vec![NoteId::Saved(keep_2), NoteId::Saved(keep_1)]);

    let err = store.get(broken).expect_err("get should fail");
    assert!(matches!(err, NoteError::DecodeFailed { .. }));
}

#[test]
fn test_corrupted_iv_fails_get() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");
    let store = file_store(&path, Arc::new(MemorySecretStore::new()));
    let id = store.save(&Note::draft("t", "c")).unwrap();

    let conn = Connection::open(&path).unwrap();
    conn.execute("UPDATE notes SET titleIv = 'abc' WHERE id = ?1", [id])
        .unwrap();

    let err = store.get(id).expect_err("get should fail");
    match err {
        NoteError::DecodeFailed { source, .. } => {
            assert!(matches!(*source, NoteError::InvalidIv(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_notes_survive_reopen_with_same_secret_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");
    let secrets = Arc::new(MemorySecretStore::new());

    let id = {
        let store = file_store(&path, secrets.clone());
        store.save(&Note::draft("durable", "yes")).unwrap()
    };

    let store = file_store(&path, secrets);
    let note = store.get(id).unwrap().unwrap();
    assert_eq!(note.title, "durable");
}

#[test]
fn test_notes_unreadable_without_original_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");

    let id = file_store(&path, Arc::new(MemorySecretStore::new()))
        .save(&Note::draft("only key A can read this", ""))
        .unwrap();

    let other = file_store(&path, Arc::new(MemorySecretStore::new()));
    assert!(other.get(id).is_err());
    assert!(other.list().unwrap().is_empty());
}

#[test]
fn test_reset_drops_notes_and_key() {
    let secrets = Arc::new(MemorySecretStore::new());
    let store = SqliteNoteStore::new(DatabaseLocation::Memory, codec(secrets.clone()));
    store.save(&Note::draft("old", "")).unwrap();
    let old_key = secrets
        .get("notevault", "encryption-key")
        .unwrap()
        .expect("key stored");

    store.reset().expect("reset should succeed");
    assert!(store.list().unwrap().is_empty());
    assert_eq!(secrets.get("notevault", "encryption-key").unwrap(), None);

    let id = store.save(&Note::draft("new", "")).unwrap();
    assert_eq!(store.get(id).unwrap().unwrap().title, "new");
    let new_key = secrets.get("notevault", "encryption-key").unwrap().unwrap();
    assert_ne!(old_key, new_key);
}

#[test]
fn test_unavailable_secret_store_fails_save() {
    let secrets = Arc::new(MemorySecretStore::new());
    secrets.set_available(false);
    let store = SqliteNoteStore::new(DatabaseLocation::Memory, codec(secrets));

    let result = store.save(&Note::draft("t", "c"));
    assert!(matches!(result, Err(NoteError::StorageUnavailable(_))));
}

#[test]
fn test_list_propagates_unavailable_secret_store() {
    let secrets = Arc::new(MemorySecretStore::new());

    // A fresh store has no cached key, so listing must reach the secret store.
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");
    let writer = file_store(&path, secrets.clone());
    writer.save(&Note::draft("t", "c")).unwrap();
    let reader = file_store(&path, secrets.clone());
    secrets.set_available(false);

    let result = reader.list();
    assert!(matches!(result, Err(NoteError::StorageUnavailable(_))));
}

#[test]
fn test_operations_reopen_after_close() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");
    let store = file_store(&path, Arc::new(MemorySecretStore::new()));

    let id = store.save(&Note::draft("before close", "")).unwrap();
    store.close().unwrap();
    store.save(&Note::revision(id, "after close", "")).unwrap();

    assert_eq!(titles(&store.list().unwrap()), vec!["after close"]);
}
