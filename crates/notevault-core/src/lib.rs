//! # Notevault Core
//!
//! Core library for Notevault - encrypted notes stored field by field in SQLite.
//!
//! This crate provides the encryption pipeline, storage backend and note
//! service independent of any user interface.
//!
//! ## Architecture
//!
//! - **crypto**: secret-store boundary, key lifecycle, AES-256-CBC field cipher
//! - **storage**: note types, note codec, repository trait and SQLite backend
//! - **service**: presenter relaying repository results to an observer
//! - **gate**: user-presence unlock check in front of the app
//!
//! ## Example
//!
//! ```no_run
//! use notevault_core::crypto::{FieldCipher, KeyStore, KeyStoreOptions, MemorySecretStore};
//! use notevault_core::storage::{DatabaseLocation, NoteCodec, SqliteNoteStore};
//! use notevault_core::NoteService;
//!
//! let keys = KeyStore::new(Box::new(MemorySecretStore::new()), KeyStoreOptions::default());
//! let codec = NoteCodec::new(FieldCipher::new(keys));
//! let store = SqliteNoteStore::new(DatabaseLocation::Memory, codec);
//! let service = NoteService::new(store);
//!
//! let note = service.add_note("Groceries", "eggs, milk").unwrap();
//! assert_eq!(service.load_notes().unwrap(), vec![note]);
//! ```

pub mod crypto;
pub mod error;
pub mod fs;
pub mod gate;
pub mod service;
pub mod storage;

pub use error::{NoteError, NoteField, Result};
pub use service::{NoteEvent, NoteObserver, NoteService, Operation};
pub use storage::NoteRepository;

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
