//! Storage abstraction for Notevault.
//!
//! This module defines the `NoteRepository` trait, the plaintext and
//! encrypted note types, and the codec that maps between them.
//!
//! ## Architecture
//!
//! ```text
//! Note --NoteCodec::to_record--> EncryptedNoteRecord --> notes table
//! Note <--NoteCodec::to_note---- EncryptedNoteRecord <-- notes table
//! ```
//!
//! ## Security
//!
//! Storage backends are responsible for:
//! - Never writing plaintext title or content
//! - Keeping each ciphertext next to its IV
//! - Surfacing undecryptable rows instead of returning wrong plaintext

pub mod codec;
pub mod sqlite;
pub mod traits;
pub mod types;

// Re-export public types
pub use codec::NoteCodec;
pub use sqlite::{DatabaseLocation, SqliteNoteStore};
pub use traits::NoteRepository;
pub use types::{EncryptedField, EncryptedNoteRecord, Note, NoteId};
