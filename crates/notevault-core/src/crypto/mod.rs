//! Cryptographic operations for Notevault.
//!
//! This module provides key management and field encryption using
//! well-audited libraries:
//! - **AES-256-CBC** (`aes` + `cbc`) with PKCS#7 padding for note fields
//! - **Argon2id** for stretching fresh key material before it is stored
//! - The OS random source (`getrandom`) for keys, salts and IVs
//!
//! ## Security Model
//!
//! - One key per installation, held in a platform secret store
//! - A fresh random IV for every encrypted field
//! - Key material zeroized from memory on drop
//! - No fallback cipher and no built-in key: if the secret store or random
//!   source is missing, operations fail
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of the notes database without the secret store
//!
//! We do NOT defend against:
//! - Tampering with stored ciphertext (CBC is not authenticated; tampering
//!   is detected only when padding or UTF-8 checks fail)
//! - Compromised OS / access to an unlocked session

pub mod cipher;
pub mod key;
pub mod secret_store;

pub use cipher::{FieldCipher, IV_LENGTH};
pub use key::{derive_key, EncryptionKey, KdfParams, KeyStore, KeyStoreOptions};
pub use secret_store::{AccessPolicy, MemorySecretStore, SecretStore};

use crate::error::{NoteError, Result};

/// Fill a fixed-size buffer from the OS random source.
pub(crate) fn random_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| NoteError::CipherUnavailable(format!("Random source failed: {}", e)))?;
    Ok(bytes)
}
