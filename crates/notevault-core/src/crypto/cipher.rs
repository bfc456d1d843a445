//! Per-field AES-256-CBC encryption.
//!
//! Every call to [`FieldCipher::encrypt_field`] draws a fresh 16-byte IV, so
//! identical plaintexts never share ciphertext. Ciphertext is stored as
//! standard base64 and the IV as lowercase hex; decryption accepts exactly
//! that pairing.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use zeroize::Zeroizing;

use super::key::{EncryptionKey, KeyStore};
use super::random_bytes;
use crate::error::{NoteError, Result};
use crate::storage::types::EncryptedField;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// AES block size, and therefore the IV length, in bytes.
pub const IV_LENGTH: usize = 16;

/// Encrypt `plaintext` under an explicit key and IV.
pub fn encrypt_with_key(key: &EncryptionKey, iv: &[u8; IV_LENGTH], plaintext: &str) -> Vec<u8> {
    Aes256CbcEnc::new(key.as_bytes().into(), iv.into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes())
}

/// Decrypt raw ciphertext under an explicit key and IV.
///
/// # Errors
///
/// Returns `NoteError::DecryptionFailed` on a padding check failure or if
/// the recovered bytes are not UTF-8. A wrong key almost always surfaces as
/// one of the two.
pub fn decrypt_with_key(
    key: &EncryptionKey,
    iv: &[u8; IV_LENGTH],
    ciphertext: &[u8],
) -> Result<String> {
    let plaintext = Aes256CbcDec::new(key.as_bytes().into(), iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| NoteError::DecryptionFailed("Padding check failed".to_string()))?;

    String::from_utf8(plaintext).map_err(|e| {
        let _wipe = Zeroizing::new(e.into_bytes());
        NoteError::DecryptionFailed("Plaintext is not valid UTF-8".to_string())
    })
}

/// Parse a stored IV, which must be hex for exactly [`IV_LENGTH`] bytes.
pub fn parse_iv(iv: &str) -> Result<[u8; IV_LENGTH]> {
    if iv.is_empty() {
        return Err(NoteError::InvalidIv("IV is missing".to_string()));
    }
    let bytes = hex::decode(iv).map_err(|e| NoteError::InvalidIv(format!("IV is not hex: {}", e)))?;
    bytes.as_slice().try_into().map_err(|_| {
        NoteError::InvalidIv(format!(
            "IV has {} bytes (expected {})",
            bytes.len(),
            IV_LENGTH
        ))
    })
}

/// Encrypts and decrypts single string fields with the installation key.
pub struct FieldCipher {
    keys: KeyStore,
}

impl FieldCipher {
    pub fn new(keys: KeyStore) -> Self {
        Self { keys }
    }

    pub fn key_store(&self) -> &KeyStore {
        &self.keys
    }

    /// Encrypt one field under a fresh IV.
    ///
    /// # Errors
    ///
    /// - `NoteError::CipherUnavailable` if no random IV can be drawn
    /// - `NoteError::StorageUnavailable` if the key cannot be obtained
    pub fn encrypt_field(&self, plaintext: &str) -> Result<EncryptedField> {
        let iv = random_bytes::<IV_LENGTH>()?;
        let key = self.keys.get_key()?;
        let ciphertext = encrypt_with_key(&key, &iv, plaintext);

        Ok(EncryptedField {
            ciphertext: STANDARD.encode(ciphertext),
            iv: hex::encode(iv),
        })
    }

    /// Decrypt one field.
    ///
    /// # Errors
    ///
    /// - `NoteError::InvalidIv` if the IV is absent or the wrong length
    /// - `NoteError::DecryptionFailed` for a wrong key, corrupted
    ///   ciphertext, or padding failure
    pub fn decrypt_field(&self, ciphertext: &str, iv: &str) -> Result<String> {
        let iv = parse_iv(iv)?;
        let raw = STANDARD
            .decode(ciphertext)
            .map_err(|e| NoteError::DecryptionFailed(format!("Ciphertext is not base64: {}", e)))?;
        let key = self.keys.get_key()?;
        decrypt_with_key(&key, &iv, &raw)
    }

    /// Destroy the current key. Previously encrypted fields become
    /// undecryptable.
    pub fn reset_key(&self) -> Result<()> {
        self.keys.reset()
    }
}
