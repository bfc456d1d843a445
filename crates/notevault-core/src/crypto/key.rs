//! Encryption key lifecycle.
//!
//! A single 256-bit key per installation encrypts every note field. The key
//! is created lazily on first use: random seed material is stretched with
//! Argon2id under a random salt, and the result is written to the secure
//! store together with that salt. It is reused until [`KeyStore::reset`]
//! destroys it, after which everything encrypted under it is unreadable.

use std::sync::{Mutex, MutexGuard};

use argon2::Argon2;
use zeroize::{ZeroizeOnDrop, Zeroizing};

use super::random_bytes;
use super::secret_store::{AccessPolicy, SecretStore};
use crate::error::{NoteError, Result};

/// Length of the encryption key in bytes (256 bits for AES-256).
pub const KEY_LENGTH: usize = 32;

/// Length of the stored KDF salt in bytes.
pub const SALT_LENGTH: usize = 16;

/// Default secure-storage service identifier.
pub const KEY_SERVICE: &str = "notevault";

/// Account holding the hex-encoded key.
pub const KEY_ACCOUNT: &str = "encryption-key";

/// Account holding the hex-encoded KDF salt.
pub const SALT_ACCOUNT: &str = "encryption-salt";

/// Argon2id cost parameters.
///
/// The defaults (64 MiB, 3 passes, 1 lane) are only paid once, when the key
/// is first created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: 64 * 1024,
            iterations: 3,
            parallelism: 1,
        }
    }
}

/// The symmetric key used for field encryption.
///
/// Key material is zeroized from memory when dropped.
#[derive(Clone, PartialEq, Eq, ZeroizeOnDrop)]
pub struct EncryptionKey {
    key: [u8; KEY_LENGTH],
}

impl EncryptionKey {
    pub fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { key: bytes }
    }

    /// Parse a key from its stored hex form.
    pub fn from_hex(encoded: &str) -> Result<Self> {
        let decoded = Zeroizing::new(hex::decode(encoded.trim()).map_err(|e| {
            NoteError::StorageUnavailable(format!("Stored encryption key is not hex: {}", e))
        })?);
        let key: [u8; KEY_LENGTH] = decoded.as_slice().try_into().map_err(|_| {
            NoteError::StorageUnavailable(format!(
                "Stored encryption key has {} bytes (expected {})",
                decoded.len(),
                KEY_LENGTH
            ))
        })?;
        Ok(Self { key })
    }

    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.key))
    }

    /// Raw key bytes. Use only for immediate cipher operations.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Stretch key material into an [`EncryptionKey`] with Argon2id.
///
/// Same material + salt + params always yields the same key.
pub fn derive_key(material: &[u8], salt: &[u8], params: &KdfParams) -> Result<EncryptionKey> {
    if material.is_empty() {
        return Err(NoteError::InvalidInput(
            "Key material cannot be empty".to_string(),
        ));
    }

    if salt.len() < SALT_LENGTH {
        return Err(NoteError::InvalidInput(format!(
            "Salt must be at least {} bytes",
            SALT_LENGTH
        )));
    }

    let argon2_params = argon2::Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        Some(KEY_LENGTH),
    )
    .map_err(|e| NoteError::InvalidInput(format!("Invalid Argon2 params: {}", e)))?;

    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2_params,
    );

    let mut key_bytes = [0u8; KEY_LENGTH];
    argon2
        .hash_password_into(material, salt, &mut key_bytes)
        .map_err(|e| NoteError::CipherUnavailable(format!("Key derivation failed: {}", e)))?;

    Ok(EncryptionKey::from_bytes(key_bytes))
}

/// Options for a [`KeyStore`].
#[derive(Debug, Clone)]
pub struct KeyStoreOptions {
    pub service: String,
    pub kdf: KdfParams,
    pub access: AccessPolicy,
}

impl Default for KeyStoreOptions {
    fn default() -> Self {
        Self {
            service: KEY_SERVICE.to_string(),
            kdf: KdfParams::default(),
            access: AccessPolicy::WhenUnlocked,
        }
    }
}

/// Obtains and persists the installation's encryption key.
pub struct KeyStore {
    secrets: Box<dyn SecretStore>,
    options: KeyStoreOptions,
    cached: Mutex<Option<EncryptionKey>>,
}

impl KeyStore {
    pub fn new(secrets: Box<dyn SecretStore>, options: KeyStoreOptions) -> Self {
        Self {
            secrets,
            options,
            cached: Mutex::new(None),
        }
    }

    pub fn options(&self) -> &KeyStoreOptions {
        &self.options
    }

    /// Return the key, creating and persisting it on first use.
    ///
    /// # Errors
    ///
    /// Returns `NoteError::StorageUnavailable` if the secret store cannot be
    /// read or written, or holds a malformed key.
    pub fn get_key(&self) -> Result<EncryptionKey> {
        let mut cached = self.lock_cache()?;
        if let Some(key) = cached.as_ref() {
            return Ok(key.clone());
        }

        let stored = self.secrets.get(&self.options.service, KEY_ACCOUNT)?;
        let key = match stored.map(Zeroizing::new) {
            Some(encoded) => EncryptionKey::from_hex(&encoded)?,
            None => self.create_key()?,
        };

        *cached = Some(key.clone());
        Ok(key)
    }

    /// Delete the key and its salt. The next [`get_key`](Self::get_key)
    /// creates an unrelated key.
    pub fn reset(&self) -> Result<()> {
        let mut cached = self.lock_cache()?;
        *cached = None;
        self.secrets.delete(&self.options.service, KEY_ACCOUNT)?;
        self.secrets.delete(&self.options.service, SALT_ACCOUNT)?;
        tracing::debug!(service = %self.options.service, "Encryption key reset");
        Ok(())
    }

    fn create_key(&self) -> Result<EncryptionKey> {
        let seed = Zeroizing::new(random_bytes::<KEY_LENGTH>()?);
        let salt = random_bytes::<SALT_LENGTH>()?;
        let key = derive_key(seed.as_slice(), &salt, &self.options.kdf)?;

        // Salt first: a key is never stored without the salt it came from.
        self.secrets.set(
            &self.options.service,
            SALT_ACCOUNT,
            &hex::encode(salt),
            self.options.access,
        )?;
        self.secrets.set(
            &self.options.service,
            KEY_ACCOUNT,
            &key.to_hex(),
            self.options.access,
        )?;

        tracing::debug!(service = %self.options.service, "Created new encryption key");
        Ok(key)
    }

    fn lock_cache(&self) -> Result<MutexGuard<'_, Option<EncryptionKey>>> {
        self.cached
            .lock()
            .map_err(|_| NoteError::StorageUnavailable("Key cache poisoned".to_string()))
    }
}

#[cfg(test)]
pub(crate) fn test_kdf() -> KdfParams {
    KdfParams {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::crypto::secret_store::MemorySecretStore;

    fn key_store(secrets: Arc<MemorySecretStore>) -> KeyStore {
        KeyStore::new(
            Box::new(secrets),
            KeyStoreOptions {
                kdf: test_kdf(),
                ..KeyStoreOptions::default()
            },
        )
    }

    #[test]
    fn test_key_derivation_deterministic() {
        let salt = b"unique-salt-1234567890123456";
        let key1 = derive_key(b"material", salt, &test_kdf()).unwrap();
        let key2 = derive_key(b"material", salt, &test_kdf()).unwrap();
        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_salt_different_key() {
        let key1 = derive_key(b"material", b"salt1-1234567890123456", &test_kdf()).unwrap();
        let key2 = derive_key(b"material", b"salt2-1234567890123456", &test_kdf()).unwrap();
        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_short_salt_rejected() {
        let result = derive_key(b"material", b"short", &test_kdf());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Salt must be at least 16 bytes"));
    }

    #[test]
    fn test_empty_material_rejected() {
        let result = derive_key(b"", b"salt-1234567890123456", &test_kdf());
        assert!(matches!(result, Err(NoteError::InvalidInput(_))));
    }

    #[test]
    fn test_key_debug_redacts() {
        let key = EncryptionKey::from_bytes([0xAB; KEY_LENGTH]);
        let debug_output = format!("{:?}", key);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("abab"));
    }

    #[test]
    fn test_hex_round_trip() {
        let key = EncryptionKey::from_bytes([7u8; KEY_LENGTH]);
        let parsed = EncryptionKey::from_hex(&key.to_hex()).unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn test_from_hex_rejects_wrong_length() {
        let result = EncryptionKey::from_hex("abcd");
        assert!(matches!(result, Err(NoteError::StorageUnavailable(_))));
    }

    #[test]
    fn test_get_key_persists_key_and_salt() {
        let secrets = Arc::new(MemorySecretStore::new());
        let store = key_store(secrets.clone());

        let key = store.get_key().unwrap();

        let stored = secrets.get(KEY_SERVICE, KEY_ACCOUNT).unwrap().unwrap();
        assert_eq!(stored, *key.to_hex());
        let salt = secrets.get(KEY_SERVICE, SALT_ACCOUNT).unwrap().unwrap();
        assert_eq!(hex::decode(salt).unwrap().len(), SALT_LENGTH);
    }

    #[test]
    fn test_get_key_twice_returns_same_key() {
        let secrets = Arc::new(MemorySecretStore::new());
        let store = key_store(secrets);
        assert_eq!(store.get_key().unwrap(), store.get_key().unwrap());
    }

    #[test]
    fn test_key_survives_new_key_store_instance() {
        let secrets = Arc::new(MemorySecretStore::new());
        let first = key_store(secrets.clone()).get_key().unwrap();
        let second = key_store(secrets).get_key().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_reset_produces_unrelated_key() {
        let secrets = Arc::new(MemorySecretStore::new());
        let store = key_store(secrets.clone());

        let before = store.get_key().unwrap();
        store.reset().unwrap();
        assert_eq!(secrets.get(KEY_SERVICE, KEY_ACCOUNT).unwrap(), None);
        assert_eq!(secrets.get(KEY_SERVICE, SALT_ACCOUNT).unwrap(), None);

        let after = store.get_key().unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn test_unavailable_secret_store_fails_without_fallback() {
        let secrets = Arc::new(MemorySecretStore::new());
        secrets.set_available(false);
        let store = key_store(secrets);

        let result = store.get_key();
        assert!(matches!(result, Err(NoteError::StorageUnavailable(_))));
    }

    #[test]
    fn test_access_policy_applied_to_stored_entries() {
        let secrets = Arc::new(MemorySecretStore::new());
        let store = KeyStore::new(
            Box::new(secrets.clone()),
            KeyStoreOptions {
                kdf: test_kdf(),
                access: AccessPolicy::RequireAuthentication,
                ..KeyStoreOptions::default()
            },
        );
        store.get_key().unwrap();
        assert_eq!(
            secrets.access_policy(KEY_SERVICE, KEY_ACCOUNT),
            Some(AccessPolicy::RequireAuthentication)
        );
    }
}
