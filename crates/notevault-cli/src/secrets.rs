//! Secret store backends: the OS keychain and an owner-only keyfile.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use notevault_core::crypto::{AccessPolicy, SecretStore};
use notevault_core::fs::write_private_atomic;
use notevault_core::{NoteError, Result};

/// Secrets kept in the platform keychain via `keyring`.
#[derive(Debug, Default)]
pub struct KeychainSecretStore;

impl KeychainSecretStore {
    pub fn new() -> Self {
        Self
    }

    fn entry(service: &str, account: &str) -> Result<keyring::Entry> {
        keyring::Entry::new(service, account)
            .map_err(|e| NoteError::StorageUnavailable(format!("Keychain entry failed: {}", e)))
    }
}

impl SecretStore for KeychainSecretStore {
    fn get(&self, service: &str, account: &str) -> Result<Option<String>> {
        match Self::entry(service, account)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(NoteError::StorageUnavailable(format!(
                "Keychain read failed: {}",
                err
            ))),
        }
    }

    fn set(&self, service: &str, account: &str, secret: &str, access: AccessPolicy) -> Result<()> {
        if access == AccessPolicy::RequireAuthentication {
            tracing::warn!(
                account,
                "Keychain backend cannot require authentication per read; relying on the OS unlock"
            );
        }
        Self::entry(service, account)?
            .set_password(secret)
            .map_err(|e| NoteError::StorageUnavailable(format!("Keychain write failed: {}", e)))
    }

    fn delete(&self, service: &str, account: &str) -> Result<()> {
        match Self::entry(service, account)?.delete_password() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(NoteError::StorageUnavailable(format!(
                "Keychain delete failed: {}",
                err
            ))),
        }
    }
}

/// Secrets kept as a JSON map in a file readable only by the owner.
///
/// Meant for headless hosts without a keychain. The file is replaced
/// atomically on every write.
#[derive(Debug)]
pub struct KeyfileSecretStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl KeyfileSecretStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn slot(service: &str, account: &str) -> String {
        format!("{}/{}", service, account)
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            NoteError::StorageUnavailable(format!(
                "Failed to read keyfile {}: {}",
                self.path.display(),
                e
            ))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            NoteError::StorageUnavailable(format!(
                "Keyfile {} is not valid: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        let contents = serde_json::to_vec_pretty(map)
            .map_err(|e| NoteError::StorageUnavailable(format!("Keyfile encode failed: {}", e)))?;
        write_private_atomic(&self.path, &contents).map_err(|e| {
            NoteError::StorageUnavailable(format!(
                "Failed to write keyfile {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|_| NoteError::StorageUnavailable("Keyfile lock poisoned".to_string()))
    }
}

impl SecretStore for KeyfileSecretStore {
    fn get(&self, service: &str, account: &str) -> Result<Option<String>> {
        let _guard = self.guard()?;
        Ok(self.read_map()?.remove(&Self::slot(service, account)))
    }

    fn set(&self, service: &str, account: &str, secret: &str, access: AccessPolicy) -> Result<()> {
        if access == AccessPolicy::RequireAuthentication {
            tracing::warn!(
                account,
                "Keyfile backend cannot require authentication; storing with file permissions only"
            );
        }
        let _guard = self.guard()?;
        let mut map = self.read_map()?;
        map.insert(Self::slot(service, account), secret.to_string());
        self.write_map(&map)
    }

    fn delete(&self, service: &str, account: &str) -> Result<()> {
        let _guard = self.guard()?;
        let mut map = self.read_map()?;
        if map.remove(&Self::slot(service, account)).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}
