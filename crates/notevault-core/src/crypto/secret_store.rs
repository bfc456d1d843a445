//! Secure-storage boundary.
//!
//! The key store never talks to a platform keychain directly. It goes
//! through [`SecretStore`], a get/set/delete interface keyed by
//! `(service, account)`. The CLI provides OS keychain and keyfile backends;
//! [`MemorySecretStore`] backs tests and throwaway sessions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::error::{NoteError, Result};

/// Access requirement attached to a stored secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessPolicy {
    /// Readable whenever the device/session is unlocked.
    #[default]
    WhenUnlocked,
    /// Reading requires a fresh user authentication (biometric or OS prompt).
    RequireAuthentication,
}

/// Keyed secret storage provided by the platform.
///
/// Implementations must report backend failures as
/// [`NoteError::StorageUnavailable`] and must treat deleting a missing
/// entry as success.
pub trait SecretStore: Send + Sync {
    /// Fetch a secret, `Ok(None)` if no entry exists.
    fn get(&self, service: &str, account: &str) -> Result<Option<String>>;

    /// Create or overwrite a secret.
    fn set(&self, service: &str, account: &str, secret: &str, access: AccessPolicy) -> Result<()>;

    /// Remove a secret.
    fn delete(&self, service: &str, account: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
struct StoredSecret {
    value: String,
    access: AccessPolicy,
}

/// In-process secret store.
///
/// Secrets live only as long as the value. `set_available(false)` makes
/// every call fail with `StorageUnavailable`, which is how tests model a
/// locked or missing keychain.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    entries: Mutex<HashMap<(String, String), StoredSecret>>,
    unavailable: AtomicBool,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Access policy recorded for an entry, if present.
    pub fn access_policy(&self, service: &str, account: &str) -> Option<AccessPolicy> {
        self.lock()
            .ok()?
            .get(&(service.to_string(), account.to_string()))
            .map(|secret| secret.access)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<(String, String), StoredSecret>>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(NoteError::StorageUnavailable(
                "Secret store is not available".to_string(),
            ));
        }
        self.entries
            .lock()
            .map_err(|_| NoteError::StorageUnavailable("Secret store poisoned".to_string()))
    }
}

impl SecretStore for MemorySecretStore {
    fn get(&self, service: &str, account: &str) -> Result<Option<String>> {
        let entries = self.lock()?;
        Ok(entries
            .get(&(service.to_string(), account.to_string()))
            .map(|secret| secret.value.clone()))
    }

    fn set(&self, service: &str, account: &str, secret: &str, access: AccessPolicy) -> Result<()> {
        let mut entries = self.lock()?;
        entries.insert(
            (service.to_string(), account.to_string()),
            StoredSecret {
                value: secret.to_string(),
                access,
            },
        );
        Ok(())
    }

    fn delete(&self, service: &str, account: &str) -> Result<()> {
        let mut entries = self.lock()?;
        entries.remove(&(service.to_string(), account.to_string()));
        Ok(())
    }
}

impl<T: SecretStore + ?Sized> SecretStore for std::sync::Arc<T> {
    fn get(&self, service: &str, account: &str) -> Result<Option<String>> {
        (**self).get(service, account)
    }

    fn set(&self, service: &str, account: &str, secret: &str, access: AccessPolicy) -> Result<()> {
        (**self).set(service, account, secret, access)
    }

    fn delete(&self, service: &str, account: &str) -> Result<()> {
        (**self).delete(service, account)
    }
}
