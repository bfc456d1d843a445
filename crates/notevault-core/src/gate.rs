//! Unlock gate in front of the whole application.
//!
//! Biometric (or other user-presence) checks authorize opening the app.
//! They are separate from the crypto path: the key store and
//! cipher never consult the gate.

use crate::error::{NoteError, Result};

/// A user-presence check provided by the platform.
pub trait Authenticator {
    /// Whether this device can run the check at all.
    fn is_available(&self) -> bool;

    /// Prompt the user. `Ok(false)` means the user failed or cancelled.
    fn authenticate(&self, prompt: &str) -> Result<bool>;
}

/// What to do when no authenticator is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnlockPolicy {
    /// Let the user in without a check.
    #[default]
    AllowWhenUnavailable,
    /// Refuse to unlock.
    RequireAuthenticator,
}

/// Run the unlock gate.
///
/// # Errors
///
/// Returns `NoteError::AuthenticationFailed` if the check is rejected, or if
/// it is unavailable under [`UnlockPolicy::RequireAuthenticator`].
pub fn unlock(authenticator: &dyn Authenticator, prompt: &str, policy: UnlockPolicy) -> Result<()> {
    if !authenticator.is_available() {
        return match policy {
            UnlockPolicy::AllowWhenUnavailable => {
                tracing::debug!("No authenticator available; unlocking without a check");
                Ok(())
            }
            UnlockPolicy::RequireAuthenticator => Err(NoteError::AuthenticationFailed(
                "No authenticator is available on this device".to_string(),
            )),
        };
    }

    if authenticator.authenticate(prompt)? {
        Ok(())
    } else {
        Err(NoteError::AuthenticationFailed(
            "User verification was not completed".to_string(),
        ))
    }
}

/// Authenticator for environments without any user-presence check.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAuthenticator;

impl Authenticator for NoAuthenticator {
    fn is_available(&self) -> bool {
        false
    }

    fn authenticate(&self, _prompt: &str) -> Result<bool> {
        Ok(false)
    }
}
