//! Application context for the Notevault CLI.
//!
//! Combines CLI arguments with the loaded config and wires the core
//! pipeline (secret store, key store, cipher, codec, SQLite store, service)
//! for command handlers.

use std::io::IsTerminal;
use std::path::PathBuf;

use dialoguer::Confirm;

use notevault_core::crypto::key::KEY_SERVICE;
use notevault_core::crypto::{FieldCipher, KeyStore, KeyStoreOptions, SecretStore};
use notevault_core::gate::{self, Authenticator};
use notevault_core::storage::{DatabaseLocation, NoteCodec, SqliteNoteStore};
use notevault_core::{NoteError, NoteEvent, NoteService};

use crate::cli::Cli;
use crate::config::{
    default_storage_path, expand_home, load_config, NotevaultConfig, SecretBackend,
};
use crate::constants::UNLOCK_PROMPT;
use crate::errors::CliError;
use crate::secrets::{KeychainSecretStore, KeyfileSecretStore};

/// The note service as the CLI uses it.
pub type VaultService = NoteService<SqliteNoteStore>;

/// Application context that bundles CLI args with the loaded configuration.
pub struct AppContext<'a> {
    cli: &'a Cli,
    config: NotevaultConfig,
}

impl<'a> AppContext<'a> {
    /// Load config (or defaults) for a command invocation.
    pub fn load(cli: &'a Cli) -> anyhow::Result<Self> {
        Ok(Self {
            cli,
            config: load_config()?,
        })
    }

    /// Check if quiet mode is enabled.
    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// Resolve the database path: `--db`/NOTEVAULT_DB, then config, then XDG default.
    pub fn storage_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = self.cli.db.as_deref().filter(|p| !p.trim().is_empty()) {
            return expand_home(path);
        }
        match self.config.storage.path.as_deref() {
            Some(path) if !path.trim().is_empty() => expand_home(path),
            _ => default_storage_path(),
        }
    }

    fn secret_store(&self) -> anyhow::Result<Box<dyn SecretStore>> {
        match self.config.secrets.backend {
            SecretBackend::Keychain => Ok(Box::new(KeychainSecretStore::new())),
            SecretBackend::Keyfile => {
                let path = self
                    .config
                    .secrets
                    .keyfile_path
                    .as_deref()
                    .ok_or_else(|| {
                        CliError::invalid_input("Keyfile backend needs secrets.keyfile_path")
                    })?;
                Ok(Box::new(KeyfileSecretStore::new(expand_home(path)?)))
            }
        }
    }

    /// Run the unlock gate, then open the note service.
    pub fn open_service(&self) -> anyhow::Result<VaultService> {
        gate::unlock(
            &ConsoleAuthenticator,
            UNLOCK_PROMPT,
            self.config.unlock_policy(),
        )
        .map_err(|e| CliError::from(&e))?;

        let options = KeyStoreOptions {
            service: KEY_SERVICE.to_string(),
            kdf: self.config.kdf_params(),
            access: self.config.access_policy(),
        };
        let keys = KeyStore::new(self.secret_store()?, options);
        let codec = NoteCodec::new(FieldCipher::new(keys));

        let path = self.storage_path()?;
        tracing::debug!(path = %path.display(), "Opening note store");
        let store = SqliteNoteStore::new(DatabaseLocation::File(path), codec);

        let mut service = NoteService::new(store);
        service.set_observer(Box::new(|event: &NoteEvent| log_event(event)));
        Ok(service)
    }
}

fn log_event(event: &NoteEvent) {
    match event {
        NoteEvent::Loaded(notes) => tracing::debug!(count = notes.len(), "Notes loaded"),
        NoteEvent::Fetched(note) => tracing::debug!(found = note.is_some(), "Note fetched"),
        NoteEvent::Added(note) => tracing::debug!(id = %note.id, "Note added"),
        NoteEvent::Updated(note) => tracing::debug!(id = %note.id, "Note updated"),
        NoteEvent::Deleted(id) => tracing::debug!(id, "Note deleted"),
        NoteEvent::Reset => tracing::debug!("Vault reset"),
        NoteEvent::Failed { operation, message } => {
            tracing::debug!(%operation, message = message.as_str(), "Operation failed")
        }
    }
}

/// Terminal confirmation standing in for a platform biometric prompt.
///
/// Only available when both stdin and stderr are terminals.
pub struct ConsoleAuthenticator;

impl Authenticator for ConsoleAuthenticator {
    fn is_available(&self) -> bool {
        std::io::stdin().is_terminal() && std::io::stderr().is_terminal()
    }

    fn authenticate(&self, prompt: &str) -> notevault_core::Result<bool> {
        Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()
            .map_err(|e| NoteError::AuthenticationFailed(format!("Prompt failed: {}", e)))
    }
}
