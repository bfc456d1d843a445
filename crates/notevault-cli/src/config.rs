use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use notevault_core::crypto::{AccessPolicy, KdfParams};
use notevault_core::gate::UnlockPolicy;

use crate::errors::CliError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotevaultConfig {
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub secrets: SecretsSection,
    #[serde(default)]
    pub kdf: KdfSection,
    #[serde(default)]
    pub security: SecuritySection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSection {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretsSection {
    #[serde(default)]
    pub backend: SecretBackend,
    pub keyfile_path: Option<String>,
    #[serde(default)]
    pub require_authentication: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KdfSection {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecuritySection {
    #[serde(default)]
    pub unlock: UnlockMode,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SecretBackend {
    #[default]
    Keychain,
    Keyfile,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnlockMode {
    #[default]
    AllowWhenUnavailable,
    RequireAuthenticator,
}

impl Default for KdfSection {
    fn default() -> Self {
        let params = KdfParams::default();
        Self {
            memory_kib: params.memory_kib,
            iterations: params.iterations,
            parallelism: params.parallelism,
        }
    }
}

impl std::str::FromStr for SecretBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> anyhow::Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "keychain" => Ok(SecretBackend::Keychain),
            "keyfile" => Ok(SecretBackend::Keyfile),
            other => Err(anyhow::anyhow!(
                "Unknown secret backend '{}' (expected keychain or keyfile)",
                other
            )),
        }
    }
}

impl NotevaultConfig {
    pub fn new(
        storage_path: PathBuf,
        backend: SecretBackend,
        keyfile_path: Option<PathBuf>,
    ) -> Self {
        Self {
            storage: StorageSection {
                path: Some(storage_path.to_string_lossy().to_string()),
            },
            secrets: SecretsSection {
                backend,
                keyfile_path: keyfile_path.map(|path| path.to_string_lossy().to_string()),
                require_authentication: false,
            },
            kdf: KdfSection::default(),
            security: SecuritySection::default(),
        }
    }

    /// Reject combinations the backends cannot honor.
    pub fn validate(&self) -> Result<(), CliError> {
        if self.secrets.backend == SecretBackend::Keyfile
            && self
                .secrets
                .keyfile_path
                .as_deref()
                .map_or(true, |path| path.trim().is_empty())
        {
            return Err(CliError::invalid_input(
                "secrets.backend = \"keyfile\" requires secrets.keyfile_path",
            ));
        }
        if self.kdf.memory_kib == 0 || self.kdf.iterations == 0 || self.kdf.parallelism == 0 {
            return Err(CliError::invalid_input(
                "kdf parameters must be greater than zero",
            ));
        }
        Ok(())
    }

    pub fn kdf_params(&self) -> KdfParams {
        KdfParams {
            memory_kib: self.kdf.memory_kib,
            iterations: self.kdf.iterations,
            parallelism: self.kdf.parallelism,
        }
    }

    pub fn access_policy(&self) -> AccessPolicy {
        if self.secrets.require_authentication {
            AccessPolicy::RequireAuthentication
        } else {
            AccessPolicy::WhenUnlocked
        }
    }

    pub fn unlock_policy(&self) -> UnlockPolicy {
        match self.security.unlock {
            UnlockMode::AllowWhenUnavailable => UnlockPolicy::AllowWhenUnavailable,
            UnlockMode::RequireAuthenticator => UnlockPolicy::RequireAuthenticator,
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_storage_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("notes.db"))
}

pub fn default_keyfile_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("secrets.json"))
}

pub fn read_config(path: &Path) -> anyhow::Result<NotevaultConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &NotevaultConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

/// Resolve the config file path, checking NOTEVAULT_CONFIG first.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("NOTEVAULT_CONFIG") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Load the config, falling back to defaults when no file exists.
pub fn load_config() -> anyhow::Result<NotevaultConfig> {
    let path = resolve_config_path()?;
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file; using defaults");
        return Ok(NotevaultConfig::default());
    }
    let config = read_config(&path)?;
    config.validate()?;
    Ok(config)
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("notevault"));
        }
    }
    Ok(home_dir()?.join(".config").join("notevault"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("notevault"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("notevault"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

/// Expand a leading `~/` against HOME.
pub fn expand_home(path: &str) -> anyhow::Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => Ok(home_dir()?.join(rest)),
        None => Ok(PathBuf::from(path)),
    }
}
