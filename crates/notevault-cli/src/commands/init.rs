use std::path::PathBuf;

use crate::cli::{Cli, InitArgs};
use crate::config::{
    default_keyfile_path, default_storage_path, expand_home, resolve_config_path, write_config,
    NotevaultConfig, SecretBackend,
};
use crate::errors::CliError;

pub fn handle_init(cli: &Cli, args: &InitArgs) -> anyhow::Result<()> {
    let config_path = resolve_config_path()?;
    if config_path.exists() && !args.force {
        return Err(CliError::invalid_input(format!(
            "Config already exists at {} (use --force to overwrite)",
            config_path.display()
        ))
        .into());
    }

    let backend = match args.backend.as_deref() {
        Some(value) => value
            .parse::<SecretBackend>()
            .map_err(|e| CliError::invalid_input(e.to_string()))?,
        None => SecretBackend::default(),
    };

    let keyfile_path = match (backend, args.keyfile_path.as_deref()) {
        (SecretBackend::Keyfile, Some(path)) => Some(expand_home(path)?),
        (SecretBackend::Keyfile, None) => Some(default_keyfile_path()?),
        (SecretBackend::Keychain, Some(_)) => {
            return Err(CliError::invalid_input(
                "--keyfile-path only applies to the keyfile backend",
            )
            .into())
        }
        (SecretBackend::Keychain, None) => None,
    };

    let storage_path: PathBuf = match cli.db.as_deref() {
        Some(path) => expand_home(path)?,
        None => default_storage_path()?,
    };

    let config = NotevaultConfig::new(storage_path.clone(), backend, keyfile_path);
    config.validate()?;
    write_config(&config_path, &config)?;
    tracing::debug!(path = %config_path.display(), "Config written");

    if !cli.quiet {
        println!("status=ok");
        println!("config={}", config_path.display());
        println!("storage={}", storage_path.display());
    }
    Ok(())
}
