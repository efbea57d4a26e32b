//! Process startup: `.env` loading, app-setting promotion, reference resolution
//!
//! [`load_environment`] runs the whole sequence against the process
//! environment and is meant to be called once, early in `main`.

pub mod appsettings;

pub use appsettings::promote_app_settings;

use crate::config::{refresh_from_env, ResolverConfig};
use crate::domain::{Result, VaultRefError};
use crate::resolve::{ProcessEnv, ResolutionSummary, SecretResolver};
use std::path::Path;
use tracing::{debug, info};

/// Prepare the process environment
///
/// 1. Loads `dotenv_path` when given; a missing file is skipped
/// 2. Re-applies environment overrides to `config`, so `VAULTREF_*` and
///    `AZURE_*` variables from the `.env` file take effect
/// 3. Promotes app settings when `app_settings.enabled`
/// 4. Builds the default credential from the resulting configuration and
///    replaces vault references in every variable
///
/// `${VAR}` placeholders in the configuration file are resolved when the file
/// is loaded, so load the `.env` file with [`load_dotenv`] before
/// [`load_config`](crate::config::load_config) if the file refers to it.
///
/// # Errors
///
/// Returns an error if the `.env` file cannot be parsed, the refreshed
/// configuration is invalid, the Key Vault client cannot be built, or
/// resolution hits a fatal vault error.
pub async fn load_environment(
    config: &ResolverConfig,
    dotenv_path: Option<&Path>,
) -> Result<ResolutionSummary> {
    if let Some(path) = dotenv_path {
        load_dotenv(path)?;
    }

    let config = refresh_from_env(config)?;
    prepare_environment(&config, None)?;

    // Promoted settings may carry credential variables
    let config = refresh_from_env(&config)?;
    let resolver = SecretResolver::from_config(&config)?;
    resolver.resolve_env(&mut ProcessEnv, None).await
}

/// [`load_environment`] with a caller-provided resolver
///
/// # Errors
///
/// See [`load_environment`].
pub async fn load_environment_with(
    resolver: &SecretResolver,
    config: &ResolverConfig,
    dotenv_path: Option<&Path>,
) -> Result<ResolutionSummary> {
    prepare_environment(config, dotenv_path)?;
    resolver.resolve_env(&mut ProcessEnv, None).await
}

/// Load the `.env` file and promote app settings, without contacting any vault
///
/// # Errors
///
/// Returns an error if the `.env` file cannot be parsed.
pub fn prepare_environment(config: &ResolverConfig, dotenv_path: Option<&Path>) -> Result<()> {
    if let Some(path) = dotenv_path {
        load_dotenv(path)?;
    }

    if config.app_settings.enabled {
        let promoted = promote_app_settings(&mut ProcessEnv, &config.app_settings.prefix);
        if !promoted.is_empty() {
            info!(count = promoted.len(), "Promoted app settings");
        }
    }

    Ok(())
}

/// Load variables from a `.env` file without overriding existing ones
///
/// A missing file is skipped.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_dotenv(path: &Path) -> Result<()> {
    match dotenvy::from_path(path) {
        Ok(()) => {
            debug!(path = %path.display(), "Loaded .env file");
            Ok(())
        }
        Err(e) if e.not_found() => {
            debug!(path = %path.display(), ".env file not found, skipping");
            Ok(())
        }
        Err(e) => Err(VaultRefError::Configuration(format!(
            "Failed to load {}: {}",
            path.display(),
            e
        ))),
    }
}
