//! Vault client construction
//!
//! The resolver never builds clients directly; it asks a
//! [`VaultClientFactory`]. This keeps construction counting and in-memory
//! vaults possible in tests.

use super::client::{KeyVaultClient, VaultClient};
use super::credential::{DefaultTokenSource, TokenSource};
use crate::config::{ResolverConfig, VaultConfig};
use crate::domain::{Result, VaultError, VaultRefError};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Builds vault clients by vault name
///
/// Implementations must not perform network I/O in [`create`](Self::create).
pub trait VaultClientFactory: Send + Sync {
    /// Construct a client for `vault_name`
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidVaultName`] if the name cannot form an
    /// endpoint.
    fn create(&self, vault_name: &str) -> std::result::Result<Arc<dyn VaultClient>, VaultError>;
}

/// Factory for [`KeyVaultClient`]s
///
/// All clients share one HTTP client and one token source.
pub struct KeyVaultClientFactory {
    domain: String,
    api_version: String,
    http_client: Client,
    tokens: Arc<dyn TokenSource>,
}

impl KeyVaultClientFactory {
    /// Create a factory with an explicit token source
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &VaultConfig, tokens: Arc<dyn TokenSource>) -> Result<Self> {
        Ok(Self {
            domain: config.domain.clone(),
            api_version: config.api_version.clone(),
            http_client: http_client(config)?,
            tokens,
        })
    }

    /// Create a factory using the default credential for `config`
    ///
    /// The credential itself is built lazily on the first secret fetch.
    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        let tokens = Arc::new(DefaultTokenSource::new(config.credential.clone()));
        Self::new(&config.vault, tokens)
    }

    /// Endpoint for `vault_name`: `https://<vault_name>.<domain>`
    pub fn endpoint_for(&self, vault_name: &str) -> String {
        format!("https://{}.{}", vault_name, self.domain)
    }

    fn scope(&self) -> String {
        format!("https://{}/.default", self.domain)
    }
}

impl VaultClientFactory for KeyVaultClientFactory {
    fn create(&self, vault_name: &str) -> std::result::Result<Arc<dyn VaultClient>, VaultError> {
        validate_vault_name(vault_name)?;

        let client = KeyVaultClient::new(
            vault_name,
            &self.endpoint_for(vault_name),
            self.api_version.clone(),
            self.scope(),
            self.http_client.clone(),
            Arc::clone(&self.tokens),
        )?;

        Ok(Arc::new(client))
    }
}

/// HTTP client shared by all vault clients of a factory
///
/// The connect timeout is shorter than the request timeout, so a vault that
/// never completes the handshake fails with a connect error and is reported
/// as unreachable.
pub(crate) fn http_client(config: &VaultConfig) -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .timeout(Duration::from_secs(config.request_timeout_seconds))
        .build()
        .map_err(|e| VaultRefError::Configuration(format!("Failed to create HTTP client: {e}")))
}

/// Vault names are DNS labels: ASCII letters, digits and hyphens
fn validate_vault_name(vault_name: &str) -> std::result::Result<(), VaultError> {
    if vault_name.is_empty() {
        return Err(VaultError::InvalidVaultName {
            vault: vault_name.to_string(),
            message: "vault name is empty".to_string(),
        });
    }

    if let Some(c) = vault_name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-'))
    {
        return Err(VaultError::InvalidVaultName {
            vault: vault_name.to_string(),
            message: format!("invalid character '{c}'"),
        });
    }

    Ok(())
}
