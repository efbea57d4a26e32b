//! Key Vault secret client
//!
//! [`VaultClient`] is the fetch capability the resolver depends on.
//! [`KeyVaultClient`] implements it over the Key Vault REST API:
//!
//! ```text
//! GET {endpoint}/secrets/{name}?api-version=7.4
//! Authorization: Bearer <token>
//! ```
//!
//! A missing secret (404) is not an error. Failing to connect to the vault
//! at all (DNS failure, refused connection, no handshake within the connect
//! timeout) is reported as [`VaultError::Unreachable`], which the resolver
//! absorbs; every other failure is fatal.

use super::credential::TokenSource;
use crate::config::{secret_string, SecretString};
use crate::domain::VaultError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// A client bound to a single vault
#[async_trait]
pub trait VaultClient: Send + Sync {
    /// Name of the vault this client talks to
    fn vault_name(&self) -> &str;

    /// Fetch the current value of a secret
    ///
    /// Returns `Ok(None)` when the vault is reachable but holds no value
    /// under `secret_name`.
    async fn get_secret(&self, secret_name: &str) -> Result<Option<SecretString>, VaultError>;
}

/// Subset of the Key Vault `SecretBundle` response
#[derive(Debug, Deserialize)]
struct SecretBundle {
    value: Option<String>,
}

/// Key Vault client over the REST API
///
/// Construction is local; no request is made until [`VaultClient::get_secret`].
pub struct KeyVaultClient {
    vault_name: String,
    endpoint: Url,
    api_version: String,
    scope: String,
    http_client: Client,
    tokens: Arc<dyn TokenSource>,
}

impl KeyVaultClient {
    /// Create a client for `vault_name` at `endpoint`
    ///
    /// # Arguments
    ///
    /// * `vault_name` - Vault name, used in logs and errors
    /// * `endpoint` - Vault base URL, e.g. `https://myvault.vault.azure.net`
    /// * `api_version` - Key Vault REST API version
    /// * `scope` - OAuth scope requested from the token source
    /// * `http_client` - Shared HTTP client
    /// * `tokens` - Bearer token source
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidVaultName`] if `endpoint` is not a valid
    /// base URL.
    pub fn new(
        vault_name: impl Into<String>,
        endpoint: &str,
        api_version: impl Into<String>,
        scope: impl Into<String>,
        http_client: Client,
        tokens: Arc<dyn TokenSource>,
    ) -> Result<Self, VaultError> {
        let vault_name = vault_name.into();
        let endpoint = Url::parse(endpoint).map_err(|e| VaultError::InvalidVaultName {
            vault: vault_name.clone(),
            message: format!("invalid endpoint '{endpoint}': {e}"),
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(VaultError::InvalidVaultName {
                vault: vault_name,
                message: format!("endpoint '{endpoint}' cannot be a base URL"),
            });
        }

        Ok(Self {
            vault_name,
            endpoint,
            api_version: api_version.into(),
            scope: scope.into(),
            http_client,
            tokens,
        })
    }

    /// Base URL of the vault
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn secret_url(&self, secret_name: &str) -> Result<Url, VaultError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| VaultError::InvalidVaultName {
                vault: self.vault_name.clone(),
                message: format!("endpoint '{}' cannot be a base URL", self.endpoint),
            })?
            .pop_if_empty()
            .push("secrets")
            .push(secret_name);
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        Ok(url)
    }

    fn classify_send_error(&self, err: reqwest::Error) -> VaultError {
        if err.is_connect() {
            VaultError::Unreachable {
                vault: self.vault_name.clone(),
                message: err.to_string(),
            }
        } else {
            VaultError::Transport {
                vault: self.vault_name.clone(),
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl VaultClient for KeyVaultClient {
    fn vault_name(&self) -> &str {
        &self.vault_name
    }

    async fn get_secret(&self, secret_name: &str) -> Result<Option<SecretString>, VaultError> {
        // An empty name would address the secret listing endpoint
        if secret_name.is_empty() {
            return Ok(None);
        }

        let url = self.secret_url(secret_name)?;
        let token = self.tokens.token(&self.scope).await?;

        debug!(vault = %self.vault_name, secret = %secret_name, "Fetching secret");

        let response = self
            .http_client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| self.classify_send_error(e))?;

        match response.status() {
            StatusCode::OK => {
                let bundle: SecretBundle =
                    response
                        .json()
                        .await
                        .map_err(|e| VaultError::InvalidResponse {
                            vault: self.vault_name.clone(),
                            message: e.to_string(),
                        })?;
                Ok(bundle.value.map(secret_string))
            }
            StatusCode::NOT_FOUND => {
                debug!(vault = %self.vault_name, secret = %secret_name, "Secret not found");
                Ok(None)
            }
            status @ (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                let body = response.text().await.unwrap_or_default();
                Err(VaultError::Authorization {
                    vault: self.vault_name.clone(),
                    status: status.as_u16(),
                    message: body,
                })
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(VaultError::RequestFailed {
                    vault: self.vault_name.clone(),
                    status: status.as_u16(),
                    message: body,
                })
            }
        }
    }
}
