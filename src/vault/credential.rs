//! Bearer tokens for Key Vault requests
//!
//! [`TokenSource`] is the seam between the HTTP client and Azure AD. The
//! production implementation wraps an `azure_identity` credential; the default
//! credential chain is only constructed when the first token is requested, so
//! building a resolver has no side effects.

use crate::config::CredentialConfig;
use crate::domain::VaultError;
use async_trait::async_trait;
use azure_core::credentials::{Secret, TokenCredential};
use azure_identity::{
    ClientSecretCredential, DeveloperToolsCredential, ManagedIdentityCredential,
    ManagedIdentityCredentialOptions, UserAssignedId,
};
use secrecy::ExposeSecret;
use std::sync::{Arc, OnceLock};
use tokio::sync::OnceCell;
use tracing::debug;

/// Source of OAuth bearer tokens
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Acquire an access token for `scope`
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Credential`] if no token can be acquired.
    async fn token(&self, scope: &str) -> Result<String, VaultError>;
}

/// Token source backed by an Azure credential
pub struct AzureTokenSource {
    credential: Arc<dyn TokenCredential>,
}

impl AzureTokenSource {
    /// Wrap an existing Azure credential
    pub fn new(credential: Arc<dyn TokenCredential>) -> Self {
        Self { credential }
    }
}

#[async_trait]
impl TokenSource for AzureTokenSource {
    async fn token(&self, scope: &str) -> Result<String, VaultError> {
        let token = TokenCredential::get_token(&*self.credential, &[scope], None)
            .await
            .map_err(|e| VaultError::Credential(e.to_string()))?;

        Ok(token.token.secret().to_string())
    }
}

/// Token sources tried in order until one produces a token
///
/// The first source that succeeds is remembered and used alone from then on.
pub struct ChainedTokenSource {
    sources: Vec<(&'static str, Arc<dyn TokenSource>)>,
    selected: OnceLock<usize>,
}

impl ChainedTokenSource {
    /// Create a chain from named sources
    pub fn new(sources: Vec<(&'static str, Arc<dyn TokenSource>)>) -> Self {
        Self {
            sources,
            selected: OnceLock::new(),
        }
    }

    /// Source names in the order they are tried
    pub fn names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|(name, _)| *name).collect()
    }

    /// Name of the source that produced the first token, if any
    pub fn selected(&self) -> Option<&'static str> {
        self.selected.get().map(|&i| self.sources[i].0)
    }
}

#[async_trait]
impl TokenSource for ChainedTokenSource {
    async fn token(&self, scope: &str) -> Result<String, VaultError> {
        if let Some(&i) = self.selected.get() {
            let (name, source) = &self.sources[i];
            return source
                .token(scope)
                .await
                .map_err(|e| VaultError::Credential(format!("{name}: {}", detail(e))));
        }

        let mut failures = Vec::with_capacity(self.sources.len());
        for (i, (name, source)) in self.sources.iter().enumerate() {
            match source.token(scope).await {
                Ok(token) => {
                    debug!(credential = %name, "Selected credential");
                    let _ = self.selected.set(i);
                    return Ok(token);
                }
                Err(e) => {
                    debug!(credential = %name, error = %e, "Credential unavailable, trying next");
                    failures.push(format!("{name}: {}", detail(e)));
                }
            }
        }

        Err(VaultError::Credential(format!(
            "Failed to acquire Azure AD token from any credential: {}",
            failures.join("; ")
        )))
    }
}

fn detail(err: VaultError) -> String {
    match err {
        VaultError::Credential(message) => message,
        other => other.to_string(),
    }
}

/// Token source that builds the default credential chain on first use
///
/// See [`default_chain`] for the chain's contents.
pub struct DefaultTokenSource {
    config: CredentialConfig,
    chain: OnceCell<ChainedTokenSource>,
}

impl DefaultTokenSource {
    /// Create a token source; no credential is built yet
    pub fn new(config: CredentialConfig) -> Self {
        Self {
            config,
            chain: OnceCell::new(),
        }
    }

    /// Whether the credential chain has been constructed
    pub fn is_initialized(&self) -> bool {
        self.chain.initialized()
    }
}

#[async_trait]
impl TokenSource for DefaultTokenSource {
    async fn token(&self, scope: &str) -> Result<String, VaultError> {
        let chain = self
            .chain
            .get_or_try_init(|| async { default_chain(&self.config) })
            .await?;
        chain.token(scope).await
    }
}

/// Build the default credential chain for `config`
///
/// A complete service principal gives a chain of one
/// `ClientSecretCredential`. Otherwise the chain is
/// `ManagedIdentityCredential` (user-assigned when
/// `managed_identity_client_id` is set) followed by
/// `DeveloperToolsCredential` (Azure CLI and Azure Developer CLI sign-in).
/// A credential that cannot be constructed is left out.
///
/// # Errors
///
/// Returns [`VaultError::Credential`] if a partial service principal is
/// configured or no credential can be constructed.
pub fn default_chain(config: &CredentialConfig) -> Result<ChainedTokenSource, VaultError> {
    if config.is_configured() {
        return Ok(ChainedTokenSource::new(vec![(
            "ClientSecretCredential",
            client_secret_source(config)?,
        )]));
    }

    if config.is_partial() {
        let missing = [
            ("tenant_id", config.tenant_id.is_none()),
            ("client_id", config.client_id.is_none()),
            ("client_secret", config.client_secret.is_none()),
        ]
        .into_iter()
        .filter_map(|(field, absent)| absent.then_some(field))
        .collect::<Vec<_>>();
        return Err(VaultError::Credential(format!(
            "Incomplete service principal, missing {}",
            missing.join(", ")
        )));
    }

    let options = config
        .managed_identity_client_id
        .clone()
        .map(|client_id| ManagedIdentityCredentialOptions {
            user_assigned_id: Some(UserAssignedId::ClientId(client_id)),
            ..Default::default()
        });

    let candidates: [(&'static str, azure_core::Result<Arc<dyn TokenCredential>>); 2] = [
        (
            "ManagedIdentityCredential",
            ManagedIdentityCredential::new(options).map(|c| c as Arc<dyn TokenCredential>),
        ),
        (
            "DeveloperToolsCredential",
            DeveloperToolsCredential::new(None).map(|c| c as Arc<dyn TokenCredential>),
        ),
    ];

    let mut sources: Vec<(&'static str, Arc<dyn TokenSource>)> = Vec::new();
    for (name, credential) in candidates {
        match credential {
            Ok(credential) => {
                let source: Arc<dyn TokenSource> = Arc::new(AzureTokenSource::new(credential));
                sources.push((name, source));
            }
            Err(e) => debug!(credential = %name, error = %e, "Skipping credential"),
        }
    }

    if sources.is_empty() {
        return Err(VaultError::Credential(
            "No Azure credential could be constructed".to_string(),
        ));
    }

    debug!(
        user_assigned = config.managed_identity_client_id.is_some(),
        "Using default credential chain"
    );
    Ok(ChainedTokenSource::new(sources))
}

fn client_secret_source(config: &CredentialConfig) -> Result<Arc<dyn TokenSource>, VaultError> {
    let (Some(tenant_id), Some(client_id), Some(client_secret)) = (
        config.tenant_id.as_deref(),
        config.client_id.clone(),
        config.client_secret.as_ref(),
    ) else {
        return Err(VaultError::Credential(
            "tenant_id, client_id and client_secret are required".to_string(),
        ));
    };

    debug!(tenant_id = %tenant_id, client_id = %client_id, "Using client secret credential");

    // Convert our SecretString to Azure's Secret type
    let secret_str: String = client_secret.expose_secret().clone().into();
    let credential: Arc<dyn TokenCredential> =
        ClientSecretCredential::new(tenant_id, client_id, Secret::new(secret_str), None).map_err(
            |e| VaultError::Credential(format!("Failed to create Azure AD credential: {e}")),
        )?;

    Ok(Arc::new(AzureTokenSource::new(credential)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeSource {
        token: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn new(token: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                token,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenSource for FakeSource {
        async fn token(&self, _scope: &str) -> Result<String, VaultError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.token
                .map(str::to_string)
                .ok_or_else(|| VaultError::Credential("no endpoint available".to_string()))
        }
    }

    const SCOPE: &str = "https://vault.azure.net/.default";

    #[test]
    fn test_default_token_source_is_lazy() {
        let source = DefaultTokenSource::new(CredentialConfig::default());
        assert!(!source.is_initialized());
    }

    #[test]
    fn test_partial_service_principal_rejected() {
        let config = CredentialConfig {
            tenant_id: Some("tenant".to_string()),
            client_id: None,
            client_secret: Some(secret_string("secret".to_string())),
            managed_identity_client_id: None,
        };

        let err = default_chain(&config).err().expect("should fail");
        assert!(matches!(err, VaultError::Credential(msg) if msg.contains("client_id")));
    }

    #[test]
    fn test_service_principal_chain() {
        let config = CredentialConfig {
            tenant_id: Some("test-tenant-id".to_string()),
            client_id: Some("test-client-id".to_string()),
            client_secret: Some(secret_string("test-client-secret".to_string())),
            managed_identity_client_id: None,
        };

        let chain = default_chain(&config).unwrap();
        assert_eq!(chain.names(), vec!["ClientSecretCredential"]);
    }

    #[test]
    fn test_default_chain_falls_back_to_developer_tools() {
        let chain = default_chain(&CredentialConfig::default()).unwrap();
        assert_eq!(
            chain.names(),
            vec!["ManagedIdentityCredential", "DeveloperToolsCredential"]
        );

        let config = CredentialConfig {
            managed_identity_client_id: Some("user-assigned-client".to_string()),
            ..Default::default()
        };
        assert_eq!(default_chain(&config).unwrap().names()[0], "ManagedIdentityCredential");
    }

    #[tokio::test]
    async fn test_chain_uses_first_source_that_succeeds() {
        let first = FakeSource::new(None);
        let second = FakeSource::new(Some("cli-token"));
        let chain = ChainedTokenSource::new(vec![
            ("ManagedIdentityCredential", first.clone() as Arc<dyn TokenSource>),
            ("DeveloperToolsCredential", second.clone() as Arc<dyn TokenSource>),
        ]);

        assert_eq!(chain.token(SCOPE).await.unwrap(), "cli-token");
        assert_eq!(chain.selected(), Some("DeveloperToolsCredential"));

        // Later requests go straight to the selected source
        assert_eq!(chain.token(SCOPE).await.unwrap(), "cli-token");
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 2);
    }

    #[tokio::test]
    async fn test_chain_reports_every_failure() {
        let chain = ChainedTokenSource::new(vec![
            ("ManagedIdentityCredential", FakeSource::new(None) as Arc<dyn TokenSource>),
            ("DeveloperToolsCredential", FakeSource::new(None) as Arc<dyn TokenSource>),
        ]);

        let err = chain.token(SCOPE).await.unwrap_err();
        let VaultError::Credential(message) = err else {
            panic!("expected credential error, got {err:?}");
        };
        assert!(message.contains("ManagedIdentityCredential: no endpoint available"));
        assert!(message.contains("DeveloperToolsCredential: no endpoint available"));
        assert_eq!(chain.selected(), None);
    }

    #[tokio::test]
    async fn test_empty_chain_is_an_error() {
        let chain = ChainedTokenSource::new(Vec::new());
        assert!(matches!(
            chain.token(SCOPE).await,
            Err(VaultError::Credential(_))
        ));
    }
}
