//! Secret reference resolution
//!
//! [`SecretResolver`] replaces vault references with the secrets they name.
//! Each value resolves to exactly one [`Resolution`]:
//!
//! - not a reference: left untouched
//! - secret absent from a reachable vault: left untouched, no warning
//! - vault unreachable: left untouched, warning naming the vault
//! - secret found: replaced
//!
//! Any other vault failure (credentials, authorization, unexpected responses)
//! aborts the pass with an error.

use super::env::EnvStore;
use super::settings::Settings;
use crate::config::{ResolverConfig, SecretString};
use crate::domain::{Reference, Result};
use crate::vault::{
    client_for, ClientCache, KeyVaultClientFactory, VaultClient, VaultClientFactory,
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Outcome of resolving a single value
#[derive(Debug)]
pub enum Resolution {
    /// The value was a reference and the secret was fetched
    Replaced(SecretString),

    /// The value is not a reference
    NoMatch,

    /// The vault holds no value for the referenced secret
    SecretAbsent(Reference),

    /// The referenced vault could not be contacted
    VaultUnreachable(Reference),
}

impl Resolution {
    /// The fetched secret, if the value was replaced
    pub fn into_secret(self) -> Option<SecretString> {
        match self {
            Resolution::Replaced(secret) => Some(secret),
            _ => None,
        }
    }
}

/// A key left unresolved because its vault was unreachable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreachableEntry {
    /// Variable or field name
    pub key: String,

    /// Vault that could not be contacted
    pub vault: String,
}

/// What a resolution pass over an [`EnvStore`] changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionSummary {
    /// Keys whose value was replaced by a secret
    pub replaced: Vec<String>,

    /// Keys referencing a secret that does not exist
    pub secret_absent: Vec<String>,

    /// Keys referencing a vault that could not be contacted
    pub unreachable: Vec<UnreachableEntry>,
}

impl ResolutionSummary {
    /// Distinct unreachable vault names, sorted
    pub fn unreachable_vaults(&self) -> Vec<&str> {
        let mut vaults: Vec<&str> = self.unreachable.iter().map(|e| e.vault.as_str()).collect();
        vaults.sort_unstable();
        vaults.dedup();
        vaults
    }

    fn sort(&mut self) {
        self.replaced.sort();
        self.secret_absent.sort();
        self.unreachable.sort_by(|a, b| a.key.cmp(&b.key));
    }
}

/// Resolves vault references using clients from a [`VaultClientFactory`]
///
/// # Example
///
/// ```no_run
/// use vaultref::config::ResolverConfig;
/// use vaultref::resolve::{MemoryEnv, SecretResolver};
///
/// # async fn example() -> vaultref::domain::Result<()> {
/// let resolver = SecretResolver::from_config(&ResolverConfig::default())?;
///
/// let mut env: MemoryEnv = [(
///     "DB_PASSWORD",
///     "@Provider.KeyVault(VaultName=my-vault;SecretName=db-password)",
/// )]
/// .into_iter()
/// .collect();
///
/// let summary = resolver.resolve_env(&mut env, None).await?;
/// println!("Replaced: {:?}", summary.replaced);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SecretResolver {
    factory: Arc<dyn VaultClientFactory>,
}

impl SecretResolver {
    /// Create a resolver over `factory`
    pub fn new(factory: Arc<dyn VaultClientFactory>) -> Self {
        Self { factory }
    }

    /// Create a resolver talking to Azure Key Vault with the default credential
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(KeyVaultClientFactory::from_config(config)?)))
    }

    /// Resolve a single value, reporting which outcome applied
    ///
    /// # Errors
    ///
    /// Returns an error for any vault failure other than an unreachable vault.
    pub async fn resolve(&self, value: &str, cache: Option<&mut ClientCache>) -> Result<Resolution> {
        let Some(reference) = Reference::parse(value) else {
            return Ok(Resolution::NoMatch);
        };

        let fetched = match client_for(&reference.vault_name, cache, &*self.factory) {
            Ok(client) => client.get_secret(&reference.secret_name).await,
            Err(e) => Err(e),
        };

        match fetched {
            Ok(Some(secret)) => Ok(Resolution::Replaced(secret)),
            Ok(None) => {
                debug!(
                    vault = %reference.vault_name,
                    secret = %reference.secret_name,
                    "Secret not found, leaving value unchanged"
                );
                Ok(Resolution::SecretAbsent(reference))
            }
            Err(e) if e.is_unreachable() => {
                crate::log_vault_unreachable!(reference.vault_name, e);
                Ok(Resolution::VaultUnreachable(reference))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve a single value
    ///
    /// Returns `None` when the value should be kept as is: it is not a
    /// reference, the secret is absent, or the vault is unreachable.
    ///
    /// # Errors
    ///
    /// Returns an error for any vault failure other than an unreachable vault.
    pub async fn resolve_one(
        &self,
        value: &str,
        cache: Option<&mut ClientCache>,
    ) -> Result<Option<SecretString>> {
        Ok(self.resolve(value, cache).await?.into_secret())
    }

    /// Replace references in every variable of `env`
    ///
    /// Keys are snapshotted before any value changes. Without a `cache`, a
    /// fresh cache is used for this pass.
    ///
    /// # Errors
    ///
    /// Returns the first fatal vault error; variables replaced before it keep
    /// their new values.
    pub async fn resolve_env<E>(
        &self,
        env: &mut E,
        cache: Option<&mut ClientCache>,
    ) -> Result<ResolutionSummary>
    where
        E: EnvStore + ?Sized,
    {
        let mut pass_cache = ClientCache::new();
        let cache = match cache {
            Some(cache) => cache,
            None => &mut pass_cache,
        };

        let mut summary = ResolutionSummary::default();
        for key in env.keys() {
            let Some(value) = env.get(&key) else {
                continue;
            };

            let resolution = match self.resolve(&value, Some(&mut *cache)).await {
                Ok(resolution) => resolution,
                Err(e) => {
                    error!(key = %key, error = %e, "Failed to resolve vault reference");
                    return Err(e);
                }
            };

            match resolution {
                Resolution::Replaced(secret) => {
                    env.set(&key, secret.expose_secret().as_ref());
                    summary.replaced.push(key);
                }
                Resolution::NoMatch => {}
                Resolution::SecretAbsent(_) => summary.secret_absent.push(key),
                Resolution::VaultUnreachable(reference) => {
                    summary.unreachable.push(UnreachableEntry {
                        key,
                        vault: reference.vault_name,
                    });
                }
            }
        }
        summary.sort();

        info!(
            replaced = summary.replaced.len(),
            secret_absent = summary.secret_absent.len(),
            unreachable = summary.unreachable.len(),
            "Resolved vault references in environment"
        );
        debug!(keys = ?summary.replaced, "Replaced environment variables");

        Ok(summary)
    }

    /// Replace references in the string fields of `settings`
    ///
    /// Returns the same object for chaining. Use
    /// [`resolve_settings_in_place`](Self::resolve_settings_in_place) to get
    /// the replaced field names.
    ///
    /// # Errors
    ///
    /// Returns an error for any vault failure other than an unreachable vault.
    pub async fn resolve_settings<S>(&self, mut settings: S, cache: Option<&mut ClientCache>) -> Result<S>
    where
        S: Settings,
    {
        self.resolve_settings_in_place(&mut settings, cache).await?;
        Ok(settings)
    }

    /// Replace references in the string fields of `settings`, returning the
    /// names of the fields that were replaced
    ///
    /// # Errors
    ///
    /// Returns an error for any vault failure other than an unreachable vault.
    pub async fn resolve_settings_in_place<S>(
        &self,
        settings: &mut S,
        cache: Option<&mut ClientCache>,
    ) -> Result<Vec<&'static str>>
    where
        S: Settings + ?Sized,
    {
        let mut pass_cache = ClientCache::new();
        let cache = match cache {
            Some(cache) => cache,
            None => &mut pass_cache,
        };

        let mut replaced = Vec::new();
        for field in settings.fields_mut() {
            let secret = self
                .resolve_one(field.value.as_str(), Some(&mut *cache))
                .await?;
            if let Some(secret) = secret {
                *field.value = secret.expose_secret().to_string();
                replaced.push(field.name);
            }
        }

        crate::log_settings_resolved!(std::any::type_name::<S>(), replaced);
        Ok(replaced)
    }
}
