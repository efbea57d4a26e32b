//! Azure Key Vault access
//!
//! - [`client`] - The [`VaultClient`] fetch capability and its REST implementation
//! - [`factory`] - Construction of clients from a vault name
//! - [`cache`] - Per-vault client reuse across a resolution pass
//! - [`credential`] - Bearer tokens from `azure_identity` credentials and the default chain
//!
//! # Example
//!
//! ```no_run
//! use vaultref::config::ResolverConfig;
//! use vaultref::vault::{ClientCache, KeyVaultClientFactory, VaultClient};
//!
//! # async fn example() -> vaultref::domain::Result<()> {
//! let factory = KeyVaultClientFactory::from_config(&ResolverConfig::default())?;
//! let mut cache = ClientCache::new();
//!
//! let client = cache.get_or_create("my-vault", &factory)?;
//! let secret = client.get_secret("db-password").await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod credential;
pub mod factory;

pub use cache::{client_for, ClientCache};
pub use client::{KeyVaultClient, VaultClient};
pub use credential::{AzureTokenSource, ChainedTokenSource, DefaultTokenSource, TokenSource};
pub use factory::{KeyVaultClientFactory, VaultClientFactory};
