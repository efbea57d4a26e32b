//! Per-vault client cache

use super::client::VaultClient;
use super::factory::VaultClientFactory;
use crate::domain::VaultError;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Maps vault names to constructed clients
///
/// Holds at most one client per vault name. A cache is owned by the caller
/// and borrowed mutably for the length of a resolution pass, so one cache
/// cannot be shared by two concurrent passes.
#[derive(Default)]
pub struct ClientCache {
    clients: HashMap<String, Arc<dyn VaultClient>>,
}

impl ClientCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached clients
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Whether a client for `vault_name` is cached
    pub fn contains(&self, vault_name: &str) -> bool {
        self.clients.contains_key(vault_name)
    }

    /// Cached client for `vault_name`, if any
    pub fn get(&self, vault_name: &str) -> Option<Arc<dyn VaultClient>> {
        self.clients.get(vault_name).cloned()
    }

    /// Seed the cache with a prebuilt client, replacing any existing one
    pub fn insert(&mut self, vault_name: impl Into<String>, client: Arc<dyn VaultClient>) {
        self.clients.insert(vault_name.into(), client);
    }

    /// Cached client for `vault_name`, constructing and storing it if absent
    pub fn get_or_create(
        &mut self,
        vault_name: &str,
        factory: &dyn VaultClientFactory,
    ) -> Result<Arc<dyn VaultClient>, VaultError> {
        if let Some(client) = self.clients.get(vault_name) {
            return Ok(Arc::clone(client));
        }

        let client = factory.create(vault_name)?;
        self.clients
            .insert(vault_name.to_string(), Arc::clone(&client));
        Ok(client)
    }
}

impl fmt::Debug for ClientCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut vaults: Vec<&String> = self.clients.keys().collect();
        vaults.sort();
        f.debug_struct("ClientCache").field("vaults", &vaults).finish()
    }
}

/// Client for `vault_name`, through `cache` when one is supplied
///
/// Without a cache every call constructs a new client.
pub fn client_for(
    vault_name: &str,
    cache: Option<&mut ClientCache>,
    factory: &dyn VaultClientFactory,
) -> Result<Arc<dyn VaultClient>, VaultError> {
    match cache {
        Some(cache) => cache.get_or_create(vault_name, factory),
        None => factory.create(vault_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecretString;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NamedClient(String);

    #[async_trait]
    impl VaultClient for NamedClient {
        fn vault_name(&self) -> &str {
            &self.0
        }

        async fn get_secret(&self, _name: &str) -> Result<Option<SecretString>, VaultError> {
            Ok(None)
        }
    }

    #[derive(Default)]
    struct CountingFactory {
        created: AtomicUsize,
    }

    impl VaultClientFactory for CountingFactory {
        fn create(&self, vault_name: &str) -> Result<Arc<dyn VaultClient>, VaultError> {
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(NamedClient(vault_name.to_string())))
        }
    }

    #[test]
    fn test_get_or_create_constructs_once_per_vault() {
        let factory = CountingFactory::default();
        let mut cache = ClientCache::new();

        let first = cache.get_or_create("VaultA", &factory).unwrap();
        let second = cache.get_or_create("VaultA", &factory).unwrap();
        cache.get_or_create("VaultB", &factory).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(factory.created.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_seeded_client_is_returned_unchanged() {
        let factory = CountingFactory::default();
        let mut cache = ClientCache::new();
        let seeded: Arc<dyn VaultClient> = Arc::new(NamedClient("seeded".to_string()));
        cache.insert("VaultA", Arc::clone(&seeded));

        let client = client_for("VaultA", Some(&mut cache), &factory).unwrap();

        assert!(Arc::ptr_eq(&client, &seeded));
        assert_eq!(factory.created.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_without_cache_constructs_every_time() {
        let factory = CountingFactory::default();

        client_for("VaultA", None, &factory).unwrap();
        client_for("VaultA", None, &factory).unwrap();

        assert_eq!(factory.created.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failed_construction_is_not_cached() {
        struct Rejecting;
        impl VaultClientFactory for Rejecting {
            fn create(&self, vault_name: &str) -> Result<Arc<dyn VaultClient>, VaultError> {
                Err(VaultError::InvalidVaultName {
                    vault: vault_name.to_string(),
                    message: "nope".to_string(),
                })
            }
        }

        let mut cache = ClientCache::new();
        assert!(cache.get_or_create("bad", &Rejecting).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_debug_lists_vault_names_only() {
        let factory = CountingFactory::default();
        let mut cache = ClientCache::new();
        cache.get_or_create("VaultB", &factory).unwrap();
        cache.get_or_create("VaultA", &factory).unwrap();

        assert_eq!(
            format!("{cache:?}"),
            r#"ClientCache { vaults: ["VaultA", "VaultB"] }"#
        );
    }
}
