//! Mutable string key-value stores
//!
//! [`EnvStore`] abstracts "a mapping from key to string value, mutable in
//! place". [`ProcessEnv`] binds it to the real process environment and is
//! meant for the application boundary only; [`MemoryEnv`] is an isolated map
//! for tests and embedding.

use std::collections::BTreeMap;

/// A mutable mapping from variable name to string value
pub trait EnvStore {
    /// Snapshot of the current variable names
    fn keys(&self) -> Vec<String>;

    /// Current value of `key`, if set and valid UTF-8
    fn get(&self, key: &str) -> Option<String>;

    /// Set `key` to `value`, overwriting any existing value
    fn set(&mut self, key: &str, value: &str);
}

/// The process environment
///
/// Variables whose name or value is not valid UTF-8 are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvStore for ProcessEnv {
    fn keys(&self) -> Vec<String> {
        std::env::vars_os()
            .filter_map(|(key, _)| key.into_string().ok())
            .collect()
    }

    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn set(&mut self, key: &str, value: &str) {
        std::env::set_var(key, value);
    }
}

/// An in-memory environment
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryEnv {
    vars: BTreeMap<String, String>,
}

impl MemoryEnv {
    /// Create an empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of variables
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether no variables are set
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterate over variables in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl EnvStore for MemoryEnv {
    fn keys(&self) -> Vec<String> {
        self.vars.keys().cloned().collect()
    }

    fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
    }
}

impl<K, V> FromIterator<(K, V)> for MemoryEnv
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
