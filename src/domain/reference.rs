//! Vault reference grammar
//!
//! A reference is a configuration value of the exact form
//!
//! ```text
//! @Provider.KeyVault(VaultName=<vault>;SecretName=<secret>)
//! ```
//!
//! The whole value must match. Anything else, including a reference with
//! surrounding text, is treated as a plain value.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

/// Prefix every reference starts with
pub const REFERENCE_PREFIX: &str = "@Provider.KeyVault(";

const REFERENCE_PATTERN: &str = r"^@Provider\.KeyVault\(VaultName=(.*?);SecretName=(.*)\)$";

fn reference_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(REFERENCE_PATTERN).expect("reference pattern is valid"))
}

/// A parsed vault reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Reference {
    /// Name of the vault holding the secret
    pub vault_name: String,

    /// Name of the secret within the vault
    pub secret_name: String,
}

impl Reference {
    /// Create a new reference
    pub fn new(vault_name: impl Into<String>, secret_name: impl Into<String>) -> Self {
        Self {
            vault_name: vault_name.into(),
            secret_name: secret_name.into(),
        }
    }

    /// Parse a configuration value into a reference
    ///
    /// Returns `None` when the value is not a complete reference.
    ///
    /// # Example
    ///
    /// ```
    /// use vaultref::domain::Reference;
    ///
    /// let reference = Reference::parse("@Provider.KeyVault(VaultName=VaultA;SecretName=SecretA)")
    ///     .unwrap();
    /// assert_eq!(reference.vault_name, "VaultA");
    /// assert_eq!(reference.secret_name, "SecretA");
    ///
    /// assert!(Reference::parse("plain-value").is_none());
    /// ```
    pub fn parse(value: &str) -> Option<Self> {
        // Cheap reject for the common case of a plain value
        if !value.starts_with(REFERENCE_PREFIX) {
            return None;
        }

        let captures = reference_regex().captures(value)?;
        Some(Self::new(&captures[1], &captures[2]))
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}VaultName={};SecretName={})",
            REFERENCE_PREFIX, self.vault_name, self.secret_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("@Provider.KeyVault(VaultName=VaultA;SecretName=SecretA)", "VaultA", "SecretA" ; "simple")]
    #[test_case("@Provider.KeyVault(VaultName=my-vault;SecretName=db-password)", "my-vault", "db-password" ; "hyphenated names")]
    #[test_case("@Provider.KeyVault(VaultName=V;SecretName=a;SecretName=b)", "V", "a;SecretName=b" ; "vault capture is non-greedy")]
    #[test_case("@Provider.KeyVault(VaultName=V;SecretName=s(1))", "V", "s(1)" ; "secret runs to final paren")]
    #[test_case("@Provider.KeyVault(VaultName=;SecretName=)", "", "" ; "empty captures")]
    fn test_parse_matches(value: &str, vault: &str, secret: &str) {
        let reference = Reference::parse(value).expect("should match");
        assert_eq!(reference.vault_name, vault);
        assert_eq!(reference.secret_name, secret);
    }

    #[test_case("do_not_replace" ; "plain value")]
    #[test_case("" ; "empty")]
    #[test_case("@Provider.KeyVault(VaultName=VaultA;SecretName=SecretA" ; "missing closing paren")]
    #[test_case("@Provider.KeyVault(VaultName=VaultA)" ; "missing secret name")]
    #[test_case("@Provider.KeyVault(SecretName=SecretA;VaultName=VaultA)" ; "swapped order")]
    #[test_case(" @Provider.KeyVault(VaultName=VaultA;SecretName=SecretA)" ; "leading text")]
    #[test_case("@Provider.KeyVault(VaultName=VaultA;SecretName=SecretA) " ; "trailing text")]
    #[test_case("@Provider.KeyVault(VaultName=VaultA;SecretName=SecretA)\n" ; "trailing newline")]
    #[test_case("@Provider.KeyVault(VaultName=Vault\nA;SecretName=SecretA)" ; "newline in vault")]
    #[test_case("@provider.keyvault(VaultName=VaultA;SecretName=SecretA)" ; "case sensitive marker")]
    #[test_case("@ProviderXKeyVault(VaultName=VaultA;SecretName=SecretA)" ; "dot is literal")]
    fn test_parse_rejects(value: &str) {
        assert_eq!(Reference::parse(value), None);
    }

    #[test]
    fn test_display_uses_wire_format() {
        let reference = Reference::new("VaultA", "SecretA");
        assert_eq!(
            reference.to_string(),
            "@Provider.KeyVault(VaultName=VaultA;SecretName=SecretA)"
        );
    }

    #[test]
    fn test_format_then_parse_returns_same_names() {
        let pairs = [
            ("VaultA", "SecretA"),
            ("prod-kv-01", "ConnectionStrings--Default"),
            ("v", "name with spaces"),
            ("", "only-secret"),
        ];

        for (vault, secret) in pairs {
            let formatted = Reference::new(vault, secret).to_string();
            assert_eq!(
                Reference::parse(&formatted),
                Some(Reference::new(vault, secret)),
                "{formatted}"
            );
        }
    }
}
