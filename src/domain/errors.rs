//! Domain error types
//!
//! This module defines the error hierarchy for vaultref.
//! Errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main vaultref error type
///
/// This is the primary error type used throughout the library.
#[derive(Debug, Error)]
pub enum VaultRefError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Vault-related errors
    #[error("Vault error: {0}")]
    Vault(#[from] VaultError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Vault-specific errors
///
/// Only the unreachable category (see [`VaultError::is_unreachable`]) is
/// absorbed during resolution. Everything else aborts the resolution pass.
#[derive(Debug, Error)]
pub enum VaultError {
    /// The vault endpoint could not be contacted
    #[error("Vault '{vault}' is unreachable: {message}")]
    Unreachable { vault: String, message: String },

    /// The vault name does not form a valid endpoint URL
    #[error("Invalid vault name '{vault}': {message}")]
    InvalidVaultName { vault: String, message: String },

    /// Credential construction or token acquisition failed
    #[error("Credential error: {0}")]
    Credential(String),

    /// The vault rejected the request (401/403)
    #[error("Access to vault '{vault}' denied: {status} - {message}")]
    Authorization {
        vault: String,
        status: u16,
        message: String,
    },

    /// The vault returned an unexpected status
    #[error("Request to vault '{vault}' failed: {status} - {message}")]
    RequestFailed {
        vault: String,
        status: u16,
        message: String,
    },

    /// Transport failure after the vault was contacted
    #[error("Transport error talking to vault '{vault}': {message}")]
    Transport { vault: String, message: String },

    /// The vault response could not be decoded
    #[error("Invalid response from vault '{vault}': {message}")]
    InvalidResponse { vault: String, message: String },
}

impl VaultError {
    /// Whether this error means the vault itself could not be reached
    ///
    /// A vault name that cannot even form an endpoint is treated the same way:
    /// a malformed reference never aborts resolution.
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            VaultError::Unreachable { .. } | VaultError::InvalidVaultName { .. }
        )
    }

    /// Vault name the error relates to, if any
    pub fn vault(&self) -> Option<&str> {
        match self {
            VaultError::Unreachable { vault, .. }
            | VaultError::InvalidVaultName { vault, .. }
            | VaultError::Authorization { vault, .. }
            | VaultError::RequestFailed { vault, .. }
            | VaultError::Transport { vault, .. }
            | VaultError::InvalidResponse { vault, .. } => Some(vault),
            VaultError::Credential(_) => None,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for VaultRefError {
    fn from(err: std::io::Error) -> Self {
        VaultRefError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for VaultRefError {
    fn from(err: serde_json::Error) -> Self {
        VaultRefError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for VaultRefError {
    fn from(err: toml::de::Error) -> Self {
        VaultRefError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vaultref_error_display() {
        let err = VaultRefError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_vault_error_conversion() {
        let vault_err = VaultError::Credential("no token".to_string());
        let err: VaultRefError = vault_err.into();
        assert!(matches!(err, VaultRefError::Vault(_)));
    }

    #[test]
    fn test_unreachable_classification() {
        let unreachable = VaultError::Unreachable {
            vault: "VaultC".to_string(),
            message: "dns error".to_string(),
        };
        let invalid = VaultError::InvalidVaultName {
            vault: "bad vault".to_string(),
            message: "invalid domain character".to_string(),
        };
        let denied = VaultError::Authorization {
            vault: "VaultA".to_string(),
            status: 403,
            message: "Forbidden".to_string(),
        };

        assert!(unreachable.is_unreachable());
        assert!(invalid.is_unreachable());
        assert!(!denied.is_unreachable());
        assert!(!VaultError::Credential("expired".to_string()).is_unreachable());
    }

    #[test]
    fn test_vault_name_accessor() {
        let err = VaultError::RequestFailed {
            vault: "VaultA".to_string(),
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.vault(), Some("VaultA"));
        assert_eq!(VaultError::Credential("x".to_string()).vault(), None);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: VaultRefError = io_err.into();
        assert!(matches!(err, VaultRefError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: VaultRefError = json_err.into();
        assert!(matches!(err, VaultRefError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: VaultRefError = toml_err.into();
        assert!(matches!(err, VaultRefError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }
}
