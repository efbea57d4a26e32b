//! Configuration schema types
//!
//! Every section has defaults, so an empty TOML document is a valid
//! configuration.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};

/// Main vaultref configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ResolverConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Key Vault endpoint settings
    #[serde(default)]
    pub vault: VaultConfig,

    /// Explicit service principal credential (optional)
    #[serde(default)]
    pub credential: CredentialConfig,

    /// Web App setting promotion
    #[serde(default)]
    pub app_settings: AppSettingsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ResolverConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.vault.validate()?;
        self.credential.validate()?;
        self.app_settings.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Key Vault endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// DNS suffix appended to the vault name (`https://<vault>.<domain>`)
    #[serde(default = "default_vault_domain")]
    pub domain: String,

    /// Key Vault REST API version
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub request_timeout_seconds: u64,

    /// TCP/TLS connect timeout in seconds; a vault that does not accept the
    /// connection within it is treated as unreachable
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,
}

impl VaultConfig {
    fn validate(&self) -> Result<(), String> {
        if self.domain.is_empty() {
            return Err("vault.domain cannot be empty".to_string());
        }
        if self.domain.contains("://") || self.domain.contains('/') {
            return Err(format!(
                "vault.domain '{}' must be a bare DNS suffix such as vault.azure.net",
                self.domain
            ));
        }
        if self.api_version.is_empty() {
            return Err("vault.api_version cannot be empty".to_string());
        }
        if self.request_timeout_seconds == 0 {
            return Err("vault.request_timeout_seconds must be > 0".to_string());
        }
        if self.connect_timeout_seconds == 0 {
            return Err("vault.connect_timeout_seconds must be > 0".to_string());
        }
        if self.connect_timeout_seconds >= self.request_timeout_seconds {
            return Err(format!(
                "vault.connect_timeout_seconds ({}) must be less than vault.request_timeout_seconds ({})",
                self.connect_timeout_seconds, self.request_timeout_seconds
            ));
        }
        Ok(())
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            domain: default_vault_domain(),
            api_version: default_api_version(),
            request_timeout_seconds: default_timeout_seconds(),
            connect_timeout_seconds: default_connect_timeout_seconds(),
        }
    }
}

/// Credential selection
///
/// A service principal is used only when `tenant_id`, `client_id` and
/// `client_secret` are all set. Otherwise the default chain runs: managed
/// identity (user-assigned when `managed_identity_client_id` is set), then
/// developer tools sign-in.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CredentialConfig {
    /// Azure AD tenant ID
    #[serde(default)]
    pub tenant_id: Option<String>,

    /// Azure AD client ID (from App Registration)
    #[serde(default)]
    pub client_id: Option<String>,

    /// Azure AD client secret (from App Registration)
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub client_secret: Option<SecretString>,

    /// Client ID of a user-assigned managed identity
    #[serde(default)]
    pub managed_identity_client_id: Option<String>,
}

impl CredentialConfig {
    /// Whether a complete service principal is configured
    pub fn is_configured(&self) -> bool {
        self.tenant_id.is_some() && self.client_id.is_some() && self.client_secret.is_some()
    }

    /// Whether some but not all service principal fields are set
    pub fn is_partial(&self) -> bool {
        let set = [
            self.tenant_id.is_some(),
            self.client_id.is_some(),
            self.client_secret.is_some(),
        ];
        set.contains(&true) && set.contains(&false)
    }

    fn validate(&self) -> Result<(), String> {
        if !self.is_partial() {
            return Ok(());
        }
        if self.tenant_id.is_none() {
            return Err("credential.tenant_id is required when a credential is configured".to_string());
        }
        if self.client_id.is_none() {
            return Err("credential.client_id is required when a credential is configured".to_string());
        }
        Err("credential.client_secret is required when a credential is configured".to_string())
    }
}

/// Web App setting promotion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettingsConfig {
    /// Promote prefixed app settings before resolving references
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Prefix stripped from app setting names
    #[serde(default = "default_app_settings_prefix")]
    pub prefix: String,
}

impl AppSettingsConfig {
    fn validate(&self) -> Result<(), String> {
        if self.enabled && self.prefix.is_empty() {
            return Err("app_settings.prefix cannot be empty when enabled".to_string());
        }
        Ok(())
    }
}

impl Default for AppSettingsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            prefix: default_app_settings_prefix(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log file path
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_vault_domain() -> String {
    "vault.azure.net".to_string()
}

fn default_api_version() -> String {
    "7.4".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_connect_timeout_seconds() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_app_settings_prefix() -> String {
    "APPSETTING_".to_string()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    #[test]
    fn test_default_config_is_valid() {
        let config = ResolverConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.vault.domain, "vault.azure.net");
        assert_eq!(config.vault.api_version, "7.4");
        assert_eq!(config.app_settings.prefix, "APPSETTING_");
        assert!(!config.credential.is_configured());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: ResolverConfig = toml::from_str("").unwrap();
        assert_eq!(config.application.log_level, "info");
        assert_eq!(config.vault.request_timeout_seconds, 30);
        assert!(config.app_settings.enabled);
        assert!(!config.logging.local_enabled);
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig::default();
        assert!(config.validate().is_ok());

        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_vault_config_validation() {
        let mut config = VaultConfig::default();
        assert!(config.validate().is_ok());

        config.domain = "https://vault.azure.net".to_string();
        assert!(config.validate().is_err());

        config.domain = "vault.azure.cn".to_string();
        config.request_timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_connect_timeout_must_be_below_request_timeout() {
        let mut config = VaultConfig::default();
        assert_eq!(config.connect_timeout_seconds, 10);

        config.connect_timeout_seconds = config.request_timeout_seconds;
        assert!(config.validate().is_err());

        config.connect_timeout_seconds = 0;
        assert!(config.validate().is_err());

        config.connect_timeout_seconds = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_credential_rejected() {
        let config = CredentialConfig {
            tenant_id: Some("tenant".to_string()),
            client_id: None,
            client_secret: None,
            managed_identity_client_id: None,
        };
        assert!(config.is_partial());
        assert!(!config.is_configured());
        let err = config.validate().unwrap_err();
        assert!(err.contains("client_id"));
    }

    #[test]
    fn test_user_assigned_identity_is_not_partial() {
        let config = CredentialConfig {
            managed_identity_client_id: Some("identity".to_string()),
            ..Default::default()
        };
        assert!(!config.is_partial());
        assert!(!config.is_configured());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_credential_accepted() {
        let config = CredentialConfig {
            tenant_id: Some("tenant".to_string()),
            client_id: Some("client".to_string()),
            client_secret: Some(secret_string("secret".to_string())),
            managed_identity_client_id: None,
        };
        assert!(config.is_configured());
        assert!(!config.is_partial());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_logging_rotation_validation() {
        let mut config = LoggingConfig::default();
        assert!(config.validate().is_ok());

        config.local_rotation = "size".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_app_settings_empty_prefix_rejected() {
        let config = AppSettingsConfig {
            enabled: true,
            prefix: String::new(),
        };
        assert!(config.validate().is_err());
    }
}
