//! Configuration management for vaultref.
//!
//! Configuration is optional: every setting has a default, so the resolver
//! works against public Azure with no file at all. A TOML file can change the
//! vault DNS suffix (sovereign clouds), pin an explicit service principal, and
//! tune app setting promotion and logging.
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [vault]
//! domain = "vault.azure.net"
//! api_version = "7.4"
//! request_timeout_seconds = 30
//! connect_timeout_seconds = 10
//!
//! [credential]
//! tenant_id = "00000000-0000-0000-0000-000000000000"
//! client_id = "11111111-1111-1111-1111-111111111111"
//! client_secret = "${VAULTREF_CLIENT_SECRET}"
//!
//! [app_settings]
//! enabled = true
//! prefix = "APPSETTING_"
//! ```
//!
//! # Environment Variables
//!
//! `${VAR_NAME}` placeholders are substituted before parsing, and
//! `VAULTREF_<SECTION>_<KEY>` variables override individual settings.

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_config_or_default, refresh_from_env};
pub use schema::{
    AppSettingsConfig, ApplicationConfig, CredentialConfig, LoggingConfig, ResolverConfig,
    VaultConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
