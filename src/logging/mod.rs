//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output with an env-filter
//! - Local JSON file logging with rotation
//!
//! Secret values are never logged; only vault, secret and key names are.
//!
//! # Example
//!
//! ```no_run
//! use vaultref::logging::init_logging;
//! use vaultref::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log a vault that could not be contacted during resolution
///
/// # Example
///
/// ```no_run
/// use vaultref::log_vault_unreachable;
///
/// log_vault_unreachable!("VaultC", "dns error: no such host");
/// ```
#[macro_export]
macro_rules! log_vault_unreachable {
    ($vault:expr, $error:expr) => {
        tracing::warn!(
            vault = %$vault,
            error = %$error,
            "Key vault not found during secret resolution"
        );
    };
}

/// Log the fields of a settings object that were replaced with secrets
///
/// # Example
///
/// ```no_run
/// use vaultref::log_settings_resolved;
///
/// let replaced = vec!["secret_a"];
/// log_settings_resolved!("app::Settings", replaced);
/// ```
#[macro_export]
macro_rules! log_settings_resolved {
    ($settings_type:expr, $fields:expr) => {
        tracing::info!(
            settings = $settings_type,
            fields = ?$fields,
            "Fetched secrets from key vault"
        );
    };
}
