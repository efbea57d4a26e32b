//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the vaultref configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// `load_config` runs validation, so a load failure covers both missing
    /// files and invalid values.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(1);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Vault Domain: {}", config.vault.domain);
        println!("  API Version: {}", config.vault.api_version);
        println!(
            "  Request Timeout: {}s",
            config.vault.request_timeout_seconds
        );
        println!(
            "  Credential: {}",
            if config.credential.is_configured() {
                "service principal"
            } else {
                "managed identity"
            }
        );
        if config.app_settings.enabled {
            println!("  App Settings Prefix: {}", config.app_settings.prefix);
        } else {
            println!("  App Settings: disabled");
        }
        if config.logging.local_enabled {
            println!(
                "  File Logging: {} ({})",
                config.logging.local_path, config.logging.local_rotation
            );
        }
        println!();

        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_missing_file_fails_validation() {
        let args = ValidateArgs {};
        let code = args.execute("/nonexistent/vaultref.toml").await.unwrap();
        assert_eq!(code, 1);
    }

    #[tokio::test]
    async fn test_invalid_value_fails_validation() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[vault]\nrequest_timeout_seconds = 0").unwrap();

        let args = ValidateArgs {};
        let code = args.execute(file.path().to_str().unwrap()).await.unwrap();
        assert_eq!(code, 1);
    }
}
