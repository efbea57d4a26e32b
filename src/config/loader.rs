//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{CredentialConfig, ResolverConfig};
use super::secret_string;
use crate::domain::errors::VaultRefError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into ResolverConfig
/// 4. Applies environment variable overrides (VAULTREF_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file is missing or unreadable, a referenced
/// environment variable is unset, TOML parsing fails, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use vaultref::config::loader::load_config;
///
/// let config = load_config("vaultref.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ResolverConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(VaultRefError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        VaultRefError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: ResolverConfig = toml::from_str(&contents)
        .map_err(|e| VaultRefError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config);
    validate(&config)?;

    Ok(config)
}

/// Loads configuration from `path` if it exists, defaults otherwise
///
/// Environment overrides and validation apply in both cases.
pub fn load_config_or_default(path: impl AsRef<Path>) -> Result<ResolverConfig> {
    let path = path.as_ref();
    if path.exists() {
        return load_config(path);
    }

    tracing::debug!(path = %path.display(), "Configuration file not found, using defaults");
    let mut config = ResolverConfig::default();
    apply_env_overrides(&mut config);
    validate(&config)?;
    Ok(config)
}

/// Re-applies environment overrides to an already loaded configuration
///
/// Used after variables were added to the process environment (for example
/// from a `.env` file) so that they take effect. `${VAR}` placeholders in the
/// file are not re-read.
///
/// # Errors
///
/// Returns an error if the resulting configuration fails validation.
pub fn refresh_from_env(config: &ResolverConfig) -> Result<ResolverConfig> {
    let mut config = config.clone();
    apply_env_overrides(&mut config);
    validate(&config)?;
    Ok(config)
}

fn validate(config: &ResolverConfig) -> Result<()> {
    config.validate().map_err(|e| {
        VaultRefError::Configuration(format!("Configuration validation failed: {}", e))
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched. All missing variables are reported
/// together.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| VaultRefError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(VaultRefError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the VAULTREF_* prefix
///
/// Environment variables follow the pattern VAULTREF_<SECTION>_<KEY>, for
/// example VAULTREF_VAULT_DOMAIN. The standard AZURE_* credential variables
/// are read afterwards, see [`apply_azure_credential_env`].
fn apply_env_overrides(config: &mut ResolverConfig) {
    if let Ok(val) = std::env::var("VAULTREF_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Vault overrides
    if let Ok(val) = std::env::var("VAULTREF_VAULT_DOMAIN") {
        config.vault.domain = val;
    }
    if let Ok(val) = std::env::var("VAULTREF_VAULT_API_VERSION") {
        config.vault.api_version = val;
    }
    if let Ok(val) = std::env::var("VAULTREF_VAULT_REQUEST_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.vault.request_timeout_seconds = timeout;
        }
    }
    if let Ok(val) = std::env::var("VAULTREF_VAULT_CONNECT_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.vault.connect_timeout_seconds = timeout;
        }
    }

    // Credential overrides
    if let Some(val) = first_env(&["VAULTREF_CREDENTIAL_TENANT_ID"]) {
        config.credential.tenant_id = Some(val);
    }
    if let Some(val) = first_env(&["VAULTREF_CREDENTIAL_CLIENT_ID"]) {
        config.credential.client_id = Some(val);
    }
    if let Some(val) = first_env(&["VAULTREF_CREDENTIAL_CLIENT_SECRET"]) {
        config.credential.client_secret = Some(secret_string(val));
    }
    if let Some(val) = first_env(&["VAULTREF_CREDENTIAL_MANAGED_IDENTITY_CLIENT_ID"]) {
        config.credential.managed_identity_client_id = Some(val);
    }
    apply_azure_credential_env(&mut config.credential);

    // App setting overrides
    if let Ok(val) = std::env::var("VAULTREF_APP_SETTINGS_ENABLED") {
        config.app_settings.enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("VAULTREF_APP_SETTINGS_PREFIX") {
        config.app_settings.prefix = val;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("VAULTREF_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("VAULTREF_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("VAULTREF_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }
}

/// Fill credential fields from the standard AZURE_* variables
///
/// All three of AZURE_TENANT_ID, AZURE_CLIENT_ID and AZURE_CLIENT_SECRET fill
/// the service principal fields that are still unset. AZURE_CLIENT_ID on its
/// own names a user-assigned managed identity.
fn apply_azure_credential_env(credential: &mut CredentialConfig) {
    let tenant_id = first_env(&["AZURE_TENANT_ID"]);
    let client_id = first_env(&["AZURE_CLIENT_ID"]);
    let client_secret = first_env(&["AZURE_CLIENT_SECRET"]);

    match (tenant_id, client_id, client_secret) {
        (Some(tenant_id), Some(client_id), Some(client_secret)) => {
            credential.tenant_id.get_or_insert(tenant_id);
            credential.client_id.get_or_insert(client_id);
            if credential.client_secret.is_none() {
                credential.client_secret = Some(secret_string(client_secret));
            }
        }
        (_, Some(client_id), None) => {
            if !credential.is_configured() && !credential.is_partial() {
                credential.managed_identity_client_id.get_or_insert(client_id);
            }
        }
        _ => {}
    }
}

fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| std::env::var(name).ok().filter(|v| !v.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("VAULTREF_LOADER_TEST_VAR", "test_value");
        let input = "domain = \"${VAULTREF_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "domain = \"test_value\"\n");
        std::env::remove_var("VAULTREF_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        let input = "# uses ${VAULTREF_LOADER_NEVER_SET}";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "# uses ${VAULTREF_LOADER_NEVER_SET}\n");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("VAULTREF_LOADER_MISSING_VAR");
        let input = "client_secret = \"${VAULTREF_LOADER_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("VAULTREF_LOADER_MISSING_VAR"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-vaultref.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[vault]
domain = "vault.azure.cn"
request_timeout_seconds = 10
connect_timeout_seconds = 3

[app_settings]
enabled = false
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.vault.domain, "vault.azure.cn");
        assert_eq!(config.vault.request_timeout_seconds, 10);
        assert_eq!(config.vault.api_version, "7.4");
        assert!(!config.app_settings.enabled);
    }

    #[test]
    fn test_load_config_invalid_rejected() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[logging]\nlocal_rotation = \"weekly\"\n")
            .unwrap();
        temp_file.flush().unwrap();

        let err = load_config(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("local_rotation"));
    }
}
