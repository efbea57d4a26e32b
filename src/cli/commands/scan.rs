//! Scan command implementation
//!
//! Lists the environment variables that hold vault references. No vault is
//! contacted and no values are printed.

use crate::bootstrap::prepare_environment;
use crate::config::load_config_or_default;
use crate::domain::Reference;
use crate::resolve::{EnvStore, ProcessEnv};
use clap::Args;
use serde::Serialize;

/// Arguments for the scan command
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

/// An environment variable holding a vault reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanEntry {
    /// Variable name
    pub key: String,

    /// Parsed reference
    #[serde(flatten)]
    pub reference: Reference,
}

impl ScanArgs {
    /// Execute the scan command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Scanning environment for vault references");

        let config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ Failed to load configuration file");
                eprintln!("   Error: {e}");
                return Ok(1);
            }
        };

        prepare_environment(&config, None)?;

        let entries = scan_env(&ProcessEnv);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&entries)?);
            return Ok(0);
        }

        if entries.is_empty() {
            println!("No vault references found.");
            return Ok(0);
        }

        println!("🔍 Vault references ({})", entries.len());
        println!();
        for entry in &entries {
            println!(
                "  {} -> vault: {}, secret: {}",
                entry.key, entry.reference.vault_name, entry.reference.secret_name
            );
        }
        println!();

        Ok(0)
    }
}

/// Collect the variables of `env` that hold a reference, sorted by key
pub fn scan_env<E>(env: &E) -> Vec<ScanEntry>
where
    E: EnvStore + ?Sized,
{
    let mut entries: Vec<ScanEntry> = env
        .keys()
        .into_iter()
        .filter_map(|key| {
            let reference = Reference::parse(&env.get(&key)?)?;
            Some(ScanEntry { key, reference })
        })
        .collect();
    entries.sort_by(|a, b| a.key.cmp(&b.key));
    entries
}
