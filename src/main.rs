// vaultref - Azure Key Vault Reference Resolver
// Copyright (c) 2025 vaultref Contributors
// Licensed under the MIT License

use clap::Parser;
use std::path::Path;
use std::process;
use vaultref::bootstrap::load_dotenv;
use vaultref::cli::{Cli, Commands};
use vaultref::config::{load_config_or_default, LoggingConfig};
use vaultref::logging::init_logging;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // .env is loaded before the config so its variables feed ${VAR} substitution and overrides
    if let Err(e) = load_dotenv(Path::new(&cli.dotenv)) {
        eprintln!("Error: {e}");
        process::exit(1);
    }

    // Logging follows the config file when it loads; commands report config errors themselves
    let (config_level, logging_config) = match load_config_or_default(&cli.config) {
        Ok(config) => (config.application.log_level, config.logging),
        Err(_) => ("info".to_string(), LoggingConfig::default()),
    };
    let log_level = cli.log_level.as_deref().unwrap_or(&config_level);

    let logging_guard = match init_logging(log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        "vaultref - Azure Key Vault Reference Resolver"
    );

    // Execute command and get exit code
    let exit_code = match execute_command(&cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e:#}");
            5 // Fatal error exit code
        }
    };

    // Flush file logs before exiting
    drop(logging_guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Scan(args) => args.execute(&cli.config).await,
        Commands::Run(args) => args.execute(&cli.config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
    }
}
