//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for vaultref using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// vaultref - Azure Key Vault reference resolver
#[derive(Parser, Debug)]
#[command(name = "vaultref")]
#[command(version, about, long_about = None)]
#[command(author = "vaultref Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "vaultref.toml", env = "VAULTREF_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "VAULTREF_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Path to a .env file loaded before the configuration (skipped if missing)
    #[arg(long, default_value = ".env", env = "VAULTREF_DOTENV")]
    pub dotenv: String,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List environment variables holding vault references
    Scan(commands::scan::ScanArgs),

    /// Resolve vault references, then run a program with the resolved environment
    Run(commands::run::RunArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}
