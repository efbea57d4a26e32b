// vaultref - Azure Key Vault Reference Resolver
// Copyright (c) 2025 vaultref Contributors
// Licensed under the MIT License

//! # vaultref - Azure Key Vault Reference Resolver
//!
//! vaultref replaces placeholder strings in configuration with secrets read
//! from Azure Key Vault. A value of the exact form
//!
//! ```text
//! @Provider.KeyVault(VaultName=<vault>;SecretName=<secret>)
//! ```
//!
//! is a reference. Anything else is a plain value and is never touched.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Parsing** references with a fixed grammar
//! - **Resolving** single values, environment mappings and settings objects
//! - **Reusing** one client per vault within a resolution pass
//! - **Bootstrapping** a process environment from `.env` files and App Service settings
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`bootstrap`] - Startup sequence for the process environment
//! - [`resolve`] - Resolution over values, environments and settings
//! - [`vault`] - Key Vault clients, credentials and the client cache
//! - [`domain`] - Reference grammar and error types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vaultref::bootstrap::load_environment;
//! use vaultref::config::load_config_or_default;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config_or_default("vaultref.toml")?;
//!
//!     // Loads .env, promotes APPSETTING_* and resolves references in place
//!     let summary = load_environment(&config, Some(Path::new(".env"))).await?;
//!
//!     println!("Resolved {} variables", summary.replaced.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Settings Objects
//!
//! ```rust,no_run
//! use vaultref::config::ResolverConfig;
//! use vaultref::impl_settings;
//! use vaultref::resolve::SecretResolver;
//!
//! struct AppSettings {
//!     database_url: String,
//!     api_key: String,
//! }
//!
//! impl_settings!(AppSettings { database_url, api_key });
//!
//! # async fn example() -> vaultref::domain::Result<()> {
//! let resolver = SecretResolver::from_config(&ResolverConfig::default())?;
//! let settings = AppSettings {
//!     database_url: "@Provider.KeyVault(VaultName=my-vault;SecretName=db-url)".to_string(),
//!     api_key: "not-a-reference".to_string(),
//! };
//!
//! let settings = resolver.resolve_settings(settings, None).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Library errors are [`domain::VaultRefError`]. An unreachable vault is not
//! an error: the value is kept and a warning names the vault. A missing secret
//! keeps the value silently. Every other vault failure aborts the pass.

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;
pub mod resolve;
pub mod vault;
