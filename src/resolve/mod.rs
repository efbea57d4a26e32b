//! Vault reference resolution over environments and settings objects
//!
//! - [`resolver`] - [`SecretResolver`], single-value and batch resolution
//! - [`env`] - [`EnvStore`] with process and in-memory implementations
//! - [`settings`] - [`Settings`] field enumeration for structured objects

pub mod env;
pub mod resolver;
pub mod settings;

pub use env::{EnvStore, MemoryEnv, ProcessEnv};
pub use resolver::{Resolution, ResolutionSummary, SecretResolver, UnreachableEntry};
pub use settings::{SettingField, Settings};
