//! Domain types for vaultref.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **The reference grammar** ([`Reference`])
//! - **Error types** ([`VaultRefError`], [`VaultError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, VaultRefError>`]. Vault failures
//! convert with `?`:
//!
//! ```rust
//! use vaultref::domain::{Result, VaultError};
//!
//! fn example() -> Result<()> {
//!     let outcome: std::result::Result<(), VaultError> = Ok(());
//!     outcome?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod reference;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{VaultError, VaultRefError};
pub use reference::{Reference, REFERENCE_PREFIX};
pub use result::Result;
