//! Result type alias for vaultref

use super::errors::VaultRefError;

/// Result type alias for vaultref operations
///
/// # Examples
///
/// ```
/// use vaultref::domain::result::Result;
/// use vaultref::domain::errors::VaultRefError;
///
/// fn failing_function() -> Result<()> {
///     Err(VaultRefError::Configuration("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, VaultRefError>;
