//! Error types for configuration operations.
//!
//! Grounded on `sonido-config::error::ConfigError`'s shape (`#[derive(Debug, thiserror::Error)]`,
//! one variant per distinct startup failure, no catch-all string variant).

use thiserror::Error;

/// Errors raised while building or validating the default parameter table.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A pin (or, here, a parameter name) was registered more than once — caught at startup
    /// rather than letting the second registration silently overwrite the first (§7: "pin
    /// registered twice" is a configuration error).
    #[error("parameter '{0}' is registered more than once in the default table")]
    DuplicateParameter(String),
}

/// Convenience result type for `radio-config` operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
