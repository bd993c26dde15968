//! Error values for the front-panel input domain.

use thiserror::Error;

/// Errors raised while configuring or running the input controller.
#[derive(Debug, Error)]
pub enum InputError {
    /// Two registrations named the same GPIO pin — a configuration error, fatal at startup
    /// (§7 "pin registered twice").
    #[error("pin {0} registered more than once")]
    DuplicatePin(u8),
}

/// Convenience result type for `radio-input` operations.
pub type Result<T> = std::result::Result<T, InputError>;
