//! Error values for the lifecycle/wiring layer itself, as distinct from the domain-crate errors
//! it propagates (§7).

use thiserror::Error;

/// Errors raised while starting up or tearing down the receiver service.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Building the default parameter table failed (§7 configuration error).
    #[error(transparent)]
    Config(#[from] radio_config::ConfigError),

    /// Registering the front-panel pin table failed (§7 "pin registered twice").
    #[error(transparent)]
    Input(#[from] radio_input::InputError),

    /// Building a DSP stage (e.g. the initial `Filter`) failed.
    #[error(transparent)]
    Core(#[from] radio_core::CoreError),

    /// Starting the audio output stream failed.
    #[error(transparent)]
    Audio(#[from] radio_io::IoError),

    /// The DSP thread panicked instead of returning an orderly `Err`.
    #[error("DSP thread panicked")]
    DspThreadPanicked,
}

/// Convenience result type for `radio-cli` operations.
pub type Result<T> = std::result::Result<T, LifecycleError>;
