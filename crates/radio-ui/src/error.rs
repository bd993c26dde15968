//! Error values for the UI domain.

use thiserror::Error;

/// Errors raised while driving the control surface.
#[derive(Debug, Error)]
pub enum UiError {
    /// A handler reached into the shared parameter store for a name the store doesn't have —
    /// a configuration error, since the default table (`radio-config`) is the only place names
    /// are supposed to come from.
    #[error("UI control surface referenced an unknown parameter: {0}")]
    UnknownParameter(#[from] radio_core::CoreError),

    /// The SDR retune call the FREQTUNE/BANDWIDTH handlers issue after a value change failed.
    #[error("failed to apply control-surface change to the SDR: {0}")]
    SdrControl(#[from] radio_io::IoError),

    /// A `Display` primitive (text/line/rectangle/polygon/flush) failed against the physical panel.
    #[error("display primitive failed: {0}")]
    DisplayFailure(String),
}

/// Convenience result type for `radio-ui` operations.
pub type Result<T> = std::result::Result<T, UiError>;
