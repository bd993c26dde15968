//! Stage-local error values and the helper that lifts them into the shared
//! [`radio_core::CoreError::StageFailed`] a stage's `process`/`produce` call actually returns.

use thiserror::Error;

/// Errors a DSP stage can hit while doing its own work, before being lifted into
/// [`radio_core::CoreError`] by [`fatal`].
#[derive(Debug, Error)]
pub enum StageError {
    /// The SDR device produced an error or disconnected.
    #[error("SDR read failed: {0}")]
    Sdr(#[from] radio_io::IoError),

    /// Filter `(b, a)` coefficients are malformed (e.g. `a[0] == 0`).
    #[error("invalid filter coefficients: {0}")]
    InvalidCoefficients(String),

    /// The resampler could not be built or run for the requested rate pair.
    #[error("resample failed: {0}")]
    Resample(String),
}

/// Lift a stage-local [`StageError`] into the fatal, pipeline-wide
/// [`radio_core::CoreError::StageFailed`] (§7: "Any stage exception is fatal to the pipeline").
pub fn fatal(stage: &'static str, err: impl Into<StageError>) -> radio_core::CoreError {
    radio_core::CoreError::StageFailed {
        stage: stage.to_string(),
        reason: err.into().to_string(),
    }
}
