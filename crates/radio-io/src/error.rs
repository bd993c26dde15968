//! Error types for the SDR and audio-sink collaborators.

use thiserror::Error;

/// Errors raised by the SDR device and audio backend boundaries.
#[derive(Debug, Error)]
pub enum IoError {
    /// The SDR device could not be opened or configured.
    #[error("SDR device error: {0}")]
    Sdr(String),

    /// The SDR device disconnected mid-stream — fatal to the pipeline (§7 fatal runtime error).
    #[error("SDR device disconnected")]
    SdrDisconnected,

    /// Building or starting an audio stream failed.
    #[error("audio stream error: {0}")]
    Stream(String),

    /// No audio output device is available on this system.
    #[error("no audio output device available")]
    NoDevice,
}

/// Convenience result type for `radio-io` operations.
pub type Result<T> = std::result::Result<T, IoError>;
