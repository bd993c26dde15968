//! The audio sink bridge (§4.4): a bounded hand-off queue between the DSP tail and the real-time
//! `cpal` output callback, with non-blocking reads and an underrun counter on the callback side.
//!
//! Grounded on `sonido-io::backend::AudioBackend`/`cpal_backend::CpalBackend` — the stream-handle
//! RAII shape and `thiserror`-wrapped build errors are carried over directly; what changes is the
//! callback body, which here pulls fixed-size [`radio_core::AudioFrame`]s from a bounded channel
//! instead of computing samples inline.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Receiver;
use radio_core::AudioFrame;

use crate::error::{IoError, Result};

/// Diagnostic counter of audio underruns: frames substituted with silence because none were ready
/// when the callback fired (§4.4 "record an underrun for diagnostics", §7 "transient data error").
#[derive(Debug, Clone, Default)]
pub struct UnderrunCounter(Arc<AtomicU64>);

impl UnderrunCounter {
    /// A fresh counter at zero.
    pub fn new() -> Self {
        Self(Arc::new(AtomicU64::new(0)))
    }

    /// Total underruns observed since construction.
    pub fn count(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    fn record(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

/// Type-erased audio stream handle, kept alive only to hold the platform stream; stops playback on
/// drop (mirrors `sonido_io::backend::StreamHandle`).
pub struct AudioStreamHandle {
    _stream: cpal::Stream,
}

/// Start a `cpal` output stream of `blocksize`-frame mono audio, pulling each frame from `frames`
/// with a non-blocking `try_recv`. The audio thread never allocates, blocks, or runs DSP: on an
/// empty queue it writes silence and records an underrun (§4.4, §7 transient data error).
pub fn start_output_stream(
    sample_rate: u32,
    blocksize: u32,
    frames: Receiver<AudioFrame>,
    underruns: UnderrunCounter,
) -> Result<AudioStreamHandle> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(IoError::NoDevice)?;

    let config = cpal::StreamConfig {
        channels: 1,
        sample_rate: cpal::SampleRate(sample_rate),
        buffer_size: cpal::BufferSize::Fixed(blocksize),
    };

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                match frames.try_recv() {
                    Ok(frame) => {
                        let n = data.len().min(frame.len());
                        data[..n].copy_from_slice(&frame[..n]);
                        for sample in &mut data[n..] {
                            *sample = 0.0;
                        }
                    }
                    Err(_) => {
                        data.fill(0.0);
                        underruns.record();
                    }
                }
            },
            move |err| {
                tracing::error!(error = %err, "audio output stream error");
            },
            None,
        )
        .map_err(|e| IoError::Stream(e.to_string()))?;

    stream.play().map_err(|e| IoError::Stream(e.to_string()))?;
    tracing::info!(sample_rate, blocksize, "audio output stream started");

    Ok(AudioStreamHandle { _stream: stream })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn underrun_counter_starts_at_zero_and_records() {
        let counter = UnderrunCounter::new();
        assert_eq!(counter.count(), 0);
        counter.record();
        counter.record();
        assert_eq!(counter.count(), 2);
    }

    #[test]
    fn underrun_counter_clones_share_state() {
        let counter = UnderrunCounter::new();
        let clone = counter.clone();
        clone.record();
        assert_eq!(counter.count(), 1);
    }
}
