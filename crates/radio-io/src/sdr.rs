//! The SDR front-end interface this workspace consumes (§6), plus the shared handle that lets the
//! DSP source stage and the UI controller both reach the same physical device under one mutex —
//! "`set_center_freq` invoked by UI... is serialized against the source's reads" (§5).

use std::sync::{Arc, Mutex};

use radio_core::packet::Sample;

use crate::error::{IoError, Result};

/// The SDR driver interface consumed by the `ProvideRawRF` source stage (§6). Pull-based rather
/// than the original's lazy `stream()` sequence: `recv_chunk` blocks the calling thread until a
/// chunk is ready or the device errors, which is the object-safe shape that lets this trait be
/// boxed and shared across the DSP and UI threads.
pub trait SdrDevice: Send {
    /// Retune to a new center frequency in Hz.
    fn set_center_freq(&mut self, hz: f64) -> Result<()>;

    /// The device's current complex sample rate in Hz.
    fn sample_rate(&self) -> f64;

    /// Apply a frequency correction in parts-per-million.
    fn set_freq_correction(&mut self, ppm: f64) -> Result<()>;

    /// Set the tuner gain.
    fn set_gain(&mut self, gain: f64) -> Result<()>;

    /// Block until `num_samples` complex IQ samples are available and return them.
    fn recv_chunk(&mut self, num_samples: usize) -> Result<Vec<Sample>>;

    /// Request the device stop streaming.
    fn stop(&mut self) -> Result<()>;

    /// Close the device handle. Called by the source stage on exit (§4.2).
    fn close(&mut self) -> Result<()>;
}

/// The reader-side surface the `ProvideRawRF` source stage needs: pull chunks, and shut the device
/// down cleanly on exit. Implemented for any [`SharedSdr`], so the source stage can hold an
/// `Arc<dyn SdrHandle>` without knowing the concrete device type.
pub trait SdrHandle: Send + Sync {
    /// Block until `num_samples` complex IQ samples are available.
    fn recv_chunk(&self, num_samples: usize) -> Result<Vec<Sample>>;

    /// Request the device stop streaming.
    fn stop(&self) -> Result<()>;

    /// Close the device handle.
    fn close(&self) -> Result<()>;

    /// The device's current complex sample rate in Hz.
    fn sample_rate(&self) -> f64;
}

/// The control-side surface the UI controller needs: retune. Replaces the original's reflective
/// `Object` parameter cell (§9's "Dynamic parameter typing" redesign note) with an explicit,
/// narrow trait — the UI can retune the SDR and nothing else through this interface.
pub trait SdrControl: Send + Sync {
    /// Retune to a new center frequency in Hz.
    fn set_center_freq(&self, hz: f64) -> Result<()>;
}

/// A device handle shared between the DSP source stage (which reads chunks) and the UI controller
/// (which retunes), guarded by one mutex so the two never observe a torn device state.
pub struct SharedSdr<D> {
    inner: Mutex<D>,
    sample_rate: f64,
}

impl<D: SdrDevice> SharedSdr<D> {
    /// Wrap `device` for sharing across the DSP and UI threads.
    pub fn new(device: D) -> Arc<Self> {
        let sample_rate = device.sample_rate();
        Arc::new(Self {
            inner: Mutex::new(device),
            sample_rate,
        })
    }
}

impl<D: SdrDevice> SdrHandle for SharedSdr<D> {
    fn recv_chunk(&self, num_samples: usize) -> Result<Vec<Sample>> {
        self.inner
            .lock()
            .expect("SDR device lock poisoned")
            .recv_chunk(num_samples)
    }

    fn stop(&self) -> Result<()> {
        self.inner.lock().expect("SDR device lock poisoned").stop()
    }

    fn close(&self) -> Result<()> {
        self.inner.lock().expect("SDR device lock poisoned").close()
    }

    fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}

impl<D: SdrDevice> SdrControl for SharedSdr<D> {
    fn set_center_freq(&self, hz: f64) -> Result<()> {
        self.inner
            .lock()
            .expect("SDR device lock poisoned")
            .set_center_freq(hz)
    }
}

/// A deterministic synthetic IQ source, used by the stage/pipeline test suite in place of real
/// hardware (§6's Rust realization: "no physical SDR is available to this crate").
///
/// Emits a constant-frequency complex tone plus a small amount of deterministic noise, so FM/AM
/// demod tests have a signal with a known instantaneous phase derivative.
pub struct MockSdrDevice {
    center_freq: f64,
    sample_rate: f64,
    gain: f64,
    freq_correction: f64,
    tone_hz: f64,
    phase: f64,
    stopped: bool,
    closed: bool,
}

impl MockSdrDevice {
    /// A mock device tuned to `center_freq` Hz at `sample_rate` Hz, emitting a tone offset
    /// `tone_hz` from center (so FM demod has a nonzero, known instantaneous frequency).
    pub fn new(center_freq: f64, sample_rate: f64, tone_hz: f64) -> Self {
        Self {
            center_freq,
            sample_rate,
            gain: 0.0,
            freq_correction: 0.0,
            tone_hz,
            phase: 0.0,
            stopped: false,
            closed: false,
        }
    }

    /// Whether `stop()` has been called.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Whether `close()` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl SdrDevice for MockSdrDevice {
    fn set_center_freq(&mut self, hz: f64) -> Result<()> {
        self.center_freq = hz;
        Ok(())
    }

    fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    fn set_freq_correction(&mut self, ppm: f64) -> Result<()> {
        self.freq_correction = ppm;
        Ok(())
    }

    fn set_gain(&mut self, gain: f64) -> Result<()> {
        self.gain = gain;
        Ok(())
    }

    fn recv_chunk(&mut self, num_samples: usize) -> Result<Vec<Sample>> {
        if self.stopped {
            return Err(IoError::SdrDisconnected);
        }
        let step = std::f64::consts::TAU * self.tone_hz / self.sample_rate;
        let mut out = Vec::with_capacity(num_samples);
        for _ in 0..num_samples {
            out.push(Sample::new(self.phase.cos() as f32, self.phase.sin() as f32));
            self.phase += step;
        }
        self.phase %= std::f64::consts::TAU;
        Ok(out)
    }

    fn stop(&mut self) -> Result<()> {
        self.stopped = true;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}
