//! `Downsample`: converts demodulated audio from the SDR's sample rate down to the speaker's.

use radio_core::error::Result;
use radio_core::packet::Packet;
use radio_core::stage::{Stage, StageKind};
use rubato::{Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction};

use crate::error::{fatal, StageError};

/// Polyphase-resamples real audio from `from_rate_hz` to `to_rate_hz` via `rubato`'s sinc
/// interpolator (§4.2). `rubato::SincFixedIn` is built for a fixed input length, but the DEMOD
/// screen (§4.6) can toggle `DemodScheme` at runtime, and FM/AM demod produce different chunk
/// lengths (`spb - 1` vs `spb`, §4.2) — so `process` rebuilds the resampler whenever the observed
/// input length differs from the one it was last built for, the same way [`super::filter::Filter`]
/// rebuilds its IIR on a bandwidth change. The resampler's own output length is then corrected by
/// truncation or zero-padding to the exact `round(len * to_rate / from_rate)` the chunk's actual
/// length implies (§8 invariant: "output length tracks input length times the rate ratio, within
/// rounding").
pub struct Downsample {
    from_rate_hz: f64,
    to_rate_hz: f64,
    cached_chunk_size_in: usize,
    resampler: Option<SincFixedIn<f32>>,
}

impl Downsample {
    /// A resampler converting `chunk_size_in`-sample chunks from `from_rate_hz` to `to_rate_hz`.
    /// When the two rates are equal, no resampler is built and `process` is the identity.
    pub fn new(from_rate_hz: f64, to_rate_hz: f64, chunk_size_in: usize) -> Result<Self> {
        let resampler = if (from_rate_hz - to_rate_hz).abs() < f64::EPSILON {
            None
        } else {
            Some(Self::build_resampler(from_rate_hz, to_rate_hz, chunk_size_in)?)
        };

        Ok(Self {
            from_rate_hz,
            to_rate_hz,
            cached_chunk_size_in: chunk_size_in,
            resampler,
        })
    }

    fn build_resampler(from_rate_hz: f64, to_rate_hz: f64, chunk_size_in: usize) -> Result<SincFixedIn<f32>> {
        let ratio = to_rate_hz / from_rate_hz;
        let params = SincInterpolationParameters {
            sinc_len: 128,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 128,
            window: WindowFunction::BlackmanHarris2,
        };

        SincFixedIn::<f32>::new(ratio, 2.0, params, chunk_size_in, 1)
            .map_err(|e| fatal("Downsample", StageError::Resample(e.to_string())))
    }

    fn expected_len(&self, input_len: usize) -> usize {
        ((input_len as f64) * self.to_rate_hz / self.from_rate_hz).round() as usize
    }
}

impl Stage for Downsample {
    type In = Packet<f32>;
    type Out = Packet<f32>;

    fn name(&self) -> &'static str {
        "Downsample"
    }

    fn kind(&self) -> StageKind {
        StageKind::Worker
    }

    fn process(&mut self, item: Self::In) -> Result<Self::Out> {
        let expected_len = self.expected_len(item.data.len());

        if self.resampler.is_none() {
            return Ok(item);
        }

        if item.data.len() != self.cached_chunk_size_in {
            tracing::debug!(
                chunk_size_in = item.data.len(),
                previous = self.cached_chunk_size_in,
                "rebuilding resampler for new chunk length"
            );
            self.resampler = Some(Self::build_resampler(self.from_rate_hz, self.to_rate_hz, item.data.len())?);
            self.cached_chunk_size_in = item.data.len();
        }

        let resampler = self.resampler.as_mut().expect("resampler just rebuilt or already present");

        if item.meta.is_squelched() {
            return Ok(item.map_data(vec![0.0; expected_len]));
        }

        let mut resampled = resampler
            .process(&[item.data], None)
            .map_err(|e| fatal("Downsample", StageError::Resample(e.to_string())))?
            .remove(0);

        resampled.resize(expected_len, 0.0);
        Ok(item.map_data(resampled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_when_rates_match() {
        let mut stage = Downsample::new(48_000.0, 48_000.0, 256).unwrap();
        let data = vec![0.25_f32; 256];
        let out = stage.process(Packet::new(data.clone())).unwrap();
        assert_eq!(out.data, data);
    }

    #[test]
    fn output_length_tracks_the_rate_ratio() {
        let chunk = 4096;
        let mut stage = Downsample::new(250_000.0, 44_100.0, chunk).unwrap();
        let data = vec![0.0_f32; chunk];
        let out = stage.process(Packet::new(data)).unwrap();
        let expected = ((chunk as f64) * 44_100.0 / 250_000.0).round() as usize;
        assert_eq!(out.data.len(), expected);
    }

    #[test]
    fn squelched_chunk_is_zero_filled_at_the_target_length() {
        let chunk = 4096;
        let mut stage = Downsample::new(250_000.0, 44_100.0, chunk).unwrap();
        let mut packet = Packet::new(vec![1.0_f32; chunk]);
        packet.meta.squelched = Some(true);
        let out = stage.process(packet).unwrap();
        let expected = ((chunk as f64) * 44_100.0 / 250_000.0).round() as usize;
        assert_eq!(out.data.len(), expected);
        assert!(out.data.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn rebuilds_resampler_when_chunk_length_changes() {
        // Mimics an FM->AM DEMOD toggle: FM's chunk is spb - 1, AM's is spb.
        let spb = 4096;
        let mut stage = Downsample::new(250_000.0, 44_100.0, spb - 1).unwrap();
        stage.process(Packet::new(vec![0.0_f32; spb - 1])).unwrap();

        let out = stage.process(Packet::new(vec![0.0_f32; spb])).unwrap();

        assert_eq!(stage.cached_chunk_size_in, spb);
        let expected = ((spb as f64) * 44_100.0 / 250_000.0).round() as usize;
        assert_eq!(out.data.len(), expected);
    }
}
