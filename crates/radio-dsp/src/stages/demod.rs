//! `DemodulateRF`: the one stage in the chain whose element type changes, complex IQ in, real
//! audio samples out.

use std::collections::VecDeque;
use std::sync::Arc;

use radio_core::error::Result;
use radio_core::packet::{Packet, Sample};
use radio_core::stage::{Stage, StageKind};

use crate::demod::{DemodControl, DemodScheme};

/// Number of trailing per-chunk peak magnitudes averaged for AM's envelope normalization divisor
/// (§4.2: "trailing mean of the last K (≤8) per-chunk peak magnitudes").
const AM_PEAK_HISTORY: usize = 8;

/// Floor applied to the AM normalization divisor to avoid dividing by zero on silence.
const AM_DIVISOR_FLOOR: f32 = 1e-9;

/// Demodulates complex IQ into real audio samples using whichever [`DemodScheme`] is currently
/// selected, stamping `meta.demod_name` every packet regardless of squelch state (§4.2).
///
/// FM: `arg(data[1:] * conj(data[:-1])) / pi`, one sample shorter than the input. AM: `|data|`
/// divided by the trailing mean of up to [`AM_PEAK_HISTORY`] per-chunk peak magnitudes.
pub struct DemodulateRf {
    control: Arc<dyn DemodControl>,
    am_peak_history: VecDeque<f32>,
}

impl DemodulateRf {
    /// Demodulate using whatever scheme `control` currently selects.
    pub fn new(control: Arc<dyn DemodControl>) -> Self {
        Self {
            control,
            am_peak_history: VecDeque::with_capacity(AM_PEAK_HISTORY),
        }
    }

    fn demod_fm(data: &[Sample]) -> Vec<f32> {
        if data.len() < 2 {
            return Vec::new();
        }
        data.windows(2)
            .map(|w| (w[1] * w[0].conj()).arg() / std::f32::consts::PI)
            .collect()
    }

    fn demod_am(&mut self, data: &[Sample]) -> Vec<f32> {
        let magnitudes: Vec<f32> = data.iter().map(num_complex::Complex32::norm).collect();
        let peak = magnitudes.iter().copied().fold(0.0_f32, f32::max);

        if self.am_peak_history.len() == AM_PEAK_HISTORY {
            self.am_peak_history.pop_front();
        }
        self.am_peak_history.push_back(peak);

        let divisor = (self.am_peak_history.iter().sum::<f32>()
            / self.am_peak_history.len() as f32)
            .max(AM_DIVISOR_FLOOR);

        magnitudes.iter().map(|m| m / divisor).collect()
    }
}

impl Stage for DemodulateRf {
    type In = Packet<Sample>;
    type Out = Packet<f32>;

    fn name(&self) -> &'static str {
        "DemodulateRF"
    }

    fn kind(&self) -> StageKind {
        StageKind::Window
    }

    fn process(&mut self, item: Self::In) -> Result<Self::Out> {
        let scheme = self.control.scheme();
        let squelched = item.meta.is_squelched();

        let data = if squelched {
            // Skip the actual demod arithmetic (and, for AM, leave the peak history undisturbed)
            // while squelched — §3's "downstream stages skip heavy work when true".
            match scheme {
                DemodScheme::Fm => vec![0.0; item.data.len().saturating_sub(1)],
                DemodScheme::Am => vec![0.0; item.data.len()],
            }
        } else {
            match scheme {
                DemodScheme::Fm => Self::demod_fm(&item.data),
                DemodScheme::Am => self.demod_am(&item.data),
            }
        };

        let mut meta = item.meta;
        meta.demod_name = Some(scheme.name());
        Ok(Packet::with_meta(data, meta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demod::SharedDemodScheme;

    #[test]
    fn fm_output_is_one_sample_shorter_and_bounded() {
        let control = SharedDemodScheme::new(DemodScheme::Fm);
        let mut stage = DemodulateRf::new(control);

        let step = 0.1_f32;
        let data: Vec<Sample> = (0..32)
            .map(|i| Sample::new((i as f32 * step).cos(), (i as f32 * step).sin()))
            .collect();
        let len = data.len();
        let out = stage.process(Packet::new(data)).unwrap();

        assert_eq!(out.data.len(), len - 1);
        assert!(out.data.iter().all(|x| (-1.0..=1.0).contains(x)));
        assert_eq!(out.meta.demod_name, Some("FM"));
    }

    #[test]
    fn am_normalizes_by_trailing_peak_mean() {
        let control = SharedDemodScheme::new(DemodScheme::Am);
        let mut stage = DemodulateRf::new(control);

        let data = vec![Sample::new(2.0, 0.0); 8];
        let out = stage.process(Packet::new(data)).unwrap();

        // First chunk: history has one entry (this chunk's own peak), so normalization is exact.
        assert!(out.data.iter().all(|x| (x - 1.0).abs() < 1e-6));
        assert_eq!(out.meta.demod_name, Some("AM"));
    }

    #[test]
    fn squelched_packet_skips_demod_but_still_stamps_scheme_name() {
        let control = SharedDemodScheme::new(DemodScheme::Fm);
        let mut stage = DemodulateRf::new(control);

        let mut packet = Packet::new(vec![Sample::new(1.0, 0.0); 10]);
        packet.meta.squelched = Some(true);
        let out = stage.process(packet).unwrap();

        assert_eq!(out.data.len(), 9);
        assert!(out.data.iter().all(|x| *x == 0.0));
        assert_eq!(out.meta.demod_name, Some("FM"));
    }
}
