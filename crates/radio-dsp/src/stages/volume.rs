//! `AdjustVolume`: scales audio to the configured speaker volume, normalized against the chunk's
//! own peak.

use std::sync::Arc;

use radio_core::error::Result;
use radio_core::packet::Packet;
use radio_core::stage::{Stage, StageKind};
use radio_core::ParameterStore;

/// Floor applied to a chunk's peak magnitude before dividing, so a silent (or fully squelched)
/// chunk doesn't divide by zero.
const PEAK_FLOOR: f32 = 1e-9;

/// Scales `data` by `(volume / 100) / max(|data|, ε)`, where `volume` is read from `spkr_volume`
/// on every packet (§9 Open Question resolution: "peak-normalize per chunk against its own
/// maximum absolute sample, then scale by `volume / 100`").
pub struct AdjustVolume {
    store: Arc<ParameterStore>,
    volume_param: &'static str,
}

impl AdjustVolume {
    /// Scale by the `volume_param` parameter in `store`.
    pub fn new(store: Arc<ParameterStore>, volume_param: &'static str) -> Self {
        Self { store, volume_param }
    }
}

impl Stage for AdjustVolume {
    type In = Packet<f32>;
    type Out = Packet<f32>;

    fn name(&self) -> &'static str {
        "AdjustVolume"
    }

    fn kind(&self) -> StageKind {
        StageKind::Window
    }

    fn process(&mut self, item: Self::In) -> Result<Self::Out> {
        let volume = self.store.get_numeric(self.volume_param)?;

        if item.meta.is_squelched() {
            return Ok(item);
        }

        let Packet { mut data, meta } = item;
        let peak = data.iter().fold(0.0_f32, |acc, x| acc.max(x.abs())).max(PEAK_FLOOR);
        let scale = (volume / 100.0) as f32 / peak;

        for sample in &mut data {
            *sample *= scale;
        }

        Ok(Packet::with_meta(data, meta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radio_core::param::{NumericParam, Parameter};

    fn store_with_volume(volume: f64) -> Arc<ParameterStore> {
        let store = Arc::new(ParameterStore::new());
        store.register(
            "spkr_volume",
            Parameter::Numeric(NumericParam::new(volume, 0.0, 100.0, vec![1.0])),
        );
        store
    }

    #[test]
    fn full_volume_normalizes_peak_to_one() {
        let mut stage = AdjustVolume::new(store_with_volume(100.0), "spkr_volume");
        let out = stage.process(Packet::new(vec![0.5, -2.0, 1.0])).unwrap();
        assert!((out.data[1].abs() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn half_volume_halves_the_normalized_peak() {
        let mut stage = AdjustVolume::new(store_with_volume(50.0), "spkr_volume");
        let out = stage.process(Packet::new(vec![0.5, -2.0, 1.0])).unwrap();
        assert!((out.data[1].abs() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn silent_chunk_does_not_divide_by_zero() {
        let mut stage = AdjustVolume::new(store_with_volume(100.0), "spkr_volume");
        let out = stage.process(Packet::new(vec![0.0; 16])).unwrap();
        assert!(out.data.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn squelched_packet_is_passed_through_unscaled() {
        let mut stage = AdjustVolume::new(store_with_volume(100.0), "spkr_volume");
        let mut packet = Packet::new(vec![0.3, 0.6]);
        packet.meta.squelched = Some(true);
        let out = stage.process(packet).unwrap();
        assert_eq!(out.data, vec![0.3, 0.6]);
    }
}
