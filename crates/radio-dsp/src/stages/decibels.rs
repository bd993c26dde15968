//! `CalcDecibels`: measures a chunk's signal strength and stamps it into `meta.db`.

use radio_core::error::Result;
use radio_core::packet::{Packet, Sample};
use radio_core::stage::{Stage, StageKind};

/// Floor applied to each sample's magnitude before taking `log10`, so an all-zero chunk (silence,
/// or a squelched upstream packet) reads as a finite, very low dB figure instead of `-inf`/`NaN`
/// (§4.2 edge case: "samples whose magnitude is 0... implementations must floor or skip").
const MAGNITUDE_FLOOR: f32 = 1e-6;

/// dB figure reported for an empty chunk, matching the floor's own value in dB.
const EMPTY_CHUNK_DB: f32 = -120.0;

/// Computes the mean magnitude of a chunk in dB and stamps it into `PacketMeta::db`. Data passes
/// through unchanged (§4.2).
pub struct CalcDecibels;

impl Stage for CalcDecibels {
    type In = Packet<Sample>;
    type Out = Packet<Sample>;

    fn name(&self) -> &'static str {
        "CalcDecibels"
    }

    fn kind(&self) -> StageKind {
        StageKind::Window
    }

    fn process(&mut self, item: Self::In) -> Result<Self::Out> {
        let Packet { data, meta } = item;

        let db = if data.is_empty() {
            EMPTY_CHUNK_DB
        } else {
            let sum: f32 = data
                .iter()
                .map(|s| 20.0 * s.norm().max(MAGNITUDE_FLOOR).log10())
                .sum();
            sum / data.len() as f32
        };

        let mut meta = meta;
        meta.db = Some(db);
        Ok(Packet::with_meta(data, meta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_reports_the_floor_without_producing_nan() {
        let mut stage = CalcDecibels;
        let packet = Packet::new(vec![Sample::new(0.0, 0.0); 16]);
        let out = stage.process(packet).unwrap();
        assert!(out.meta.db.unwrap().is_finite());
        assert!(out.meta.db.unwrap() <= EMPTY_CHUNK_DB + 1.0);
    }

    #[test]
    fn empty_chunk_does_not_panic() {
        let mut stage = CalcDecibels;
        let out = stage.process(Packet::new(Vec::new())).unwrap();
        assert_eq!(out.meta.db, Some(EMPTY_CHUNK_DB));
    }

    #[test]
    fn unit_amplitude_reads_near_zero_db() {
        let mut stage = CalcDecibels;
        let packet = Packet::new(vec![Sample::new(1.0, 0.0); 32]);
        let out = stage.process(packet).unwrap();
        assert!((out.meta.db.unwrap() - 0.0).abs() < 0.01);
    }

    #[test]
    fn data_passes_through_unchanged() {
        let mut stage = CalcDecibels;
        let data = vec![Sample::new(0.5, 0.25), Sample::new(-0.1, 0.9)];
        let out = stage.process(Packet::new(data.clone())).unwrap();
        assert_eq!(out.data, data);
    }
}
