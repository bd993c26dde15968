//! `ReshapeArray`: the chain's final layout step before the audio/UI taps.
//!
//! The original pipeline reshaped its numpy array to `(-1, 1)` immediately before handing audio
//! off to the sink, to match the sink's expected column-vector layout. A `Vec<f32>` is already
//! flat, single-channel data — there is no second dimension to add — so this stage is the
//! identity on `data`. It stays a distinct stage (rather than being deleted) so the chain's stage
//! count and naming still mirror §4.2 exactly, and so a future multi-channel sink has a single
//! seam to change.
use radio_core::error::Result;
use radio_core::packet::Packet;
use radio_core::stage::{Stage, StageKind};

/// Identity on mono `f32` data; kept as its own stage to mirror the original pipeline's reshape
/// step (§4.2).
pub struct ReshapeArray;

impl Stage for ReshapeArray {
    type In = Packet<f32>;
    type Out = Packet<f32>;

    fn name(&self) -> &'static str {
        "ReshapeArray"
    }

    fn kind(&self) -> StageKind {
        StageKind::Worker
    }

    fn process(&mut self, item: Self::In) -> Result<Self::Out> {
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reshape_is_the_identity_on_data_and_meta() {
        let mut stage = ReshapeArray;
        let packet = Packet::new(vec![1.0, -0.5, 0.25]);
        let data_before = packet.data.clone();
        let out = stage.process(packet).unwrap();
        assert_eq!(out.data, data_before);
    }
}
