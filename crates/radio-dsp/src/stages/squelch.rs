//! `ApplySquelch`: zeroes a chunk's data and marks `meta.squelched` when signal strength is at or
//! below the configured threshold.

use std::sync::Arc;

use radio_core::error::Result;
use radio_core::packet::{Packet, Sample};
use radio_core::stage::{Stage, StageKind};
use radio_core::ParameterStore;

/// Reads `sdr_squelch` from the shared store and, when the packet's `meta.db` (set upstream by
/// `CalcDecibels`) is at or below threshold, zeroes `data` and sets `meta.squelched = true`
/// (§4.2). Idempotent: re-applying with an unchanged threshold to an already-squelched packet
/// reproduces the same output (§8 invariant 7).
pub struct ApplySquelch {
    store: Arc<ParameterStore>,
}

impl ApplySquelch {
    /// Squelch against the `sdr_squelch` parameter in `store`.
    pub fn new(store: Arc<ParameterStore>) -> Self {
        Self { store }
    }
}

impl Stage for ApplySquelch {
    type In = Packet<Sample>;
    type Out = Packet<Sample>;

    fn name(&self) -> &'static str {
        "ApplySquelch"
    }

    fn kind(&self) -> StageKind {
        StageKind::Window
    }

    fn process(&mut self, item: Self::In) -> Result<Self::Out> {
        let threshold = self.store.get_numeric("sdr_squelch")?;
        let Packet { data, meta } = item;

        let db = meta.db.unwrap_or(f32::NEG_INFINITY);
        let squelched = threshold >= f64::from(db);

        let mut meta = meta;
        meta.squelched = Some(squelched);

        let data = if squelched {
            vec![Sample::new(0.0, 0.0); data.len()]
        } else {
            data
        };

        Ok(Packet::with_meta(data, meta))
    }
}
