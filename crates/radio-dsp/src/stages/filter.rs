//! The `Filter` stage: a Butterworth low-pass, rebuilt whenever the channel bandwidth parameter
//! changes.

use std::sync::Arc;

use radio_core::error::Result;
use radio_core::packet::Packet;
use radio_core::stage::{Stage, StageKind};
use radio_core::ParameterStore;

use crate::filter::{design_butterworth_lowpass, DirectFormIir};

/// Low-passes real audio samples at `bw / 2`, where `bw` is read from the `sdr_dig_bw` parameter
/// on every packet. Rebuilds its [`DirectFormIir`] from scratch whenever the read value differs
/// from what it last designed against — the only way to guarantee no delay-line state survives a
/// coefficient change (§4.2).
pub struct Filter {
    store: Arc<ParameterStore>,
    bw_param: &'static str,
    sample_rate_hz: f64,
    order: usize,
    cached_bw_hz: f64,
    iir: DirectFormIir,
}

impl Filter {
    /// A Filter stage of the given `order`, operating at `sample_rate_hz`, reading its bandwidth
    /// from `bw_param` in `store`.
    pub fn new(store: Arc<ParameterStore>, bw_param: &'static str, sample_rate_hz: f64, order: usize) -> Result<Self> {
        let bw_hz = store.get_numeric(bw_param)?;
        let coeffs = design_butterworth_lowpass(order, bw_hz / 2.0, sample_rate_hz);
        Ok(Self {
            store,
            bw_param,
            sample_rate_hz,
            order,
            cached_bw_hz: bw_hz,
            iir: DirectFormIir::new(&coeffs),
        })
    }
}

impl Stage for Filter {
    type In = Packet<f32>;
    type Out = Packet<f32>;

    fn name(&self) -> &'static str {
        "Filter"
    }

    fn kind(&self) -> StageKind {
        StageKind::Worker
    }

    fn process(&mut self, item: Self::In) -> Result<Self::Out> {
        let bw_hz = self.store.get_numeric(self.bw_param)?;
        if (bw_hz - self.cached_bw_hz).abs() > f64::EPSILON {
            tracing::debug!(bw_hz, order = self.order, "rebuilding filter coefficients");
            let coeffs = design_butterworth_lowpass(self.order, bw_hz / 2.0, self.sample_rate_hz);
            self.iir = DirectFormIir::new(&coeffs);
            self.cached_bw_hz = bw_hz;
        }

        if item.meta.is_squelched() {
            return Ok(item);
        }

        let filtered = self.iir.process(&item.data);
        Ok(item.map_data(filtered))
    }
}
