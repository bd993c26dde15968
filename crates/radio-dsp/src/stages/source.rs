//! The DSP chain's only `Producer`: pulls fixed-size chunks from the SDR front-end.

use std::sync::Arc;

use radio_core::error::Result;
use radio_core::packet::{Packet, Sample};
use radio_core::stage::{Producer, Sentinel};
use radio_core::StopFlag;
use radio_io::SdrHandle;

use crate::error::fatal;

/// Pulls `spb` (samples-per-block) complex chunks off an [`SdrHandle`] and wraps each in a fresh
/// [`Packet`] (§4.2). The only stage that checks the shared [`StopFlag`] directly — every other
/// stage learns the pipeline is ending by observing the `None` sentinel propagate from here.
pub struct ProvideRawRf {
    sdr: Arc<dyn SdrHandle>,
    spb: usize,
    stop: StopFlag,
}

impl ProvideRawRf {
    /// A source pulling `spb`-sample chunks from `sdr`, watching `stop` for a clean shutdown
    /// request.
    pub fn new(sdr: Arc<dyn SdrHandle>, spb: usize, stop: StopFlag) -> Self {
        Self { sdr, spb, stop }
    }
}

impl Producer for ProvideRawRf {
    type Out = Packet<Sample>;

    fn name(&self) -> &'static str {
        "ProvideRawRF"
    }

    fn produce(&mut self) -> Sentinel<Result<Self::Out>> {
        if self.stop.is_set() {
            let _ = self.sdr.stop();
            let _ = self.sdr.close();
            return None;
        }

        match self.sdr.recv_chunk(self.spb) {
            Ok(data) => Some(Ok(Packet::new(data))),
            Err(e) => {
                let _ = self.sdr.stop();
                let _ = self.sdr.close();
                Some(Err(fatal("ProvideRawRF", e)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radio_io::{MockSdrDevice, SharedSdr};

    #[test]
    fn yields_requested_chunk_size_until_stopped() {
        let sdr = SharedSdr::new(MockSdrDevice::new(100e6, 250_000.0, 1000.0));
        let stop = StopFlag::new();
        let mut source = ProvideRawRf::new(sdr, 128, stop.clone());

        let packet = source.produce().unwrap().unwrap();
        assert_eq!(packet.data.len(), 128);

        stop.set();
        assert!(source.produce().is_none());
    }

    #[test]
    fn device_error_is_fatal_and_ends_the_stream() {
        let sdr = SharedSdr::new(MockSdrDevice::new(100e6, 250_000.0, 1000.0));
        let device_handle = sdr.clone();
        let stop = StopFlag::new();
        let mut source = ProvideRawRf::new(sdr, 64, stop);

        device_handle.stop().unwrap();
        assert!(source.produce().unwrap().is_err());
    }
}
