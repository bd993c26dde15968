//! The chain's two tail stages: one forwards `data` to the audio callback's bounded queue, the
//! other taps `meta` off to the UI before the audio sink drains it.

use radio_core::packet::{Packet, PacketMeta};
use radio_core::stage::{EndpointStage, Stage, StageKind};
use radio_core::AudioFrame;

/// Forwards each packet's `meta` to the UI's snapshot channel, unchanged otherwise — a Window
/// stage (§4.2: "two trivial Windows that forward `data`... and `meta`... respectively").
///
/// Blocks the DSP thread rather than dropping a packet: §5 requires every cross-domain queue,
/// including DSP→UI, to apply backpressure instead of dropping. The UI control thread drains this
/// channel continuously (`crossbeam_channel::select!` alongside the button queue), so it stays
/// far from full in practice.
pub struct UiSnapshotTap {
    tx: crossbeam_channel::Sender<PacketMeta>,
}

impl UiSnapshotTap {
    /// Tap metadata off to `tx`.
    pub fn new(tx: crossbeam_channel::Sender<PacketMeta>) -> Self {
        Self { tx }
    }
}

impl Stage for UiSnapshotTap {
    type In = Packet<f32>;
    type Out = Packet<f32>;

    fn name(&self) -> &'static str {
        "UiSnapshotTap"
    }

    fn kind(&self) -> StageKind {
        StageKind::Window
    }

    fn process(&mut self, item: Self::In) -> radio_core::error::Result<Self::Out> {
        // The receiver side is the UI control thread; a disconnect here only happens during
        // shutdown, and the pipeline is already tearing down by then.
        let _ = self.tx.send(item.meta.clone());
        Ok(item)
    }
}

/// The chain's terminal stage: hands `data` off to the audio callback's bounded queue
/// (§4.2, §4.4). Blocks the DSP thread rather than dropping a frame — backpressure, not loss,
/// is this stage's contract with the bounded queue (§5).
pub struct AudioTailSink {
    tx: crossbeam_channel::Sender<AudioFrame>,
}

impl AudioTailSink {
    /// Drain into `tx`.
    pub fn new(tx: crossbeam_channel::Sender<AudioFrame>) -> Self {
        Self { tx }
    }
}

impl EndpointStage for AudioTailSink {
    type In = Packet<f32>;

    fn name(&self) -> &'static str {
        "AudioTailSink"
    }

    fn drain(&mut self, item: Self::In) {
        // The receiver side is the audio callback's stream; a disconnect here only happens during
        // shutdown, and the pipeline is already tearing down by then.
        let _ = self.tx.send(item.data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_tap_forwards_meta_and_passes_data_through_unchanged() {
        let (tx, rx) = crossbeam_channel::bounded(2);
        let mut tap = UiSnapshotTap::new(tx);

        let first = tap.process(Packet::new(vec![1.0])).unwrap();
        let second = tap.process(Packet::new(vec![2.0])).unwrap();

        assert_eq!(first.data, vec![1.0]);
        assert_eq!(second.data, vec![2.0]);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn audio_sink_forwards_data_to_the_queue() {
        let (tx, rx) = crossbeam_channel::bounded(4);
        let mut sink = AudioTailSink::new(tx);
        sink.drain(Packet::new(vec![0.1, 0.2, 0.3]));
        assert_eq!(rx.try_recv().unwrap(), vec![0.1, 0.2, 0.3]);
    }
}
