//! `RechunkArray`: regroups a stream of variable-length audio chunks into fixed-size blocks.
//!
//! Unlike every other stage in this module, `RechunkArray` does not have a 1:1 input/output
//! cardinality — one input chunk can complete zero, one, or several output blocks depending on how
//! much is already buffered (§4.2, §8 scenario S3). That rules out [`radio_core::stage::Stage`],
//! which assumes exactly one output per input; `RechunkArray` instead exposes [`push`], returning
//! whatever full blocks the new data completed, and is driven directly by the pipeline wiring
//! rather than folded into a static [`radio_core::stage::Chain`].

use radio_core::packet::Packet;

/// Buffers incoming `data` until `target_block_size` samples have accumulated, then emits one
/// [`Packet`] per full block. A final, partial buffer below the target size is simply dropped on
/// shutdown — never padded or emitted short (§4.2, §8 S3: "leftover... retained [until the next
/// push], not flushed").
pub struct RechunkArray {
    target_block_size: usize,
    partial: Vec<f32>,
}

impl RechunkArray {
    /// Regroup into blocks of exactly `target_block_size` samples.
    pub fn new(target_block_size: usize) -> Self {
        Self {
            target_block_size,
            partial: Vec::with_capacity(target_block_size),
        }
    }

    /// Append `item`'s data to the internal buffer, returning every full block it completed, in
    /// order. Each emitted block carries the metadata of whichever input packet most recently
    /// contributed to it.
    pub fn push(&mut self, item: Packet<f32>) -> Vec<Packet<f32>> {
        let Packet { data, meta } = item;

        let mut out = Vec::new();
        let mut offset = 0;
        while offset < data.len() {
            let room = self.target_block_size - self.partial.len();
            let take = room.min(data.len() - offset);
            self.partial.extend_from_slice(&data[offset..offset + take]);
            offset += take;

            if self.partial.len() == self.target_block_size {
                let block = std::mem::replace(&mut self.partial, Vec::with_capacity(self.target_block_size));
                out.push(Packet::with_meta(block, meta.clone()));
            }
        }
        out
    }

    /// Samples currently buffered but not yet forming a full block.
    pub fn pending_len(&self) -> usize {
        self.partial.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radio_core::packet::PacketMeta;

    fn packet(data: Vec<f32>) -> Packet<f32> {
        Packet::with_meta(data, PacketMeta::stamped())
    }

    #[test]
    fn accumulates_partial_blocks_until_full() {
        let mut rechunk = RechunkArray::new(4096);

        let out1 = rechunk.push(packet(vec![1.0; 3000]));
        assert!(out1.is_empty());
        assert_eq!(rechunk.pending_len(), 3000);

        let out2 = rechunk.push(packet(vec![2.0; 3000]));
        assert_eq!(out2.len(), 1);
        assert_eq!(out2[0].data.len(), 4096);
        assert_eq!(rechunk.pending_len(), 1904);

        let out3 = rechunk.push(packet(vec![3.0; 3000]));
        assert_eq!(out3.len(), 1);
        assert_eq!(out3[0].data.len(), 4096);
        assert_eq!(rechunk.pending_len(), 808);
    }

    #[test]
    fn block_boundary_matches_input_boundary_exactly() {
        let mut rechunk = RechunkArray::new(1024);
        let out = rechunk.push(packet(vec![0.0; 1024]));
        assert_eq!(out.len(), 1);
        assert_eq!(rechunk.pending_len(), 0);
    }

    #[test]
    fn a_single_push_can_complete_more_than_one_block() {
        let mut rechunk = RechunkArray::new(100);
        let out = rechunk.push(packet(vec![0.0; 250]));
        assert_eq!(out.len(), 2);
        assert_eq!(rechunk.pending_len(), 50);
    }
}
