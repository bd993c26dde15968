//! Every concrete DSP stage (§4.2), in chain order.

pub mod decibels;
pub mod demod;
pub mod downsample;
pub mod filter;
pub mod rechunk;
pub mod reshape;
pub mod sink;
pub mod source;
pub mod squelch;
pub mod volume;

pub use decibels::CalcDecibels;
pub use demod::DemodulateRf;
pub use downsample::Downsample;
pub use filter::Filter;
pub use rechunk::RechunkArray;
pub use reshape::ReshapeArray;
pub use sink::{AudioTailSink, UiSnapshotTap};
pub use source::ProvideRawRf;
pub use squelch::ApplySquelch;
pub use volume::AdjustVolume;
