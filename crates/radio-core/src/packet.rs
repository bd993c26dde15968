//! The unit of data that travels through the DSP pipeline.
//!
//! A [`Packet`] carries a numeric vector whose element type evolves as it moves through the
//! chain (complex IQ at the source, real samples after demodulation) plus a small set of
//! recognized metadata fields. Unlike the original Python pipeline, where metadata was a mutable
//! dict shared in place, [`PacketMeta`] is a plain struct: a stage that wants to add a field
//! rebuilds the packet with `..meta` struct update syntax, so every write is visible at its call
//! site instead of hiding behind a shared mutable map.

use std::time::SystemTime;

/// A complex baseband IQ value.
pub type Sample = num_complex::Complex32;

/// A contiguous vector of real floats, mono — the unit the audio sink bridge hands off to the
/// audio callback (§3).
pub type AudioFrame = Vec<f32>;

/// The unit traveling through the DSP graph.
///
/// `T` is the element type of `data`: [`Sample`] before demodulation, `f32` after.
#[derive(Debug, Clone)]
pub struct Packet<T> {
    /// The numeric payload. Complex before `DemodulateRF`, real afterward.
    pub data: Vec<T>,
    /// Recognized, typed metadata. See [`PacketMeta`].
    pub meta: PacketMeta,
}

impl<T> Packet<T> {
    /// Create a packet with a freshly stamped timestamp and no other metadata set.
    pub fn new(data: Vec<T>) -> Self {
        Self {
            data,
            meta: PacketMeta::stamped(),
        }
    }

    /// Create a packet carrying existing metadata (used by stages that forward `meta` unchanged
    /// or rebuild it with a subset of fields overwritten).
    pub fn with_meta(data: Vec<T>, meta: PacketMeta) -> Self {
        Self { data, meta }
    }

    /// Replace `data` while carrying `meta` forward unmodified — the common case for a Worker
    /// stage that transforms the payload but has no contract to touch metadata.
    pub fn map_data<U>(self, data: Vec<U>) -> Packet<U> {
        Packet {
            data,
            meta: self.meta,
        }
    }
}

/// Recognized metadata fields carried alongside a [`Packet`]'s data.
///
/// Invariant (§3): once a field is set by some stage, later stages carry it forward unchanged
/// unless their contract is specifically to overwrite it. Because this is a plain struct instead
/// of a string-keyed map, "not yet set" is represented as `None`, and a stage that doesn't touch
/// a field simply doesn't mention it in its `PacketMeta { ..meta }` rebuild.
#[derive(Debug, Clone, Default)]
pub struct PacketMeta {
    /// Wall-clock time the packet's data was acquired (set once, at the source).
    pub timestamp: Option<SystemTime>,
    /// Measured signal strength in dB, filled by the `CalcDecibels` stage.
    pub db: Option<f32>,
    /// Whether the squelch stage judged this packet below threshold. Downstream stages skip
    /// heavy work when this is `true`.
    pub squelched: Option<bool>,
    /// Human-readable label of the active demodulation scheme, filled by `DemodulateRF`.
    pub demod_name: Option<&'static str>,
}

impl PacketMeta {
    /// A fresh metadata record with only `timestamp` set to now.
    pub fn stamped() -> Self {
        Self {
            timestamp: Some(SystemTime::now()),
            ..Self::default()
        }
    }

    /// Whether this packet was marked squelched. Treats "not yet evaluated" as not squelched,
    /// since only the `ApplySquelch` stage and stages downstream of it ever read this field.
    pub fn is_squelched(&self) -> bool {
        self.squelched.unwrap_or(false)
    }
}
