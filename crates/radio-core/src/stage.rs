//! The stage abstraction every pipeline node implements, and the static `Chain` combinator used
//! to compose them.
//!
//! Generalizes `sonido-core`'s `Effect`/`EffectExt`/`Chain` trio (sample-by-sample audio effect
//! composition) to Packet-at-a-time DSP stages that can change element type partway through the
//! chain — complex IQ at the front, real samples after `DemodulateRF`. Static composition via
//! [`Chain`] means the compiler checks that adjacent stages' types actually line up; there is no
//! runtime "does this stage accept this packet" check anywhere in the hot path.

use crate::error::Result;

/// The role a pipeline node plays, per §4.1. Stored for introspection/logging and asserted in
/// tests; the Rust type system (not this tag) is what actually prevents, e.g., wiring an
/// `Endpoint` upstream of another stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    /// Owns an outbox; no upstream source (the SDR source).
    Producer,
    /// Has a single source, no outbox; drains to keep the upstream queue bounded.
    Consumer,
    /// Producer + Consumer; transforms `data` and forwards.
    Worker,
    /// Producer + Consumer; inspects/overwrites the packet but never changes its *role* in the
    /// chain (CalcDecibels, ApplySquelch, DemodulateRF, AdjustVolume).
    Window,
    /// Consumer only; terminal, never emits.
    Endpoint,
}

/// The end-of-stream sentinel: `None` propagating through the chain, exactly as in the original
/// design (§4.1 "a single distinguished `None` sentinel").
pub type Sentinel<T> = Option<T>;

/// A stage that transforms one item into another, synchronously, with no internal threading of
/// its own. Implements both the spec's `Worker` and `Window` roles — the distinction between them
/// is about *what* a stage does to a packet (replace `data` vs. inspect/conditionally zero it),
/// not a difference this trait needs to enforce structurally.
pub trait Stage: Send {
    /// Element type this stage consumes.
    type In;
    /// Element type this stage produces. Equal to `In` for every stage except `DemodulateRF`.
    type Out;

    /// Stage name, used in logs and `StageError`.
    fn name(&self) -> &'static str;

    /// The role this stage plays (for introspection/tests only).
    fn kind(&self) -> StageKind {
        StageKind::Worker
    }

    /// Transform one item. A fatal error here cancels the whole pipeline (§7).
    fn process(&mut self, item: Self::In) -> Result<Self::Out>;
}

/// Blanket extension trait providing `.chain()` for static stage composition.
pub trait StageExt: Stage + Sized {
    /// Compose this stage with `next`, producing a single stage whose `In` is this stage's `In`
    /// and whose `Out` is `next`'s `Out`. Zero-cost: `Chain::process` is two back-to-back calls,
    /// inlined by the optimizer in release builds.
    fn chain<B: Stage<In = Self::Out>>(self, next: B) -> Chain<Self, B> {
        Chain {
            first: self,
            second: next,
        }
    }
}

impl<S: Stage> StageExt for S {}

/// Static composition of two stages, formed by [`StageExt::chain`].
pub struct Chain<A, B> {
    first: A,
    second: B,
}

impl<A: Stage, B: Stage<In = A::Out>> Stage for Chain<A, B> {
    type In = A::In;
    type Out = B::Out;

    fn name(&self) -> &'static str {
        "chain"
    }

    fn process(&mut self, item: Self::In) -> Result<Self::Out> {
        let mid = self.first.process(item)?;
        self.second.process(mid)
    }
}

/// A stage with no upstream source — the `ProvideRawRF` source stage's role (§4.2).
///
/// `produce` returns `None` on graceful end of stream (external source exhausted or the stop flag
/// was observed) and `Some(Err(..))` on a fatal error (§7).
pub trait Producer: Send {
    /// Element type this producer yields.
    type Out;

    /// Producer name, used in logs.
    fn name(&self) -> &'static str;

    /// Produce the next item, or `None` at end of stream.
    fn produce(&mut self) -> Sentinel<Result<Self::Out>>;
}

/// Folds a homogeneous stage (or `Chain`) onto a [`Producer`]'s output, so a front-end segment of
/// same-typed stages (e.g. `CalcDecibels` then `ApplySquelch`, both complex-in/complex-out) can be
/// treated as a single producer by whatever consumes it next. This is how a type-changing stage
/// like `DemodulateRF` gets to sit between two otherwise-homogeneous stretches of the pipeline
/// without the whole chain needing one uniform element type end to end.
pub struct ProducerThen<P, S> {
    producer: P,
    stage: S,
}

impl<P, S> ProducerThen<P, S>
where
    P: Producer,
    S: Stage<In = P::Out, Out = P::Out>,
{
    /// Fold `stage` onto `producer`'s output.
    pub fn new(producer: P, stage: S) -> Self {
        Self { producer, stage }
    }
}

impl<P, S> Producer for ProducerThen<P, S>
where
    P: Producer,
    S: Stage<In = P::Out, Out = P::Out>,
{
    type Out = P::Out;

    fn name(&self) -> &'static str {
        self.stage.name()
    }

    fn produce(&mut self) -> Sentinel<Result<Self::Out>> {
        match self.producer.produce()? {
            Ok(item) => Some(self.stage.process(item)),
            Err(e) => Some(Err(e)),
        }
    }
}

/// A terminal stage with no outbox — the `Endpoint` role (§4.1). Drains its source to keep the
/// upstream bounded but never emits.
pub trait EndpointStage: Send {
    /// Element type this endpoint consumes.
    type In;

    /// Endpoint name, used in logs.
    fn name(&self) -> &'static str;

    /// Consume one item.
    fn drain(&mut self, item: Self::In);
}
