//! The DSP stage implementations that make up the receiver's signal-processing chain (§4.2).
//!
//! Every stage implements [`radio_core::stage::Stage`] (or, for the source, [`radio_core::stage::Producer`];
//! for [`stages::RechunkArray`], neither — see its module docs) and is composed into the running
//! chain by `radio-cli` at startup. This crate owns the stages' internals; it does not wire them
//! together itself, since the wiring depends on `radio-io` handles and a `ParameterStore` that
//! only exist once the process has actually started.
//!
//! # Modules
//!
//! - [`demod`] — the [`demod::DemodScheme`] selector shared between `DemodulateRf` and the UI.
//! - [`filter`] — Butterworth coefficient design and the direct-form IIR that applies them.
//! - [`stages`] — the concrete [`radio_core::stage::Stage`] implementations, in chain order.
//! - [`error`] — stage-local error values and the [`error::fatal`] helper.

pub mod demod;
pub mod error;
pub mod filter;
pub mod stages;

pub use demod::{DemodControl, DemodScheme, SharedDemodScheme};
pub use error::StageError;
pub use filter::{design_butterworth_lowpass, DirectFormIir, IirCoeffs};
