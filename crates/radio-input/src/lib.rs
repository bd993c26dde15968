//! Front-panel button input for the handheld SDR receiver: GPIO edge registration, debounce, and
//! the CASCADE auto-repeat state machine (§4.5).
//!
//! `radio-cli` owns the concrete [`gpio::Gpio`] implementation (a real interrupt source on
//! hardware); this crate only needs the trait to drive [`controller::InputController`], so tests
//! run entirely against [`gpio::MockGpio`] with no board present.
//!
//! # Modules
//!
//! - [`gpio`] — the [`gpio::Gpio`] collaborator trait and [`gpio::MockGpio`] test double.
//! - [`controller`] — [`controller::InputController`], per-pin debounce, and CASCADE auto-repeat.
//! - [`error`] — input configuration error values.

pub mod controller;
pub mod error;
pub mod gpio;

pub use controller::{InputController, PinConfig, PressType, CASCADE_INIT_DELAY};
pub use error::{InputError, Result};
pub use gpio::{Edge, Gpio, MockGpio};
