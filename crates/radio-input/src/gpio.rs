//! The GPIO collaborator this crate consumes (§6, §4.5).
//!
//! Object-safe, boxed-callback shaped — mirrors `sonido-io::backend::AudioBackend`'s own
//! boxed-closure idiom for decoupling from a specific platform API. A real implementation wires
//! `on_edge` to the board's interrupt source; [`MockGpio`] lets tests fire edges synchronously with
//! no hardware at all.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// A GPIO pin transition. Board wiring is pull-up (§6): a button press pulls the pin low, so
/// pressing fires [`Edge::Falling`] and releasing fires [`Edge::Rising`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Pin transitioned high → low (button pressed, given pull-up wiring).
    Falling,
    /// Pin transitioned low → high (button released).
    Rising,
}

/// Board-numbered GPIO pins with edge-triggered callbacks and integer debounce (§6).
pub trait Gpio: Send + Sync {
    /// Register `callback` to run on every edge transition observed on `pin`, debounced to at
    /// least `debounce`. Implementations honor debounce in whatever way their interrupt source
    /// supports; [`MockGpio`] does not debounce at all, since tests drive edges explicitly.
    fn on_edge(&self, pin: u8, debounce: Duration, callback: Box<dyn Fn(Edge) + Send + Sync>);
}

/// A deterministic test double: holds the edge callback registered per pin and lets a test fire
/// edges directly, with no real interrupt source or timing involved.
#[derive(Default)]
pub struct MockGpio {
    callbacks: Mutex<HashMap<u8, Box<dyn Fn(Edge) + Send + Sync>>>,
}

impl MockGpio {
    /// An empty mock with no pins registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Synchronously invoke `pin`'s registered callback with `edge`, as if the board's interrupt
    /// source had just observed that transition. A no-op if nothing is registered on `pin`.
    pub fn fire(&self, pin: u8, edge: Edge) {
        let callbacks = self.callbacks.lock().expect("mock gpio lock poisoned");
        if let Some(callback) = callbacks.get(&pin) {
            callback(edge);
        }
    }
}

impl Gpio for MockGpio {
    fn on_edge(&self, pin: u8, _debounce: Duration, callback: Box<dyn Fn(Edge) + Send + Sync>) {
        self.callbacks
            .lock()
            .expect("mock gpio lock poisoned")
            .insert(pin, callback);
    }
}
