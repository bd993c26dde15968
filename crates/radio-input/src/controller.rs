//! Per-pin registration, debounce, and the CASCADE auto-repeat state machine (§4.5).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;

use crate::error::{InputError, Result};
use crate::gpio::{Edge, Gpio};

/// How a registered pin maps an edge (or held-down period) to events (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressType {
    /// Emit once on the falling edge (press).
    Down,
    /// Emit once on the rising edge (release).
    Up,
    /// Emit once on both edges.
    Both,
    /// Emit once immediately on press, then auto-repeat while held (the CASCADE state machine).
    Cascade,
}

/// Auto-repeat arming delay: how long a CASCADE pin must stay pressed after the initial edge
/// before the state machine transitions `FIRE_ONCE` → `REPEATING` (§4.5).
pub const CASCADE_INIT_DELAY: Duration = Duration::from_millis(500);

/// A single pin's registration: `(pin, event, press_type, debounce_time, cascade_delay)` (§4.5).
#[derive(Debug, Clone)]
pub struct PinConfig<E> {
    /// Board-numbered GPIO pin.
    pub pin: u8,
    /// Event emitted for this pin.
    pub event: E,
    /// How edges map to emitted events.
    pub press_type: PressType,
    /// Minimum time between accepted edges for non-cascade press types.
    pub debounce: Duration,
    /// Repeat interval once a CASCADE pin is in the `REPEATING` state. Ignored for other press
    /// types.
    pub cascade_delay: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CascadeState {
    Idle,
    FireOnce,
    Repeating,
}

struct CascadeHandle {
    active: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

/// Owns every registered pin's debounce/cascade bookkeeping and the background threads that drive
/// CASCADE auto-repeat, emitting events of type `E` onto a shared channel.
pub struct InputController<E> {
    cascades: Vec<CascadeHandle>,
    _marker: std::marker::PhantomData<E>,
}

impl<E: Clone + Send + Sync + 'static> InputController<E> {
    /// Register every pin in `configs` against `gpio`, emitting onto `tx`. Rejects a duplicate pin
    /// number as a configuration error (§7: "pin registered twice").
    pub fn new(gpio: &dyn Gpio, configs: Vec<PinConfig<E>>, tx: Sender<E>) -> Result<Self> {
        let mut seen = std::collections::HashSet::new();
        for config in &configs {
            if !seen.insert(config.pin) {
                return Err(InputError::DuplicatePin(config.pin));
            }
        }

        let mut cascades = Vec::new();
        for config in configs {
            match config.press_type {
                PressType::Cascade => cascades.push(Self::spawn_cascade(gpio, config, tx.clone())),
                _ => Self::register_simple(gpio, config, tx.clone()),
            }
        }

        Ok(Self {
            cascades,
            _marker: std::marker::PhantomData,
        })
    }

    fn register_simple(gpio: &dyn Gpio, config: PinConfig<E>, tx: Sender<E>) {
        let last_emit: Arc<Mutex<Option<Instant>>> = Arc::new(Mutex::new(None));
        let debounce = config.debounce;
        let press_type = config.press_type;
        let event = config.event;

        gpio.on_edge(
            config.pin,
            debounce,
            Box::new(move |edge| {
                let fires = matches!(
                    (press_type, edge),
                    (PressType::Down, Edge::Falling) | (PressType::Up, Edge::Rising) | (PressType::Both, _)
                );
                if !fires {
                    return;
                }

                let now = Instant::now();
                let mut last = last_emit.lock().expect("debounce lock poisoned");
                if last.is_some_and(|t| now.duration_since(t) < debounce) {
                    return;
                }
                *last = Some(now);
                let _ = tx.send(event.clone());
            }),
        );
    }

    /// Spawn the sender thread for one CASCADE pin and wire its edge callback (§4.5's
    /// `IDLE → FIRE_ONCE → REPEATING` machine, "sender runs on a background thread... parked/
    /// unparked").
    fn spawn_cascade(gpio: &dyn Gpio, config: PinConfig<E>, tx: Sender<E>) -> CascadeHandle {
        let state = Arc::new(Mutex::new(CascadeState::Idle));
        let pin_pressed = Arc::new(AtomicBool::new(false));
        let active = Arc::new(AtomicBool::new(true));
        let init_delay = CASCADE_INIT_DELAY;
        let repeat_delay = config.cascade_delay;
        let event = config.event.clone();

        let thread_state = state.clone();
        let thread_pressed = pin_pressed.clone();
        let thread_active = active.clone();
        let thread_tx = tx.clone();
        let thread = std::thread::spawn(move || {
            cascade_sender_loop(
                event,
                init_delay,
                repeat_delay,
                thread_pressed,
                thread_state,
                thread_active,
                thread_tx,
            );
        });
        let sender_thread = thread.thread().clone();

        let callback_state = state;
        let callback_pressed = pin_pressed;
        gpio.on_edge(
            config.pin,
            config.debounce,
            Box::new(move |edge| {
                match edge {
                    Edge::Falling => {
                        callback_pressed.store(true, Ordering::Release);
                        let mut state = callback_state.lock().expect("cascade state lock poisoned");
                        if *state == CascadeState::Idle {
                            *state = CascadeState::FireOnce;
                            let _ = tx.send(config.event.clone());
                        }
                    }
                    Edge::Rising => {
                        callback_pressed.store(false, Ordering::Release);
                        *callback_state.lock().expect("cascade state lock poisoned") = CascadeState::Idle;
                    }
                }
                sender_thread.unpark();
            }),
        );

        CascadeHandle { active, thread }
    }

    /// Signal every CASCADE sender thread to exit and wait for them to join — part of the
    /// `SIGINT`/`SIGTERM` shutdown path (§4.8, §8 S6: "no GPIO pins left configured").
    pub fn shutdown(self) {
        for cascade in &self.cascades {
            cascade.active.store(false, Ordering::Release);
            cascade.thread.thread().unpark();
        }
        for cascade in self.cascades {
            let _ = cascade.thread.join();
        }
    }
}

fn cascade_sender_loop<E: Clone>(
    event: E,
    init_delay: Duration,
    repeat_delay: Duration,
    pin_pressed: Arc<AtomicBool>,
    state: Arc<Mutex<CascadeState>>,
    active: Arc<AtomicBool>,
    tx: Sender<E>,
) {
    while active.load(Ordering::Acquire) {
        std::thread::park();
        if !active.load(Ordering::Acquire) {
            break;
        }
        if !pin_pressed.load(Ordering::Acquire) {
            continue;
        }

        std::thread::park_timeout(init_delay);
        if !active.load(Ordering::Acquire) {
            break;
        }
        if !pin_pressed.load(Ordering::Acquire) {
            continue;
        }

        *state.lock().expect("cascade state lock poisoned") = CascadeState::Repeating;
        while pin_pressed.load(Ordering::Acquire) && active.load(Ordering::Acquire) {
            let _ = tx.send(event.clone());
            std::thread::park_timeout(repeat_delay);
        }
        *state.lock().expect("cascade state lock poisoned") = CascadeState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::MockGpio;
    use std::time::Duration;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestEvent {
        Up,
        Ok,
    }

    #[test]
    fn down_press_type_fires_once_on_falling_edge() {
        let gpio = MockGpio::new();
        let (tx, rx) = crossbeam_channel::unbounded();
        let _controller = InputController::new(
            &gpio,
            vec![PinConfig {
                pin: 5,
                event: TestEvent::Up,
                press_type: PressType::Down,
                debounce: Duration::from_millis(10),
                cascade_delay: Duration::from_millis(200),
            }],
            tx,
        )
        .unwrap();

        gpio.fire(5, Edge::Falling);
        gpio.fire(5, Edge::Rising);
        assert_eq!(rx.try_recv(), Ok(TestEvent::Up));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn duplicate_pin_registration_is_rejected() {
        let gpio = MockGpio::new();
        let (tx, _rx) = crossbeam_channel::unbounded();
        let result = InputController::new(
            &gpio,
            vec![
                PinConfig {
                    pin: 5,
                    event: TestEvent::Up,
                    press_type: PressType::Down,
                    debounce: Duration::from_millis(10),
                    cascade_delay: Duration::from_millis(200),
                },
                PinConfig {
                    pin: 5,
                    event: TestEvent::Ok,
                    press_type: PressType::Down,
                    debounce: Duration::from_millis(10),
                    cascade_delay: Duration::from_millis(200),
                },
            ],
            tx,
        );
        assert!(matches!(result, Err(InputError::DuplicatePin(5))));
    }

    #[test]
    fn cascade_fires_once_immediately_then_repeats_while_held() {
        let gpio = MockGpio::new();
        let (tx, rx) = crossbeam_channel::unbounded();
        let controller = InputController::new(
            &gpio,
            vec![PinConfig {
                pin: 2,
                event: TestEvent::Ok,
                press_type: PressType::Cascade,
                debounce: Duration::from_millis(5),
                cascade_delay: Duration::from_millis(20),
            }],
            tx,
        )
        .unwrap();

        gpio.fire(2, Edge::Falling);
        assert_eq!(rx.recv_timeout(Duration::from_millis(100)), Ok(TestEvent::Ok));

        // Still held past CASCADE_INIT_DELAY: expect at least one repeat.
        let repeated = rx.recv_timeout(CASCADE_INIT_DELAY + Duration::from_millis(200));
        assert_eq!(repeated, Ok(TestEvent::Ok));

        gpio.fire(2, Edge::Rising);
        controller.shutdown();
    }
}
