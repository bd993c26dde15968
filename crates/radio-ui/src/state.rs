//! The UI state snapshot and its publish/read mechanism (§3 "UIState snapshot", §5).
//!
//! The controller thread owns and mutates a `UiState`; the renderer thread only ever sees whole,
//! consistent snapshots of it. §4.8 calls for an `ArcSwap`-style whole-object publish rather than
//! field-wise mutation visible mid-update; since `arc-swap` is not in the teacher's dependency
//! tree, this is realized with `std::sync::RwLock<Arc<UiState>>` exactly as §4.8 names as the
//! fallback — the lock is only ever held for the instant of a pointer swap or clone, never across
//! a drawing pass.

use std::sync::{Arc, RwLock};
use std::time::Instant;

use crate::menu::Menu;
use crate::screens::Screens;

/// A consistent, point-in-time view of everything the renderer needs to draw a frame.
///
/// Cursor fields track which digit/tick the operator is currently editing on the corresponding
/// screen; their valid ranges are enforced by the controller's wrapping arithmetic, not by this
/// type (a plain snapshot, not a validated one).
#[derive(Debug, Clone)]
pub struct UiState {
    /// The screen currently being drawn/dispatched to.
    pub screen: Screens,
    /// FREQTUNE digit cursor, `0..7` (mod 8 per §9).
    pub ftune_cursor: u8,
    /// SQUELCH digit cursor, `0..3` (mod 4).
    pub squelch_cursor: u8,
    /// VOLUME digit cursor, `0..1` (mod 2).
    pub vol_cursor: u8,
    /// BANDWIDTH digit cursor, `0..4` (mod 5).
    pub bw_cursor: u8,
    /// Current center frequency in Hz, mirrored from `sdr_cf`.
    pub cf: f64,
    /// Current digital bandwidth in Hz, mirrored from `sdr_dig_bw`.
    pub bw: f64,
    /// Current squelch threshold in dB, mirrored from `sdr_squelch`.
    pub squelch: f64,
    /// Current speaker volume (0..100), mirrored from `spkr_volume`.
    pub vol: f64,
    /// Most recently observed signal strength in dB, from the DSP tap.
    pub db: f64,
    /// When the receiver started, for the FREQTUNE elapsed-runtime readout.
    pub start_time: Instant,
    /// Active demodulation scheme's display label ("FM"/"AM").
    pub demod_name: &'static str,
    /// The SETTINGS screen's menu, including its current selection/scroll position.
    pub settings_menu: Menu,
}

impl UiState {
    /// An initial snapshot reflecting the default parameter table (§6), with the clock started
    /// now and FREQTUNE as the startup screen.
    pub fn initial(cf: f64, bw: f64, squelch: f64, vol: f64, demod_name: &'static str, settings_menu: Menu) -> Self {
        Self {
            screen: Screens::FreqTune,
            ftune_cursor: 0,
            squelch_cursor: 0,
            vol_cursor: 0,
            bw_cursor: 0,
            cf,
            bw,
            squelch,
            vol,
            db: f64::NEG_INFINITY,
            start_time: Instant::now(),
            demod_name,
            settings_menu,
        }
    }
}

/// The publish/read half of the snapshot mechanism: the control thread calls [`publish`], the
/// renderer thread calls [`snapshot`]; both only ever see whole `UiState` values.
///
/// [`publish`]: UiStateHandle::publish
/// [`snapshot`]: UiStateHandle::snapshot
#[derive(Clone)]
pub struct UiStateHandle(Arc<RwLock<Arc<UiState>>>);

impl UiStateHandle {
    /// A handle seeded with an initial snapshot.
    pub fn new(initial: UiState) -> Self {
        Self(Arc::new(RwLock::new(Arc::new(initial))))
    }

    /// Publish a new whole snapshot, replacing the one the renderer currently sees.
    pub fn publish(&self, state: UiState) {
        *self.0.write().expect("ui state lock poisoned") = Arc::new(state);
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> Arc<UiState> {
        self.0.read().expect("ui state lock poisoned").clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::Menu;

    #[test]
    fn publish_then_snapshot_round_trips() {
        let handle = UiStateHandle::new(UiState::initial(88.3e6, 150e3, -20.0, 50.0, "FM", Menu::new("Settings", 3)));
        let first = handle.snapshot();
        assert_eq!(first.cf, 88.3e6);

        let mut updated = (*first).clone();
        updated.cf = 99.1e6;
        handle.publish(updated);

        let second = handle.snapshot();
        assert_eq!(second.cf, 99.1e6);
        assert_eq!(first.cf, 88.3e6, "earlier snapshot is unaffected by a later publish");
    }
}
