//! The control task: translates button events (and DSP metadata taps) into parameter mutations
//! and published snapshots (§4.6).
//!
//! Each button-event handler is a short rule table dispatched on the current screen, exactly as
//! §4.6 describes. The shared "digit cursor selects a step-ladder rung" behavior used by
//! FREQTUNE/SQUELCH/VOLUME/BANDWIDTH is factored into [`step_numeric_with_cursor`] rather than
//! duplicated four times; FREQTUNE additionally retunes the SDR on a value change, which the other
//! three screens don't need (the `Filter` stage already rereads `sdr_dig_bw` on every packet).

use std::sync::Arc;
use std::time::Instant;

use radio_core::packet::PacketMeta;
use radio_core::param::{ParameterStore, StepDirection};
use radio_dsp::DemodControl;
use radio_io::SdrControl;

use crate::error::Result;
use crate::menu::{Menu, MenuAction, MenuOption};
use crate::screens::{BtnEvent, Screens};
use crate::state::{UiState, UiStateHandle};

const PARAM_SDR_CF: &str = "sdr_cf";
const PARAM_SDR_SQUELCH: &str = "sdr_squelch";
const PARAM_SPKR_VOLUME: &str = "spkr_volume";
const PARAM_SDR_DIG_BW: &str = "sdr_dig_bw";

/// FREQTUNE's digit cursor has 8 slots, matching `sdr_cf`'s 8-rung step ladder (§9).
const FTUNE_CURSOR_MOD: u8 = 8;
/// SQUELCH's digit cursor has 4 slots, matching `sdr_squelch`'s 4-rung step ladder.
const SQUELCH_CURSOR_MOD: u8 = 4;
/// VOLUME's digit cursor has 2 slots, matching `spkr_volume`'s 2-rung step ladder.
const VOL_CURSOR_MOD: u8 = 2;
/// BANDWIDTH's digit cursor has 5 slots, matching `sdr_dig_bw`'s 5-rung step ladder.
const BW_CURSOR_MOD: u8 = 5;

/// What a cursor-bearing numeric adjustment did, so the caller can tell whether the underlying
/// value actually changed (and e.g. needs to be pushed out to a hardware collaborator).
enum NumericEdit {
    /// `Up`/`Down`: the value stepped; carries the new value.
    Stepped(f64),
    /// `Left`/`Right`: the cursor and step-ladder rung moved; the value itself is unchanged.
    CursorMoved,
    /// Any other event: not handled by this adjustment.
    Ignored,
}

/// Step `name`'s value up/down, or rotate `cursor`'s step-ladder rung left/right, wrapping modulo
/// `modulus`. A free function rather than a method so the caller can pass `&mut self.some_cursor`
/// alongside `&self.store` without the borrow checker treating them as overlapping.
fn step_numeric_with_cursor(
    store: &ParameterStore,
    name: &str,
    cursor: &mut u8,
    modulus: u8,
    event: BtnEvent,
) -> Result<NumericEdit> {
    match event {
        BtnEvent::Up => {
            store.with_numeric_mut(name, |p| p.step(StepDirection::Up))?;
            Ok(NumericEdit::Stepped(store.get_numeric(name)?))
        }
        BtnEvent::Down => {
            store.with_numeric_mut(name, |p| p.step(StepDirection::Down))?;
            Ok(NumericEdit::Stepped(store.get_numeric(name)?))
        }
        BtnEvent::Left => {
            *cursor = (*cursor + modulus - 1) % modulus;
            store.with_numeric_mut(name, |p| p.cycle_step_size(StepDirection::Down))?;
            Ok(NumericEdit::CursorMoved)
        }
        BtnEvent::Right => {
            *cursor = (*cursor + 1) % modulus;
            store.with_numeric_mut(name, |p| p.cycle_step_size(StepDirection::Up))?;
            Ok(NumericEdit::CursorMoved)
        }
        _ => Ok(NumericEdit::Ignored),
    }
}

/// Owns the current screen, digit cursors, settings menu, and the most recent DSP metadata tap;
/// dispatches button events to per-screen handlers and publishes an updated [`UiState`] snapshot
/// after every handled event (§4.6).
pub struct UiController {
    store: Arc<ParameterStore>,
    sdr_control: Arc<dyn SdrControl>,
    demod_control: Arc<dyn DemodControl>,
    state: UiStateHandle,
    screen: Screens,
    ftune_cursor: u8,
    squelch_cursor: u8,
    vol_cursor: u8,
    bw_cursor: u8,
    settings_menu: Menu,
    last_db: f64,
    start_time: Instant,
}

impl UiController {
    /// Build a controller over the shared parameter store and device control traits, with a
    /// freshly built settings menu (one row per adjustable screen), and publish the initial
    /// snapshot to `state`.
    pub fn new(
        store: Arc<ParameterStore>,
        sdr_control: Arc<dyn SdrControl>,
        demod_control: Arc<dyn DemodControl>,
        state: UiStateHandle,
    ) -> Self {
        let mut settings_menu = Menu::new("Settings", 3);
        settings_menu.register_option(MenuOption::new("Frequency", MenuAction::Goto(Screens::FreqTune)));
        settings_menu.register_option(MenuOption::new("Squelch", MenuAction::Goto(Screens::Squelch)));
        settings_menu.register_option(MenuOption::new("Volume", MenuAction::Goto(Screens::Volume)));
        settings_menu.register_option(MenuOption::new("Bandwidth", MenuAction::Goto(Screens::Bandwidth)));
        settings_menu.register_option(MenuOption::new("Demod scheme", MenuAction::Goto(Screens::Demod)));

        let mut controller = Self {
            store,
            sdr_control,
            demod_control,
            state,
            screen: Screens::FreqTune,
            ftune_cursor: 0,
            squelch_cursor: 0,
            vol_cursor: 0,
            bw_cursor: 0,
            settings_menu,
            last_db: f64::NEG_INFINITY,
            start_time: Instant::now(),
        };
        controller.publish();
        controller
    }

    /// Dispatch one button event: `M1` always enters SETTINGS, everything else is routed to the
    /// current screen's handler. Publishes an updated snapshot afterward.
    pub fn handle_event(&mut self, event: BtnEvent) -> Result<()> {
        if event == BtnEvent::M1 {
            self.screen = Screens::Settings;
        } else {
            match self.screen {
                Screens::FreqTune => self.handle_freq_tune(event)?,
                Screens::Settings => self.handle_settings(event),
                Screens::Squelch => self.handle_squelch(event)?,
                Screens::Volume => self.handle_vol(event)?,
                Screens::Demod => self.handle_demod(event),
                Screens::Bandwidth => self.handle_bw(event)?,
            }
        }
        self.publish();
        Ok(())
    }

    /// Absorb a metadata tap off the DSP tail (§4.2's "HW snapshot" Window) and publish an updated
    /// snapshot so the dB readout stays live between button presses.
    pub fn observe_meta(&mut self, meta: &PacketMeta) {
        if let Some(db) = meta.db {
            self.last_db = db as f64;
        }
        self.publish();
    }

    fn handle_freq_tune(&mut self, event: BtnEvent) -> Result<()> {
        let edit = step_numeric_with_cursor(&self.store, PARAM_SDR_CF, &mut self.ftune_cursor, FTUNE_CURSOR_MOD, event)?;
        if let NumericEdit::Stepped(hz) = edit {
            self.sdr_control.set_center_freq(hz)?;
        }
        Ok(())
    }

    fn handle_squelch(&mut self, event: BtnEvent) -> Result<()> {
        step_numeric_with_cursor(&self.store, PARAM_SDR_SQUELCH, &mut self.squelch_cursor, SQUELCH_CURSOR_MOD, event)?;
        Ok(())
    }

    fn handle_vol(&mut self, event: BtnEvent) -> Result<()> {
        step_numeric_with_cursor(&self.store, PARAM_SPKR_VOLUME, &mut self.vol_cursor, VOL_CURSOR_MOD, event)?;
        Ok(())
    }

    fn handle_bw(&mut self, event: BtnEvent) -> Result<()> {
        step_numeric_with_cursor(&self.store, PARAM_SDR_DIG_BW, &mut self.bw_cursor, BW_CURSOR_MOD, event)?;
        Ok(())
    }

    /// DEMOD has exactly two states, so `Up`/`Down`/`Ok` all perform the one meaningful action:
    /// toggle to the other scheme.
    fn handle_demod(&mut self, event: BtnEvent) {
        if matches!(event, BtnEvent::Up | BtnEvent::Down | BtnEvent::Ok) {
            let next = self.demod_control.scheme().toggled();
            self.demod_control.set_scheme(next);
        }
    }

    fn handle_settings(&mut self, event: BtnEvent) {
        match event {
            BtnEvent::Down => self.settings_menu.scroll_down(),
            BtnEvent::Up => self.settings_menu.scroll_up(),
            BtnEvent::Ok => {
                if let Some(action) = self.settings_menu.select() {
                    match action {
                        MenuAction::Goto(screen) => self.screen = *screen,
                        MenuAction::Call(f) => f(),
                    }
                }
            }
            _ => {}
        }
    }

    fn publish(&self) {
        self.state.publish(UiState {
            screen: self.screen,
            ftune_cursor: self.ftune_cursor,
            squelch_cursor: self.squelch_cursor,
            vol_cursor: self.vol_cursor,
            bw_cursor: self.bw_cursor,
            cf: self.store.get_numeric(PARAM_SDR_CF).unwrap_or(0.0),
            bw: self.store.get_numeric(PARAM_SDR_DIG_BW).unwrap_or(0.0),
            squelch: self.store.get_numeric(PARAM_SDR_SQUELCH).unwrap_or(0.0),
            vol: self.store.get_numeric(PARAM_SPKR_VOLUME).unwrap_or(0.0),
            db: self.last_db,
            start_time: self.start_time,
            demod_name: self.demod_control.scheme().name(),
            settings_menu: self.settings_menu.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radio_core::param::{NumericParam, Parameter};
    use radio_dsp::{DemodScheme, SharedDemodScheme};
    use radio_io::{MockSdrDevice, SharedSdr};

    fn test_store() -> Arc<ParameterStore> {
        let store = ParameterStore::new();
        store.register(
            PARAM_SDR_CF,
            Parameter::Numeric(NumericParam::new(
                88.3e6,
                30e6,
                1766e6,
                vec![1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9],
            )),
        );
        store.register(
            PARAM_SDR_SQUELCH,
            Parameter::Numeric(NumericParam::new(-20.0, -40.0, 2.0, vec![0.01, 0.1, 1.0, 10.0])),
        );
        store.register(
            PARAM_SPKR_VOLUME,
            Parameter::Numeric(NumericParam::new(50.0, 0.0, 100.0, vec![1.0, 10.0])),
        );
        store.register(
            PARAM_SDR_DIG_BW,
            Parameter::Numeric(NumericParam::new(150e3, 1e3, 250e3, vec![10.0, 100.0, 1e3, 1e4, 1e5])),
        );
        Arc::new(store)
    }

    fn test_controller() -> (UiController, Arc<SharedSdr<MockSdrDevice>>) {
        let store = test_store();
        let sdr = SharedSdr::new(MockSdrDevice::new(88.3e6, 250_000.0, 1000.0));
        let sdr_control: Arc<dyn SdrControl> = sdr.clone();
        let demod_control = SharedDemodScheme::new(DemodScheme::Fm);
        let state = UiStateHandle::new(UiState::initial(88.3e6, 150e3, -20.0, 50.0, "FM", Menu::new("Settings", 3)));
        (UiController::new(store, sdr_control, demod_control, state), sdr)
    }

    #[test]
    fn s1_freq_tune_step_at_100khz_slot_retunes_sdr() {
        let (mut controller, _sdr) = test_controller();
        controller.ftune_cursor = 5;
        controller.store.with_numeric_mut(PARAM_SDR_CF, |p| {
            for _ in 0..5 {
                p.cycle_step_size(StepDirection::Up);
            }
        }).unwrap();

        controller.handle_event(BtnEvent::Up).unwrap();

        assert_eq!(controller.store.get_numeric(PARAM_SDR_CF).unwrap(), 88.4e6);
        let snapshot = controller.state.snapshot();
        assert_eq!(snapshot.cf, 88.4e6);
    }

    #[test]
    fn s4_squelch_cursor_wraps_and_step_index_advances() {
        let (mut controller, _sdr) = test_controller();
        controller.squelch_cursor = 3;
        controller.store.with_numeric_mut(PARAM_SDR_SQUELCH, |p| {
            for _ in 0..3 {
                p.cycle_step_size(StepDirection::Up);
            }
        }).unwrap();

        controller.handle_event(BtnEvent::Right).unwrap();

        assert_eq!(controller.squelch_cursor, 0);
        let idx = controller
            .store
            .with_numeric_mut(PARAM_SDR_SQUELCH, |p| p.step_index())
            .unwrap();
        assert_eq!(idx, 0);
    }

    #[test]
    fn m1_enters_settings_from_any_screen() {
        let (mut controller, _sdr) = test_controller();
        controller.screen = Screens::Volume;
        controller.handle_event(BtnEvent::M1).unwrap();
        assert_eq!(controller.screen, Screens::Settings);
    }

    #[test]
    fn settings_ok_navigates_to_selected_screen() {
        let (mut controller, _sdr) = test_controller();
        controller.handle_event(BtnEvent::M1).unwrap();
        controller.handle_event(BtnEvent::Down).unwrap();
        controller.handle_event(BtnEvent::Ok).unwrap();
        assert_eq!(controller.screen, Screens::Squelch);
    }

    #[test]
    fn demod_toggles_between_fm_and_am() {
        let (mut controller, _sdr) = test_controller();
        controller.screen = Screens::Demod;
        controller.handle_event(BtnEvent::Ok).unwrap();
        assert_eq!(controller.demod_control.scheme(), DemodScheme::Am);
        controller.handle_event(BtnEvent::Ok).unwrap();
        assert_eq!(controller.demod_control.scheme(), DemodScheme::Fm);
    }

    #[test]
    fn observe_meta_updates_db_in_snapshot() {
        let (mut controller, _sdr) = test_controller();
        let mut meta = PacketMeta::stamped();
        meta.db = Some(-12.5);
        controller.observe_meta(&meta);
        assert_eq!(controller.state.snapshot().db, -12.5);
    }
}
