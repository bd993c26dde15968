//! The renderer task: once per frame, pulls the current snapshot and draws the widget set for
//! `snapshot.screen` (§4.7).

use std::sync::Arc;
use std::time::Duration;

use crate::display::{Align, Display};
use crate::error::Result;
use crate::monospace::monospace_digit_x;
use crate::screens::Screens;
use crate::state::{UiState, UiStateHandle};

/// Target frame period for the renderer's pull loop (≈16 FPS, per §4.7).
pub const FRAME_PERIOD: Duration = Duration::from_millis(1000 / 16);

const SQUELCH_MIN: f64 = -40.0;
const SQUELCH_MAX: f64 = 2.0;

/// Draws each screen's widget set against a [`Display`] from successive [`UiState`] snapshots.
pub struct Renderer<D: Display> {
    display: D,
    state: UiStateHandle,
}

impl<D: Display> Renderer<D> {
    /// A renderer drawing onto `display`, reading snapshots from `state`.
    pub fn new(display: D, state: UiStateHandle) -> Self {
        Self { display, state }
    }

    /// Draw one frame from the current snapshot.
    pub fn draw_frame(&mut self) -> Result<()> {
        let snapshot = self.state.snapshot();
        self.display.clear()?;
        match snapshot.screen {
            Screens::FreqTune => self.draw_freq_tune(&snapshot)?,
            Screens::Settings => self.draw_settings(&snapshot)?,
            Screens::Squelch => self.draw_meter("SQUELCH", SQUELCH_MIN, SQUELCH_MAX, snapshot.squelch, snapshot.db)?,
            Screens::Volume => self.draw_meter("VOLUME", 0.0, 100.0, snapshot.vol, snapshot.db)?,
            Screens::Bandwidth => self.draw_meter("BANDWIDTH", 1e3, 250e3, snapshot.bw, snapshot.db)?,
            Screens::Demod => self.draw_demod(&snapshot)?,
        }
        self.display.flush()
    }

    fn draw_freq_tune(&mut self, snapshot: &UiState) -> Result<()> {
        let mhz = snapshot.cf / 1e6;
        let label = format!("{mhz:07.4}");
        self.display.text(64, 20, &label, Align::Center, false)?;

        let cursor_x = monospace_digit_x(20, snapshot.ftune_cursor);
        self.display.line(cursor_x, 30, cursor_x + 9, 30)?;

        let db_label = format!("{:.1} dB", snapshot.db);
        self.display.text(124, 4, &db_label, Align::Right, false)?;

        let elapsed = snapshot.start_time.elapsed().as_secs();
        let runtime = format!("{:02}:{:02}", elapsed / 60, elapsed % 60);
        self.display.text(4, 4, &runtime, Align::Left, false)?;

        self.display.text(64, 56, snapshot.demod_name, Align::Center, false)?;
        Ok(())
    }

    fn draw_settings(&mut self, snapshot: &UiState) -> Result<()> {
        self.display.text(4, 2, snapshot.settings_menu.title(), Align::Left, false)?;
        for (row, option) in snapshot.settings_menu.visible().iter().enumerate() {
            let y = 14 + row as i32 * 16;
            let is_selected = snapshot.settings_menu.top() + row == snapshot.settings_menu.selected();
            self.display.text(8, y, &option.name, Align::Left, is_selected)?;
        }
        Ok(())
    }

    fn draw_meter(&mut self, title: &str, min: f64, max: f64, set_point: f64, db: f64) -> Result<()> {
        self.display.text(4, 2, title, Align::Left, false)?;

        self.display.line(4, 40, 124, 40)?;
        self.display.line(4, 36, 4, 44)?;
        self.display.line(124, 36, 124, 44)?;

        let span = max - min;
        let bar_w = (((db.clamp(min, max) - min) / span) * 120.0) as i32;
        if bar_w > 0 {
            self.display.rectangle(4, 38, bar_w, 4, true)?;
        }

        let chevron_x = 4 + (((set_point.clamp(min, max) - min) / span) * 120.0) as i32;
        self.display.polygon(&[(chevron_x - 3, 46), (chevron_x + 3, 46), (chevron_x, 50)], true)?;

        let db_label = format!("{db:.1}");
        self.display.text(124, 4, &db_label, Align::Right, false)?;

        Ok(())
    }

    fn draw_demod(&mut self, snapshot: &UiState) -> Result<()> {
        self.display.text(4, 2, "DEMOD", Align::Left, false)?;
        self.display.text(64, 30, snapshot.demod_name, Align::Center, true)?;
        Ok(())
    }
}

impl Renderer<crate::display::MockDisplay> {
    /// Access to the test double's recorded calls, for renderer unit tests.
    pub fn calls(&self) -> &[String] {
        &self.display.calls
    }
}

/// Runs [`Renderer::draw_frame`] in a loop at [`FRAME_PERIOD`] until `stop` is set. Intended to be
/// spawned on its own OS thread by the lifecycle layer (§4.8's UI thread group).
pub fn run_render_loop<D: Display>(mut renderer: Renderer<D>, stop: Arc<std::sync::atomic::AtomicBool>) {
    use std::sync::atomic::Ordering;
    while !stop.load(Ordering::Relaxed) {
        if let Err(err) = renderer.draw_frame() {
            tracing::warn!(%err, "renderer frame failed");
        }
        std::thread::sleep(FRAME_PERIOD);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::MockDisplay;
    use crate::menu::Menu;

    fn state_with_screen(screen: Screens) -> UiStateHandle {
        let mut initial = UiState::initial(88.3e6, 150e3, -20.0, 50.0, "FM", Menu::new("Settings", 3));
        initial.screen = screen;
        initial.db = -12.0;
        UiStateHandle::new(initial)
    }

    #[test]
    fn freq_tune_frame_draws_frequency_and_flushes() {
        let state = state_with_screen(Screens::FreqTune);
        let mut renderer = Renderer::new(MockDisplay::new(), state);
        renderer.draw_frame().unwrap();
        assert!(renderer.calls().iter().any(|c| c.contains("088.3000")));
        assert_eq!(renderer.display.flushes, 1);
    }

    #[test]
    fn settings_frame_draws_each_visible_option() {
        let mut initial = UiState::initial(88.3e6, 150e3, -20.0, 50.0, "FM", {
            let mut menu = Menu::new("Settings", 3);
            menu.register_option(crate::menu::MenuOption::new("Frequency", crate::menu::MenuAction::Goto(Screens::FreqTune)));
            menu
        });
        initial.screen = Screens::Settings;
        let state = UiStateHandle::new(initial);
        let mut renderer = Renderer::new(MockDisplay::new(), state);
        renderer.draw_frame().unwrap();
        assert!(renderer.calls().iter().any(|c| c.contains("Frequency")));
    }

    #[test]
    fn meter_screen_draws_chevron_and_bar() {
        let state = state_with_screen(Screens::Squelch);
        let mut renderer = Renderer::new(MockDisplay::new(), state);
        renderer.draw_frame().unwrap();
        assert!(renderer.calls().iter().any(|c| c.starts_with("polygon")));
        assert!(renderer.calls().iter().any(|c| c.starts_with("rectangle")));
    }
}
