//! The SETTINGS screen's scrollable menu widget (§4.6).
//!
//! Grounded on `original_source/hw_interface/oled_menu.py`'s `Menu`/`MenuOption`, with one
//! deliberate fix: the original's `scroll_down` let `selected` advance one past the last option
//! (`if self.__selected < len(self.__options): self.__selected += 1`, missing the `-1`), which
//! would index out of bounds on the next `select()`. This version caps `selected` at the last
//! valid index; §8 scenario S5 (`selected=4, top=2` after four `DOWN` events over six options)
//! is unaffected either way since it never reaches the boundary.

use std::sync::Arc;

use crate::screens::Screens;

/// What choosing a menu option does: jump to another screen, or invoke an arbitrary callback.
/// Replaces the original's untyped `action` field (a bare Python object, sometimes a string,
/// sometimes presumably a screen token) with a closed two-case type.
#[derive(Clone)]
pub enum MenuAction {
    /// Switch the current screen to the named one.
    Goto(Screens),
    /// Invoke an arbitrary callback (e.g. a settings toggle with no dedicated screen).
    Call(Arc<dyn Fn() + Send + Sync>),
}

impl std::fmt::Debug for MenuAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MenuAction::Goto(screen) => f.debug_tuple("Goto").field(screen).finish(),
            MenuAction::Call(_) => f.write_str("Call(..)"),
        }
    }
}

/// One row in a [`Menu`]: a display label and the action selecting it performs.
#[derive(Debug, Clone)]
pub struct MenuOption {
    /// Label drawn by the renderer.
    pub name: String,
    /// What `select()` returns when this option is highlighted.
    pub action: MenuAction,
}

impl MenuOption {
    /// A menu row labeled `name` that performs `action` when selected.
    pub fn new(name: impl Into<String>, action: MenuAction) -> Self {
        Self { name: name.into(), action }
    }
}

/// An ordered, scrollable list of options with a windowed view of `ops_per_screen` items (§4.6).
#[derive(Debug, Clone)]
pub struct Menu {
    title: String,
    options: Vec<MenuOption>,
    selected: usize,
    top: usize,
    ops_per_screen: usize,
}

impl Menu {
    /// A menu titled `title`, showing `ops_per_screen` options per screen before scrolling.
    pub fn new(title: impl Into<String>, ops_per_screen: usize) -> Self {
        Self {
            title: title.into(),
            options: Vec::new(),
            selected: 0,
            top: 0,
            ops_per_screen,
        }
    }

    /// This menu's title, drawn above the option list.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Append a new option to the end of the list.
    pub fn register_option(&mut self, option: MenuOption) {
        self.options.push(option);
    }

    /// Move the selection down one row, scrolling the visible window if the selection would fall
    /// off the bottom of it. A no-op at the last option.
    pub fn scroll_down(&mut self) {
        if self.selected + 1 < self.options.len() {
            self.selected += 1;
            if self.selected - self.top > self.ops_per_screen.saturating_sub(1) {
                self.top += 1;
            }
        }
    }

    /// Move the selection up one row, scrolling the visible window if the selection would fall
    /// off the top of it. A no-op at the first option.
    pub fn scroll_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            if self.selected < self.top {
                self.top -= 1;
            }
        }
    }

    /// The action the currently highlighted option performs.
    pub fn select(&self) -> Option<&MenuAction> {
        self.options.get(self.selected).map(|o| &o.action)
    }

    /// Index of the currently highlighted option.
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Index of the first option in the currently visible window.
    pub fn top(&self) -> usize {
        self.top
    }

    /// The options currently within the visible window, for the renderer.
    pub fn visible(&self) -> &[MenuOption] {
        let end = (self.top + self.ops_per_screen).min(self.options.len());
        &self.options[self.top..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn six_option_menu() -> Menu {
        let mut menu = Menu::new("Settings", 3);
        for i in 0..6 {
            menu.register_option(MenuOption::new(format!("Op{i}"), MenuAction::Goto(Screens::FreqTune)));
        }
        menu
    }

    #[test]
    fn scroll_down_four_times_over_six_options_matches_s5() {
        let mut menu = six_option_menu();
        for _ in 0..4 {
            menu.scroll_down();
        }
        assert_eq!(menu.selected(), 4);
        assert_eq!(menu.top(), 2);
        let visible: Vec<_> = menu.visible().iter().map(|o| o.name.clone()).collect();
        assert_eq!(visible, vec!["Op2", "Op3", "Op4"]);
    }

    #[test]
    fn scroll_down_stops_at_last_option() {
        let mut menu = six_option_menu();
        for _ in 0..20 {
            menu.scroll_down();
        }
        assert_eq!(menu.selected(), 5);
    }

    #[test]
    fn scroll_up_stops_at_first_option() {
        let mut menu = six_option_menu();
        menu.scroll_up();
        assert_eq!(menu.selected(), 0);
        assert_eq!(menu.top(), 0);
    }

    #[test]
    fn scroll_up_after_scrolling_down_retreats_the_window() {
        let mut menu = six_option_menu();
        for _ in 0..4 {
            menu.scroll_down();
        }
        menu.scroll_up();
        menu.scroll_up();
        assert_eq!(menu.selected(), 2);
        assert_eq!(menu.top(), 2);
        menu.scroll_up();
        assert_eq!(menu.selected(), 1);
        assert_eq!(menu.top(), 1);
    }
}
