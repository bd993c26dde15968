//! The control surface: screen/menu state machine, OLED renderer, and button-event vocabulary for
//! the handheld receiver's UI domain (§4.6, §4.7).
//!
//! Realized as a dedicated thread group rather than a literal second OS process — see
//! `DESIGN.md`'s resolution of §4.8's "Cross-process UI" design note. This crate owns the part of
//! that thread group that is pure logic (state, menu, layout, drawing); `radio-cli` spawns the
//! actual threads and wires them to `radio-input`'s `InputController` and a concrete `Display`.
//!
//! # Modules
//!
//! - [`screens`] — the closed [`screens::Screens`] and [`screens::BtnEvent`] vocabularies.
//! - [`menu`] — the SETTINGS screen's scrollable [`menu::Menu`] widget.
//! - [`monospace`] — the digit-cursor pixel-offset helper shared by the numeric screens.
//! - [`state`] — [`state::UiState`] and its publish/read handle.
//! - [`controller`] — [`controller::UiController`], dispatching button events to parameter writes.
//! - [`display`] — the [`display::Display`] trait consumed by the renderer, plus a test double.
//! - [`renderer`] — [`renderer::Renderer`], drawing each screen's widget set from a snapshot.
//! - [`error`] — UI-domain error values.

pub mod controller;
pub mod display;
pub mod error;
pub mod menu;
pub mod monospace;
pub mod renderer;
pub mod screens;
pub mod state;

pub use controller::UiController;
pub use display::{Display, MockDisplay};
pub use error::{Result, UiError};
pub use menu::{Menu, MenuAction, MenuOption};
pub use monospace::monospace_digit_x;
pub use renderer::{run_render_loop, Renderer};
pub use screens::{BtnEvent, Screens};
pub use state::{UiState, UiStateHandle};
