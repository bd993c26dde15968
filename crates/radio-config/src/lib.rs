//! Default parameter-table construction for the handheld SDR receiver (§6).
//!
//! `radio-cli`'s startup sequence has exactly one call site into this crate:
//! [`defaults::build_default_store`]. Keeping the literal default table here, instead of inline in
//! `main`, mirrors `sonido-config`'s preset-construction pattern — one module owns the data, the
//! binary just calls it.
//!
//! # Modules
//!
//! - [`defaults`] — the §6 default parameter table and its construction/validation.
//! - [`error`] — configuration error values.

pub mod defaults;
pub mod error;

pub use defaults::{build_default_store, try_build_default_store};
pub use error::{ConfigError, Result};
