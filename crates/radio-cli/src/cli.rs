//! Command-line surface for the receiver service.
//!
//! Generalizes `sonido-cli`'s `clap`-derived `Parser`/`Subcommand` pattern from a one-shot
//! multi-command CLI to a single long-running service: there is exactly one thing this binary
//! does (start the receiver and run until signaled), so the derive here is a flat set of startup
//! overrides rather than a `Subcommand` enum.

use clap::Parser;

/// Startup overrides for the receiver's default parameter table (§6). Every flag is optional;
/// omitting one leaves that parameter at the default `radio-config::defaults::build_default_store`
/// seeds it with.
#[derive(Parser, Debug)]
#[command(name = "radio-cli")]
#[command(author, version, about = "Handheld SDR receiver service", long_about = None)]
pub struct Cli {
    /// Initial center frequency in Hz (clamped to `sdr_cf`'s `[30e6, 1766e6]` range).
    #[arg(long)]
    pub center_freq: Option<f64>,

    /// Initial squelch threshold in dB (clamped to `sdr_squelch`'s `[-40, 2]` range).
    #[arg(long)]
    pub squelch: Option<f64>,

    /// Initial speaker volume, 0-100 (clamped to `spkr_volume`'s range).
    #[arg(long)]
    pub volume: Option<f64>,

    /// Start demodulating with AM instead of the FM default.
    #[arg(long)]
    pub am: bool,
}
