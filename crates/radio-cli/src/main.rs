//! Entrypoint for the handheld SDR receiver service.
//!
//! Generalizes `sonido-cli`'s `main()` (`tracing_subscriber::fmt().with_env_filter(...)`, a
//! `clap`-derived argument struct, `anyhow::Result<()>`) from a one-shot CLI invocation to a
//! long-running service: parse overrides, start every domain, register a signal handler, then
//! block until the DSP thread exits.

mod cli;
mod error;
mod lifecycle;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;
    // Raised from the teacher's one-shot-CLI default of "warn": this binary runs indefinitely, so
    // "info" keeps startup/shutdown and per-parameter-change lines visible without opting in via
    // RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = cli::Cli::parse();
    tracing::info!(?args, "starting receiver");

    let receiver = lifecycle::startup(&args)?;

    let stop = receiver.stop_flag();
    ctrlc::set_handler(move || {
        if stop.set() {
            tracing::info!("shutdown signal received, stopping");
        } else {
            tracing::warn!("second shutdown signal received, exiting immediately");
            std::process::exit(130);
        }
    })?;

    receiver.wait_for_dsp()?;
    Ok(())
}
