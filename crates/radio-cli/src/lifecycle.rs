//! Startup, run, and coordinated shutdown (§4.8).
//!
//! This is the one call site in the workspace that actually wires the domain crates together:
//! `radio-core` builds the shared primitives, `radio-dsp` supplies the stages, `radio-io` supplies
//! the SDR/audio collaborators, `radio-input`/`radio-ui` supply the control surface. No other
//! crate imports more than one of its siblings' concrete types for exactly this reason — the
//! wiring belongs here, once, where the process is actually starting.
//!
//! No physical SDR, GPIO, or OLED driver crate exists anywhere in this workspace's dependency
//! stack (§1: these are "named external collaborators, specified only by the interface the core
//! consumes"). This binary runs against the same [`radio_io::MockSdrDevice`], [`radio_input::MockGpio`],
//! and [`radio_ui::MockDisplay`] test doubles the domain crates themselves test against — the
//! seam a real board-support crate would plug into is exactly the trait boundary already exercised
//! by every `#[cfg(test)]` module in this workspace.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use radio_core::graph::bounded_queue;
use radio_core::packet::PacketMeta;
use radio_core::stage::{EndpointStage, ProducerThen, Stage, StageExt};
use radio_core::{ParameterStore, Scheduler, StopFlag};
use radio_dsp::stages::{
    AdjustVolume, ApplySquelch, AudioTailSink, CalcDecibels, DemodulateRf, Downsample, Filter, ProvideRawRf,
    RechunkArray, ReshapeArray, UiSnapshotTap,
};
use radio_dsp::{DemodScheme, SharedDemodScheme};
use radio_io::{start_output_stream, AudioStreamHandle, MockSdrDevice, SdrControl, SharedSdr, UnderrunCounter};
use radio_input::{InputController, MockGpio, PinConfig, PressType};
use radio_ui::{BtnEvent, Menu, MockDisplay, Renderer, UiController, UiState, UiStateHandle};

use crate::cli::Cli;
use crate::error::Result;

/// Butterworth filter order applied before downsampling (§6: "Butterworth order 5").
const FILTER_ORDER: usize = 5;

/// Depth of the DSP→audio and DSP→UI hand-off queues. Small and bounded on purpose (§4.1/§5): a
/// slow consumer applies backpressure to the DSP thread rather than letting either queue grow
/// without limit.
const QUEUE_DEPTH: usize = 8;

/// Tone offset (Hz) the mock SDR's synthetic signal sits at, chosen so `DemodulateRF`'s FM path
/// always sees a nonzero instantaneous frequency to decode.
const MOCK_TONE_OFFSET_HZ: f64 = 12_000.0;

/// Every thread and resource the lifecycle layer owns once the receiver has started, plus the
/// shared [`StopFlag`] that the signal handler and every domain poll to learn a shutdown was
/// requested.
pub struct Receiver {
    stop: StopFlag,
    dsp_thread: JoinHandle<radio_core::Result<()>>,
    _audio_stream: AudioStreamHandle,
    underruns: UnderrunCounter,
    input_controller: InputController<BtnEvent>,
    _gpio: MockGpio,
    render_stop: Arc<AtomicBool>,
    render_thread: JoinHandle<()>,
    control_thread: JoinHandle<()>,
}

impl Receiver {
    /// This receiver's shared stop flag. The caller (`main`) hands a clone to the signal handler.
    pub fn stop_flag(&self) -> StopFlag {
        self.stop.clone()
    }

    /// Block until the DSP source exits (end of stream or fatal error), per §8 scenario S6: "the
    /// DSP source exits within one chunk period" of the stop flag being set.
    pub fn wait_for_dsp(self) -> Result<()> {
        let outcome = self
            .dsp_thread
            .join()
            .map_err(|_| crate::error::LifecycleError::DspThreadPanicked)?;

        // Ordered shutdown regardless of how the DSP thread ended (§4.8): stop the UI thread
        // group, join the cascade sender threads (so "no GPIO pins left configured"), and let
        // `_audio_stream`'s drop stop playback.
        self.render_stop.store(true, Ordering::Relaxed);
        let _ = self.render_thread.join();
        let _ = self.control_thread.join();
        self.input_controller.shutdown();

        tracing::info!(underruns = self.underruns.count(), "receiver shut down");
        outcome.map_err(Into::into)
    }
}

/// Build every default pin registration for the front panel (§4.5, §6): `UP`/`DOWN` auto-repeat
/// while held, everything else fires once per press.
fn pin_configs() -> Vec<PinConfig<BtnEvent>> {
    let debounce = Duration::from_millis(30);
    let cascade_delay = Duration::from_millis(120);
    let simple = |pin, event, press_type| PinConfig {
        pin,
        event,
        press_type,
        debounce,
        cascade_delay,
    };
    vec![
        simple(0, BtnEvent::Up, PressType::Cascade),
        simple(1, BtnEvent::Down, PressType::Cascade),
        simple(2, BtnEvent::Left, PressType::Down),
        simple(3, BtnEvent::Right, PressType::Down),
        simple(4, BtnEvent::Ok, PressType::Down),
        simple(5, BtnEvent::M1, PressType::Down),
        simple(6, BtnEvent::M2, PressType::Down),
        simple(7, BtnEvent::M3, PressType::Down),
    ]
}

/// Start every domain: build the parameter store, open the SDR, spawn the DSP thread, start the
/// audio stream, and spin up the UI thread group (§4.8).
pub fn startup(args: &Cli) -> Result<Receiver> {
    let store = Arc::new(radio_config::try_build_default_store()?);
    if let Some(hz) = args.center_freq {
        store.with_numeric_mut("sdr_cf", |p| p.set(hz))?;
    }
    if let Some(db) = args.squelch {
        store.with_numeric_mut("sdr_squelch", |p| p.set(db))?;
    }
    if let Some(vol) = args.volume {
        store.with_numeric_mut("spkr_volume", |p| p.set(vol))?;
    }

    let sdr_fs = store.get_numeric("sdr_fs")?;
    let spkr_fs = store.get_numeric("spkr_fs")?;
    let spb = store.get_numeric("sdr_chunk_sz")? as usize;
    let spkr_chunk_sz = store.get_numeric("spkr_chunk_sz")? as usize;
    let cf = store.get_numeric("sdr_cf")?;

    let sdr = SharedSdr::new(MockSdrDevice::new(cf, sdr_fs, MOCK_TONE_OFFSET_HZ));
    let sdr_control: Arc<dyn SdrControl> = sdr.clone();

    let initial_scheme = if args.am { DemodScheme::Am } else { DemodScheme::Fm };
    let demod_control = SharedDemodScheme::new(initial_scheme);

    let stop = StopFlag::new();
    let (audio_tx, audio_rx) = bounded_queue(QUEUE_DEPTH);
    let (meta_tx, meta_rx) = bounded_queue::<PacketMeta>(QUEUE_DEPTH);
    let (btn_tx, btn_rx) = bounded_queue::<BtnEvent>(QUEUE_DEPTH);

    let underruns = UnderrunCounter::new();
    let audio_stream = start_output_stream(spkr_fs as u32, spkr_chunk_sz as u32, audio_rx, underruns.clone())?;

    // FM shortens a chunk by one sample (§4.2); AM does not. This only sizes `Downsample`'s
    // resampler for startup — it rebuilds itself if a runtime DEMOD toggle changes the chunk
    // length later (see `Downsample::process`).
    let demod_chunk_len = match initial_scheme {
        DemodScheme::Fm => spb.saturating_sub(1),
        DemodScheme::Am => spb,
    };

    let dsp_thread = spawn_dsp_thread(
        store.clone(),
        sdr,
        demod_control.clone(),
        spb,
        demod_chunk_len,
        sdr_fs,
        spkr_fs,
        spkr_chunk_sz,
        stop.clone(),
        audio_tx,
        meta_tx,
    )?;

    let gpio = MockGpio::new();
    let input_controller = InputController::new(&gpio, pin_configs(), btn_tx)?;

    // The menu here is a placeholder: `UiController::new` below builds the real settings menu and
    // publishes over this snapshot before any other thread reads it.
    let ui_state = UiStateHandle::new(UiState::initial(
        cf,
        store.get_numeric("sdr_dig_bw")?,
        store.get_numeric("sdr_squelch")?,
        store.get_numeric("spkr_volume")?,
        initial_scheme.name(),
        Menu::new("Settings", 3),
    ));

    let control_thread = spawn_control_thread(store, sdr_control, demod_control, ui_state.clone(), btn_rx, meta_rx, stop.clone());

    let render_stop = Arc::new(AtomicBool::new(false));
    let renderer = Renderer::new(MockDisplay::new(), ui_state);
    let render_thread = {
        let render_stop = render_stop.clone();
        std::thread::spawn(move || radio_ui::run_render_loop(renderer, render_stop))
    };

    Ok(Receiver {
        stop,
        dsp_thread,
        _audio_stream: audio_stream,
        underruns,
        input_controller,
        _gpio: gpio,
        render_stop,
        render_thread,
        control_thread,
    })
}

#[allow(clippy::too_many_arguments)]
fn spawn_dsp_thread(
    store: Arc<ParameterStore>,
    sdr: Arc<SharedSdr<MockSdrDevice>>,
    demod_control: Arc<SharedDemodScheme>,
    spb: usize,
    demod_chunk_len: usize,
    sdr_fs: f64,
    spkr_fs: f64,
    spkr_chunk_sz: usize,
    stop: StopFlag,
    audio_tx: crossbeam_channel::Sender<radio_core::AudioFrame>,
    meta_tx: crossbeam_channel::Sender<PacketMeta>,
) -> Result<JoinHandle<radio_core::Result<()>>> {
    let source = ProvideRawRf::new(sdr, spb, stop.clone());
    let front = CalcDecibels.chain(ApplySquelch::new(store.clone()));
    let producer = ProducerThen::new(source, front);

    let mut demod = DemodulateRf::new(demod_control);
    let mut after_demod = Filter::new(store.clone(), "sdr_dig_bw", sdr_fs, FILTER_ORDER)?
        .chain(Downsample::new(sdr_fs, spkr_fs, demod_chunk_len)?)
        .chain(AdjustVolume::new(store, "spkr_volume"));
    let mut rechunk = RechunkArray::new(spkr_chunk_sz);
    let mut reshape_tap = ReshapeArray.chain(UiSnapshotTap::new(meta_tx));
    let mut sink = AudioTailSink::new(audio_tx);

    let handle = std::thread::Builder::new()
        .name("radio-dsp".to_string())
        .spawn(move || {
            Scheduler::run(producer, &stop, |packet| {
                let demodulated = demod.process(packet)?;
                let processed = after_demod.process(demodulated)?;
                for block in rechunk.push(processed) {
                    let tapped = reshape_tap.process(block)?;
                    sink.drain(tapped);
                }
                Ok(())
            })
        })
        .expect("failed to spawn DSP thread");

    Ok(handle)
}

fn spawn_control_thread(
    store: Arc<ParameterStore>,
    sdr_control: Arc<dyn SdrControl>,
    demod_control: Arc<SharedDemodScheme>,
    ui_state: UiStateHandle,
    btn_rx: crossbeam_channel::Receiver<BtnEvent>,
    meta_rx: crossbeam_channel::Receiver<PacketMeta>,
    stop: StopFlag,
) -> JoinHandle<()> {
    std::thread::Builder::new()
        .name("radio-ui-control".to_string())
        .spawn(move || {
            let mut controller = UiController::new(store, sdr_control, demod_control, ui_state);
            while !stop.is_set() {
                crossbeam_channel::select! {
                    recv(btn_rx) -> event => {
                        if let Ok(event) = event {
                            if let Err(err) = controller.handle_event(event) {
                                tracing::warn!(%err, "button event handling failed");
                            }
                        }
                    }
                    recv(meta_rx) -> meta => {
                        if let Ok(meta) = meta {
                            controller.observe_meta(&meta);
                        }
                    }
                    default(Duration::from_millis(100)) => {}
                }
            }
        })
        .expect("failed to spawn UI control thread")
}
