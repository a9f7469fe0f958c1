//! Application entry point — Sakura Stage.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create [`tokio`] runtime (multi-thread, 2 workers) for the capability
//!    tasks.
//! 4. Build the speech capabilities selected by the config.
//! 5. Create the capability event channels.
//! 6. Run [`eframe::run_native`] — blocks the main thread until the window
//!    is closed.

use std::sync::Arc;
use std::time::Duration;

use eframe::egui;
use tokio::sync::mpsc;

use sakura_stage::{
    app::StageApp,
    config::{AppConfig, Capability},
    speech::{
        Announcer, PlaybackEvent, Recognizer, ScriptedRecognizer, SessionConfig, SessionEvent,
        SpeechController, Synthesizer, TimedSynthesizer, Utterance,
    },
};

// ---------------------------------------------------------------------------
// Scripted conversation lines
// ---------------------------------------------------------------------------

/// What the visitor is supposed to say, in challenge order.  The scripted
/// recognizer replays these one session at a time.
const SCRIPT_LINES: [&str; 2] = [
    "すみません、湯豆腐をひとつと、抹茶プリンをひとつお願いします。",
    "ありがとうございます。",
];

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let mut vp = egui::ViewportBuilder::default()
        .with_inner_size([config.ui.window_width, config.ui.window_height])
        .with_min_inner_size([360.0, 480.0]);

    if let Some((x, y)) = config.ui.window_position {
        vp = vp.with_position(egui::pos2(x, y));
    }

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> eframe::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Sakura Stage starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime — capability tasks (scripted recognition, timed
    //    synthesis) live here; the UI stays on the main thread.
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    // 4. Capabilities
    let recognizer: Option<Arc<dyn Recognizer>> = match config.speech.recognizer {
        Capability::Simulated => Some(Arc::new(ScriptedRecognizer::new(
            SCRIPT_LINES.iter().map(|s| s.to_string()).collect(),
            rt.handle().clone(),
        ))),
        Capability::Disabled => {
            log::info!("recognizer disabled — listening phases auto-advance");
            None
        }
    };

    let synthesizer: Option<Arc<dyn Synthesizer>> = match config.announcement.synthesizer {
        Capability::Simulated => Some(Arc::new(TimedSynthesizer::new(rt.handle().clone()))),
        Capability::Disabled => {
            log::info!("synthesizer disabled — announcement reports unsupported");
            None
        }
    };

    // 5. Channel setup
    let (speech_tx, speech_rx) = mpsc::channel::<SessionEvent>(32);
    let (playback_tx, playback_rx) = mpsc::channel::<PlaybackEvent>(4);

    let speech = SpeechController::new(
        recognizer,
        SessionConfig::for_language(config.speech.language.clone()),
        speech_tx,
        Duration::from_secs(config.speech.fallback_delay_secs),
    );

    let announcer = Announcer::new(
        synthesizer,
        Utterance {
            text: config.announcement.text.clone(),
            language: config.announcement.language.clone(),
            rate: config.announcement.rate,
            pitch: config.announcement.pitch,
        },
        playback_tx,
    );

    // 6. Build the egui app and run it (blocks until the window is closed)
    let app = StageApp::new(speech, speech_rx, announcer, playback_rx, config.clone());
    let options = native_options(&config);

    eframe::run_native(
        "Sakura Stage",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
}
