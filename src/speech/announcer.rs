//! One-shot station-announcement playback.
//!
//! Independent of the phase state machine: [`Announcer::play`] triggers a
//! single synthesis of a fixed utterance and tracks a small closed status
//! set ([`AudioStatus`]).  A second `play` while a playback is in progress is
//! a no-op; without a synthesis capability the status flips to
//! `Unsupported` and nothing plays.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// AudioStatus
// ---------------------------------------------------------------------------

/// Playback status shown under the announcement card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioStatus {
    /// Nothing playing — press to listen.
    Ready,
    /// Synthesis in progress.
    Playing,
    /// The host has no text-to-speech capability.
    Unsupported,
}

impl AudioStatus {
    /// Human-readable label, mirroring the widget's UI copy.
    pub fn label(&self) -> &'static str {
        match self {
            AudioStatus::Ready => "▶  Pulsa para escuchar",
            AudioStatus::Playing => "◼  Reproduciendo anuncio...",
            AudioStatus::Unsupported => "Audio no disponible en este equipo",
        }
    }
}

impl Default for AudioStatus {
    fn default() -> Self {
        AudioStatus::Ready
    }
}

// ---------------------------------------------------------------------------
// Utterance
// ---------------------------------------------------------------------------

/// What to synthesize and how.
#[derive(Debug, Clone)]
pub struct Utterance {
    pub text: String,
    /// BCP-47 language tag.
    pub language: String,
    /// Speaking rate multiplier (1.0 = normal).
    pub rate: f32,
    /// Voice pitch multiplier (1.0 = normal).
    pub pitch: f32,
}

// ---------------------------------------------------------------------------
// Synthesizer capability
// ---------------------------------------------------------------------------

/// Completion signal emitted once per playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    Finished,
}

/// Object-safe, thread-safe text-to-speech capability.
///
/// `speak` must emit exactly one [`PlaybackEvent::Finished`] on `done` when
/// the utterance completes.
pub trait Synthesizer: Send + Sync {
    fn speak(&self, utterance: Utterance, done: mpsc::Sender<PlaybackEvent>);
}

const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn Synthesizer>) {}
};

// ---------------------------------------------------------------------------
// Announcer
// ---------------------------------------------------------------------------

/// Owns the playback state for the announcement card.
///
/// The host drains the completion channel and forwards into
/// [`handle_event`](Self::handle_event) each frame, the same shape as the
/// recognition event flow.
pub struct Announcer {
    synthesizer: Option<Arc<dyn Synthesizer>>,
    utterance: Utterance,
    done: mpsc::Sender<PlaybackEvent>,
    status: AudioStatus,
    in_progress: bool,
}

impl Announcer {
    pub fn new(
        synthesizer: Option<Arc<dyn Synthesizer>>,
        utterance: Utterance,
        done: mpsc::Sender<PlaybackEvent>,
    ) -> Self {
        Self {
            synthesizer,
            utterance,
            done,
            status: AudioStatus::Ready,
            in_progress: false,
        }
    }

    /// Start the one-shot playback.
    ///
    /// No-op while a playback is in progress.  Without a capability the
    /// status becomes [`AudioStatus::Unsupported`] and nothing is played.
    pub fn play(&mut self) {
        if self.in_progress {
            log::debug!("announcement already playing — ignoring");
            return;
        }
        let Some(synthesizer) = &self.synthesizer else {
            self.status = AudioStatus::Unsupported;
            log::info!("no synthesis capability — announcement unavailable");
            return;
        };

        self.in_progress = true;
        self.status = AudioStatus::Playing;
        log::info!(
            "playing announcement ({}, rate {}, pitch {})",
            self.utterance.language,
            self.utterance.rate,
            self.utterance.pitch
        );
        synthesizer.speak(self.utterance.clone(), self.done.clone());
    }

    /// Apply a completion signal from the capability.
    pub fn handle_event(&mut self, event: PlaybackEvent) {
        match event {
            PlaybackEvent::Finished => {
                self.in_progress = false;
                self.status = AudioStatus::Ready;
            }
        }
    }

    pub fn status(&self) -> AudioStatus {
        self.status
    }

    pub fn is_playing(&self) -> bool {
        self.in_progress
    }
}

// ---------------------------------------------------------------------------
// TimedSynthesizer
// ---------------------------------------------------------------------------

/// Duration-modelled synthesizer: "plays" for a time proportional to the
/// utterance length (scaled by rate), then signals completion.  The shipped
/// capability for hosts without a real text-to-speech engine.
pub struct TimedSynthesizer {
    rt: tokio::runtime::Handle,
}

impl TimedSynthesizer {
    /// Fixed lead-in before any speech.
    const BASE: Duration = Duration::from_millis(800);
    /// Per-character speaking time at rate 1.0.
    const PER_CHAR: Duration = Duration::from_millis(55);

    pub fn new(rt: tokio::runtime::Handle) -> Self {
        Self { rt }
    }

    fn duration_for(utterance: &Utterance) -> Duration {
        let rate = utterance.rate.max(0.1);
        let speech = Self::PER_CHAR.mul_f32(utterance.text.chars().count() as f32 / rate);
        Self::BASE + speech
    }
}

impl Synthesizer for TimedSynthesizer {
    fn speak(&self, utterance: Utterance, done: mpsc::Sender<PlaybackEvent>) {
        let duration = Self::duration_for(&utterance);
        log::debug!("timed synthesis of {} chars over {duration:?}", utterance.text.chars().count());
        self.rt.spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = done.send(PlaybackEvent::Finished).await;
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn utterance() -> Utterance {
        Utterance {
            text: "まもなく、のぞみ二十七号が参ります。".into(),
            language: "ja-JP".into(),
            rate: 0.85,
            pitch: 1.05,
        }
    }

    /// Counts `speak` calls; completion is triggered manually by the test.
    struct CountingSynth {
        calls: AtomicUsize,
    }

    impl CountingSynth {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl Synthesizer for CountingSynth {
        fn speak(&self, _utterance: Utterance, _done: mpsc::Sender<PlaybackEvent>) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    // ---- Announcer ---

    #[test]
    fn play_sets_playing_status() {
        let synth = CountingSynth::new();
        let (tx, _rx) = mpsc::channel(4);
        let mut announcer = Announcer::new(Some(synth.clone()), utterance(), tx);

        assert_eq!(announcer.status(), AudioStatus::Ready);
        announcer.play();
        assert_eq!(announcer.status(), AudioStatus::Playing);
        assert!(announcer.is_playing());
        assert_eq!(synth.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn play_while_playing_is_a_no_op() {
        let synth = CountingSynth::new();
        let (tx, _rx) = mpsc::channel(4);
        let mut announcer = Announcer::new(Some(synth.clone()), utterance(), tx);

        announcer.play();
        announcer.play();
        announcer.play();

        assert_eq!(synth.calls.load(Ordering::SeqCst), 1, "one synthesis only");
        assert_eq!(announcer.status(), AudioStatus::Playing);
    }

    #[test]
    fn completion_returns_to_ready() {
        let synth = CountingSynth::new();
        let (tx, _rx) = mpsc::channel(4);
        let mut announcer = Announcer::new(Some(synth), utterance(), tx);

        announcer.play();
        announcer.handle_event(PlaybackEvent::Finished);

        assert_eq!(announcer.status(), AudioStatus::Ready);
        assert!(!announcer.is_playing());
    }

    #[test]
    fn replay_is_possible_after_completion() {
        let synth = CountingSynth::new();
        let (tx, _rx) = mpsc::channel(4);
        let mut announcer = Announcer::new(Some(synth.clone()), utterance(), tx);

        announcer.play();
        announcer.handle_event(PlaybackEvent::Finished);
        announcer.play();

        assert_eq!(synth.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn missing_capability_reports_unsupported_and_never_plays() {
        let (tx, _rx) = mpsc::channel(4);
        let mut announcer = Announcer::new(None, utterance(), tx);

        announcer.play();
        assert_eq!(announcer.status(), AudioStatus::Unsupported);
        assert!(!announcer.is_playing());

        // Repeated attempts stay in Unsupported without panicking.
        announcer.play();
        assert_eq!(announcer.status(), AudioStatus::Unsupported);
    }

    #[test]
    fn status_labels_are_distinct() {
        assert_ne!(AudioStatus::Ready.label(), AudioStatus::Playing.label());
        assert_ne!(AudioStatus::Playing.label(), AudioStatus::Unsupported.label());
    }

    // ---- TimedSynthesizer ---

    #[test]
    fn duration_scales_with_text_length_and_rate() {
        let short = Utterance {
            text: "あ".into(),
            ..utterance()
        };
        let long = Utterance {
            text: "あ".repeat(50),
            ..utterance()
        };
        assert!(TimedSynthesizer::duration_for(&long) > TimedSynthesizer::duration_for(&short));

        let fast = Utterance {
            rate: 2.0,
            ..long.clone()
        };
        assert!(TimedSynthesizer::duration_for(&fast) < TimedSynthesizer::duration_for(&long));
    }

    #[tokio::test(start_paused = true)]
    async fn timed_synthesizer_emits_exactly_one_completion() {
        let synth = TimedSynthesizer::new(tokio::runtime::Handle::current());
        let (tx, mut rx) = mpsc::channel(4);

        synth.speak(utterance(), tx);

        assert_eq!(rx.recv().await, Some(PlaybackEvent::Finished));
        // Sender dropped after the single send — channel closes.
        assert_eq!(rx.recv().await, None);
    }
}
