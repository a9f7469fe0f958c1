//! The speech interaction controller.
//!
//! [`SpeechController`] owns the [`SpeakPhase`] state machine, the live
//! transcript pair, and the at-most-one recognition session.  The host calls
//! [`start_order`]/[`start_thanks`]/[`reset`] from its input handlers, feeds
//! capability events into [`handle_event`], and calls [`poll`] every frame so
//! the capability-absent fallback timer can fire.
//!
//! # Transcript semantics
//!
//! The backend resends the full result set on every update, so
//! `handle_event` **replaces** both transcripts with the latest snapshot:
//! `final` is the concatenation of committed segments in result order,
//! `interim` the concatenation of the rest.  Both are cleared on entry into
//! a listening phase and on reset; `interim` is additionally cleared whenever
//! a listening phase ends.
//!
//! [`start_order`]: SpeechController::start_order
//! [`start_thanks`]: SpeechController::start_thanks
//! [`reset`]: SpeechController::reset
//! [`handle_event`]: SpeechController::handle_event
//! [`poll`]: SpeechController::poll

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use super::phase::SpeakPhase;
use super::recognizer::{Recognizer, SessionConfig, SessionEvent, SessionHandle};

// ---------------------------------------------------------------------------
// SpeechController
// ---------------------------------------------------------------------------

/// Finite-state controller for the simulated counter conversation.
///
/// Created once per mounted widget; dropped (after [`reset`]) on unmount.
/// No state outlives it.
///
/// [`reset`]: SpeechController::reset
pub struct SpeechController {
    phase: SpeakPhase,
    final_transcript: String,
    interim_transcript: String,

    /// The speech-to-text capability, if the host has one.
    recognizer: Option<Arc<dyn Recognizer>>,
    config: SessionConfig,
    /// Cloned into every session so the capability can deliver events.
    events: mpsc::Sender<SessionEvent>,

    /// Handle to the live session.  `None` outside listening phases and in
    /// fallback mode.
    session: Option<SessionHandle>,
    /// Monotonic session id; stale events are filtered by comparing ids.
    session_seq: u64,

    /// When the capability is absent: the instant at which the current
    /// listening phase auto-advances.
    fallback_deadline: Option<Instant>,
    fallback_delay: Duration,
}

impl SpeechController {
    /// Auto-advance delay used when no recognition capability exists.
    pub const DEFAULT_FALLBACK_DELAY: Duration = Duration::from_secs(2);

    /// Create a controller.
    ///
    /// * `recognizer` — `None` selects the fixed-delay fallback for every
    ///   listening phase.
    /// * `events`     — sender handed to each session; the host owns the
    ///   receiving end and forwards into [`handle_event`](Self::handle_event).
    pub fn new(
        recognizer: Option<Arc<dyn Recognizer>>,
        config: SessionConfig,
        events: mpsc::Sender<SessionEvent>,
        fallback_delay: Duration,
    ) -> Self {
        Self {
            phase: SpeakPhase::Idle,
            final_transcript: String::new(),
            interim_transcript: String::new(),
            recognizer,
            config,
            events,
            session: None,
            session_seq: 0,
            fallback_deadline: None,
            fallback_delay,
        }
    }

    // -----------------------------------------------------------------------
    // Host-driven transitions
    // -----------------------------------------------------------------------

    /// `Idle → ListenOrder`.  Ignored from any other phase, so a redundant
    /// call cannot restart the session or the fallback timer.
    pub fn start_order(&mut self, now: Instant) {
        if self.phase != SpeakPhase::Idle {
            log::debug!("start_order ignored in phase {}", self.phase.label());
            return;
        }
        self.begin_listening(SpeakPhase::ListenOrder, now);
    }

    /// `ConfirmOrder → ListenThanks`.  Ignored from any other phase.
    pub fn start_thanks(&mut self, now: Instant) {
        if self.phase != SpeakPhase::ConfirmOrder {
            log::debug!("start_thanks ignored in phase {}", self.phase.label());
            return;
        }
        self.begin_listening(SpeakPhase::ListenThanks, now);
    }

    /// Abort any live session, clear both transcripts, and force `Idle`.
    /// Valid from every phase; a no-op abort is silent.
    pub fn reset(&mut self) {
        if let Some(session) = self.session.take() {
            session.abort();
        }
        self.phase = SpeakPhase::Idle;
        self.final_transcript.clear();
        self.interim_transcript.clear();
        self.fallback_deadline = None;
        log::debug!("speech controller reset");
    }

    fn begin_listening(&mut self, phase: SpeakPhase, now: Instant) {
        debug_assert!(phase.is_listening());

        self.final_transcript.clear();
        self.interim_transcript.clear();

        // At most one live session: terminate any prior one first.
        if let Some(session) = self.session.take() {
            session.abort();
        }

        self.phase = phase;
        log::info!("entering {}", phase.label());

        match &self.recognizer {
            Some(recognizer) => {
                self.session_seq += 1;
                let handle =
                    recognizer.start(self.session_seq, &self.config, self.events.clone());
                self.session = Some(handle);
                self.fallback_deadline = None;
            }
            None => {
                // Capability absent: auto-advance after the fixed delay,
                // transcripts stay empty.
                self.fallback_deadline = Some(now + self.fallback_delay);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Capability events
    // -----------------------------------------------------------------------

    /// Apply one session event.  Events from anything but the current live
    /// session — aborted predecessors, or arrivals after the phase already
    /// advanced — are discarded.
    pub fn handle_event(&mut self, event: SessionEvent) {
        let current = match &self.session {
            Some(session) if self.phase.is_listening() => session.id(),
            _ => {
                log::debug!("discarding event for session {}", event.session());
                return;
            }
        };
        if event.session() != current {
            log::debug!(
                "discarding stale event for session {} (current {current})",
                event.session()
            );
            return;
        }

        match event {
            SessionEvent::Results { segments, .. } => {
                // Full-snapshot replace, never append.
                self.final_transcript.clear();
                self.interim_transcript.clear();
                for segment in &segments {
                    if segment.is_final {
                        self.final_transcript.push_str(&segment.text);
                    } else {
                        self.interim_transcript.push_str(&segment.text);
                    }
                }
            }
            SessionEvent::Ended { .. } => self.advance_from_listening(),
            SessionEvent::Errored { message, .. } => {
                // An erroring session advances exactly like an ending one.
                log::warn!("speech session error (advancing anyway): {message}");
                self.advance_from_listening();
            }
        }
    }

    /// Check the fallback timer.  Call once per frame with the current time;
    /// tests pass fabricated instants instead of waiting.
    pub fn poll(&mut self, now: Instant) {
        if let Some(deadline) = self.fallback_deadline {
            if self.phase.is_listening() && now >= deadline {
                log::debug!("fallback delay elapsed in {}", self.phase.label());
                self.advance_from_listening();
            }
        }
    }

    fn advance_from_listening(&mut self) {
        self.session = None;
        self.fallback_deadline = None;
        self.interim_transcript.clear();
        self.phase = self.phase.after_listening();
        log::info!("advanced to {}", self.phase.label());
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn phase(&self) -> SpeakPhase {
        self.phase
    }

    /// Committed text of the current (or just-ended) listening phase.
    pub fn final_transcript(&self) -> &str {
        &self.final_transcript
    }

    /// Latest not-yet-committed text; non-empty only while listening.
    pub fn interim_transcript(&self) -> &str {
        &self.interim_transcript
    }

    /// Whether a recognition session is currently live.
    pub fn has_live_session(&self) -> bool {
        self.session.is_some()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
