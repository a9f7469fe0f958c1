//! Speech interaction subsystem.
//!
//! # Architecture
//!
//! ```text
//! host input ──start_order/start_thanks/reset──▶ ┌──────────────────┐
//!                                                │ SpeechController │
//! Recognizer capability ──SessionEvent──────────▶│  SpeakPhase       │
//!   (or fixed-delay fallback via poll())         │  transcripts      │
//!                                                └──────────────────┘
//!
//! host input ──play()──▶ ┌───────────┐
//!                        │ Announcer │◀── PlaybackEvent ── Synthesizer
//!                        └───────────┘
//! ```
//!
//! Both capabilities are optional trait objects; their absence selects the
//! degraded paths (auto-advance after a fixed delay, `Unsupported` audio
//! status).  Events travel over `tokio::sync::mpsc` channels that the egui
//! host drains with `try_recv` every frame.

pub mod announcer;
pub mod controller;
pub mod phase;
pub mod recognizer;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use announcer::{Announcer, AudioStatus, PlaybackEvent, Synthesizer, TimedSynthesizer, Utterance};
pub use controller::SpeechController;
pub use phase::SpeakPhase;
pub use recognizer::{
    Recognizer, ScriptedRecognizer, SessionConfig, SessionEvent, SessionHandle, TranscriptSegment,
};

// test-only re-export so sibling test modules can use the mock without the
// full recognizer path.
#[cfg(test)]
pub use recognizer::MockRecognizer;
