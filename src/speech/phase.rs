//! The speak-challenge phase state machine.
//!
//! [`SpeakPhase`] drives the simulated counter conversation.  The transition
//! graph is:
//!
//! ```text
//! Idle ──start_order()──▶ ListenOrder
//!      ListenOrder ──session end / error / fallback delay──▶ ConfirmOrder
//!      ConfirmOrder ──start_thanks()──▶ ListenThanks
//!      ListenThanks ──session end / error / fallback delay──▶ ConfirmFarewell
//!      ConfirmFarewell ──reset()──▶ Idle
//! any phase ──reset()──▶ Idle
//! ```
//!
//! No other transition exists; redundant `start_*` calls are ignored by the
//! controller.

// ---------------------------------------------------------------------------
// SpeakPhase
// ---------------------------------------------------------------------------

/// Current phase of the voice interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakPhase {
    /// Waiting for the user to start ordering.
    Idle,
    /// Recognition session live (or fallback timer running) for the order.
    ListenOrder,
    /// The cook acknowledges the order — a scripted response.
    ConfirmOrder,
    /// Recognition session live (or fallback timer running) for the thanks.
    ListenThanks,
    /// The cook says goodbye — a scripted response.
    ConfirmFarewell,
}

impl SpeakPhase {
    /// Returns `true` while a recognition session is (or would be) active
    /// and the live transcript is meaningful.
    pub fn is_listening(&self) -> bool {
        matches!(self, SpeakPhase::ListenOrder | SpeakPhase::ListenThanks)
    }

    /// The confirm phase a listening phase advances to when its session
    /// terminates.  Identity for non-listening phases.
    pub fn after_listening(self) -> SpeakPhase {
        match self {
            SpeakPhase::ListenOrder => SpeakPhase::ConfirmOrder,
            SpeakPhase::ListenThanks => SpeakPhase::ConfirmFarewell,
            other => other,
        }
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            SpeakPhase::Idle => "idle",
            SpeakPhase::ListenOrder => "listen-order",
            SpeakPhase::ConfirmOrder => "confirm-order",
            SpeakPhase::ListenThanks => "listen-thanks",
            SpeakPhase::ConfirmFarewell => "confirm-farewell",
        }
    }
}

impl Default for SpeakPhase {
    fn default() -> Self {
        SpeakPhase::Idle
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
