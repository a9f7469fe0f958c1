//! Speech-recognition capability trait and session plumbing.
//!
//! # Overview
//!
//! [`Recognizer`] is the seam between the [`SpeechController`] and whatever
//! speech-to-text backend the host provides.  It is object-safe and
//! `Send + Sync` so it can be held behind an `Arc<dyn Recognizer>` — or not
//! held at all: the controller treats an absent recognizer as the
//! capability-missing case and falls back to a fixed-delay auto-advance.
//!
//! A *session* is one run of the capability: a stream of
//! [`SessionEvent::Results`] snapshots followed by exactly one terminal
//! [`SessionEvent::Ended`] or [`SessionEvent::Errored`].  Every event carries
//! the session id it belongs to, so events from an aborted session can be
//! discarded instead of mutating the next session's transcript.
//!
//! [`ScriptedRecognizer`] is the shipped implementation: it replays a canned
//! line as a growing interim snapshot, commits it as final, and ends the
//! session — the same event shape a real continuous recognizer produces.
//!
//! [`SpeechController`]: super::SpeechController

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration passed to the capability when a session is opened.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// BCP-47 language tag, e.g. `"ja-JP"`.
    pub language: String,
    /// Deliver not-yet-committed partial results.
    pub interim_results: bool,
    /// Keep the session open across utterance boundaries.
    pub continuous: bool,
    /// Alternatives per result — the controller only ever reads the first.
    pub max_alternatives: u32,
}

impl SessionConfig {
    /// The widget's session shape: interim results on, single utterance,
    /// one alternative.
    pub fn for_language(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            interim_results: true,
            continuous: false,
            max_alternatives: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// One entry of a recognition result set.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    /// Recognized text; an absent field from the backend maps to `""`.
    pub text: String,
    /// `true` once the backend has committed this segment.
    pub is_final: bool,
}

impl TranscriptSegment {
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }

    pub fn committed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }
}

/// Events a recognition session delivers to the controller.
///
/// `Results` carries the **full** result set each time — the backend resends
/// everything on every update, so the receiver replaces its transcript state
/// rather than appending.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A fresh snapshot of all segments recognized so far.
    Results {
        session: u64,
        segments: Vec<TranscriptSegment>,
    },
    /// The session terminated normally.
    Ended { session: u64 },
    /// The session terminated with an error.  Treated exactly like `Ended`
    /// by the controller; the message is only logged.
    Errored { session: u64, message: String },
}

impl SessionEvent {
    /// Id of the session this event belongs to.
    pub fn session(&self) -> u64 {
        match self {
            SessionEvent::Results { session, .. }
            | SessionEvent::Ended { session }
            | SessionEvent::Errored { session, .. } => *session,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionHandle
// ---------------------------------------------------------------------------

/// Handle to a live recognition session.
///
/// Cloned into the backend task; aborting is a one-way flag flip.  Aborting
/// an already-ended or already-aborted session is a silent no-op.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: u64,
    aborted: Arc<AtomicBool>,
}

impl SessionHandle {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            aborted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Session id, matching the `session` field of its events.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Request termination.  The backend stops emitting events as soon as it
    /// observes the flag; events already in flight are filtered out by id on
    /// the receiving side.
    pub fn abort(&self) {
        if !self.aborted.swap(true, Ordering::SeqCst) {
            log::debug!("speech session {} aborted", self.id);
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Recognizer trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe speech-to-text capability.
///
/// # Contract
///
/// Per `start` call the implementation must deliver, on `events`, zero or
/// more `Results` snapshots followed by exactly one `Ended` or `Errored`,
/// all tagged with the given `session` id — unless the returned handle is
/// aborted first, in which case it simply stops.
pub trait Recognizer: Send + Sync {
    fn start(
        &self,
        session: u64,
        config: &SessionConfig,
        events: mpsc::Sender<SessionEvent>,
    ) -> SessionHandle;
}

// Compile-time assertion: Box<dyn Recognizer> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn Recognizer>) {}
};

// ---------------------------------------------------------------------------
// ScriptedRecognizer
// ---------------------------------------------------------------------------

/// Replays canned lines as recognition sessions.
///
/// Each session picks the next line in order (cycling), emits a growing
/// interim snapshot one character at a time, then a final snapshot, then
/// `Ended`.  Used as the runtime capability on hosts without a real
/// speech-to-text backend, and it exercises the full session contract.
pub struct ScriptedRecognizer {
    lines: Vec<String>,
    next_line: AtomicUsize,
    char_interval: Duration,
    rt: tokio::runtime::Handle,
}

impl ScriptedRecognizer {
    /// Pace at which characters "arrive", roughly matching unhurried speech.
    pub const DEFAULT_CHAR_INTERVAL: Duration = Duration::from_millis(140);

    pub fn new(lines: Vec<String>, rt: tokio::runtime::Handle) -> Self {
        Self {
            lines,
            next_line: AtomicUsize::new(0),
            char_interval: Self::DEFAULT_CHAR_INTERVAL,
            rt,
        }
    }

    /// Override the per-character pacing (tests use a short interval).
    pub fn with_char_interval(mut self, interval: Duration) -> Self {
        self.char_interval = interval;
        self
    }
}

impl Recognizer for ScriptedRecognizer {
    fn start(
        &self,
        session: u64,
        config: &SessionConfig,
        events: mpsc::Sender<SessionEvent>,
    ) -> SessionHandle {
        let handle = SessionHandle::new(session);
        let task_handle = handle.clone();

        let line = if self.lines.is_empty() {
            String::new()
        } else {
            let idx = self.next_line.fetch_add(1, Ordering::Relaxed) % self.lines.len();
            self.lines[idx].clone()
        };

        log::debug!(
            "scripted session {session} ({}): {line:?}",
            config.language
        );

        let interval = self.char_interval;
        self.rt.spawn(async move {
            let chars: Vec<char> = line.chars().collect();

            for i in 1..=chars.len() {
                tokio::time::sleep(interval).await;
                if task_handle.is_aborted() {
                    return;
                }
                let partial: String = chars[..i].iter().collect();
                let _ = events
                    .send(SessionEvent::Results {
                        session,
                        segments: vec![TranscriptSegment::interim(partial)],
                    })
                    .await;
            }

            tokio::time::sleep(interval).await;
            if task_handle.is_aborted() {
                return;
            }
            let _ = events
                .send(SessionEvent::Results {
                    session,
                    segments: vec![TranscriptSegment::committed(line)],
                })
                .await;
            let _ = events.send(SessionEvent::Ended { session }).await;
        });

        handle
    }
}

// ---------------------------------------------------------------------------
// MockRecognizer  (test-only)
// ---------------------------------------------------------------------------

/// Test double that records `start` calls and hands out inspectable handles
/// without spawning anything.  Tests drive the event channel themselves.
#[cfg(test)]
pub struct MockRecognizer {
    pub starts: std::sync::Mutex<Vec<(u64, SessionConfig)>>,
    pub handles: std::sync::Mutex<Vec<SessionHandle>>,
}

#[cfg(test)]
impl MockRecognizer {
    pub fn new() -> Self {
        Self {
            starts: std::sync::Mutex::new(Vec::new()),
            handles: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Number of sessions started and not yet aborted.
    pub fn live_sessions(&self) -> usize {
        self.handles
            .lock()
            .unwrap()
            .iter()
            .filter(|h| !h.is_aborted())
            .count()
    }

    pub fn start_count(&self) -> usize {
        self.starts.lock().unwrap().len()
    }
}

#[cfg(test)]
impl Recognizer for MockRecognizer {
    fn start(
        &self,
        session: u64,
        config: &SessionConfig,
        _events: mpsc::Sender<SessionEvent>,
    ) -> SessionHandle {
        let handle = SessionHandle::new(session);
        self.starts.lock().unwrap().push((session, config.clone()));
        self.handles.lock().unwrap().push(handle.clone());
        handle
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- SessionConfig ---

    #[test]
    fn widget_session_config_shape() {
        let cfg = SessionConfig::for_language("ja-JP");
        assert_eq!(cfg.language, "ja-JP");
        assert!(cfg.interim_results);
        assert!(!cfg.continuous);
        assert_eq!(cfg.max_alternatives, 1);
    }

    // ---- SessionHandle ---

    #[test]
    fn abort_is_idempotent() {
        let handle = SessionHandle::new(3);
        assert!(!handle.is_aborted());
        handle.abort();
        handle.abort(); // second abort must be a silent no-op
        assert!(handle.is_aborted());
    }

    #[test]
    fn abort_is_visible_through_clones() {
        let handle = SessionHandle::new(1);
        let clone = handle.clone();
        handle.abort();
        assert!(clone.is_aborted());
    }

    #[test]
    fn event_session_ids_round_trip() {
        assert_eq!(SessionEvent::Ended { session: 9 }.session(), 9);
        assert_eq!(
            SessionEvent::Errored {
                session: 4,
                message: "network".into()
            }
            .session(),
            4
        );
    }

    // ---- ScriptedRecognizer ---

    #[tokio::test(start_paused = true)]
    async fn scripted_session_emits_growing_snapshots_then_final_then_end() {
        let rec = ScriptedRecognizer::new(
            vec!["こん".into()],
            tokio::runtime::Handle::current(),
        )
        .with_char_interval(Duration::from_millis(10));

        let (tx, mut rx) = mpsc::channel(16);
        let _handle = rec.start(1, &SessionConfig::for_language("ja-JP"), tx);

        // 2 chars → 2 interim snapshots, 1 final snapshot, 1 end.
        let mut snapshots = Vec::new();
        loop {
            match rx.recv().await.expect("channel open") {
                SessionEvent::Results { segments, .. } => snapshots.push(segments),
                SessionEvent::Ended { session } => {
                    assert_eq!(session, 1);
                    break;
                }
                SessionEvent::Errored { .. } => panic!("unexpected error"),
            }
        }

        assert_eq!(snapshots.len(), 3);
        assert_eq!(snapshots[0], vec![TranscriptSegment::interim("こ")]);
        assert_eq!(snapshots[1], vec![TranscriptSegment::interim("こん")]);
        assert_eq!(snapshots[2], vec![TranscriptSegment::committed("こん")]);
    }

    #[tokio::test(start_paused = true)]
    async fn aborted_scripted_session_stops_emitting() {
        let rec = ScriptedRecognizer::new(
            vec!["ありがとう".into()],
            tokio::runtime::Handle::current(),
        )
        .with_char_interval(Duration::from_millis(10));

        let (tx, mut rx) = mpsc::channel(16);
        let handle = rec.start(1, &SessionConfig::for_language("ja-JP"), tx);
        handle.abort();

        // The task observes the flag before its first emission, drops the
        // sender, and the channel closes without any event.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn scripted_sessions_cycle_through_lines() {
        let rec = ScriptedRecognizer::new(
            vec!["a".into(), "b".into()],
            tokio::runtime::Handle::current(),
        )
        .with_char_interval(Duration::from_millis(1));

        async fn final_text(rx: &mut mpsc::Receiver<SessionEvent>) -> String {
            let mut last = String::new();
            while let Some(ev) = rx.recv().await {
                match ev {
                    SessionEvent::Results { segments, .. } => {
                        if let Some(seg) = segments.iter().find(|s| s.is_final) {
                            last = seg.text.clone();
                        }
                    }
                    _ => break,
                }
            }
            last
        }

        let (tx, mut rx) = mpsc::channel(16);
        let _h = rec.start(1, &SessionConfig::for_language("ja-JP"), tx);
        assert_eq!(final_text(&mut rx).await, "a");

        let (tx, mut rx) = mpsc::channel(16);
        let _h = rec.start(2, &SessionConfig::for_language("ja-JP"), tx);
        assert_eq!(final_text(&mut rx).await, "b");

        let (tx, mut rx) = mpsc::channel(16);
        let _h = rec.start(3, &SessionConfig::for_language("ja-JP"), tx);
        assert_eq!(final_text(&mut rx).await, "a", "cycles back to the start");
    }
}
