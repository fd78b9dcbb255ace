//! Per-operation streaming state machine.
//!
//! A `StreamSession` is owned exclusively by the pipeline draining the
//! transport (single producer); subscribers observe it through read-only
//! snapshots published on a watch channel. Rendering always uses the latest
//! snapshot, never accumulated deltas, so a skipped render or a replay can
//! never diverge from the session's actual state.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::backend::{BackendEvent, StreamError, StreamResult};

/// Status text that marks a download stream as successfully finished.
///
/// Matched exactly: pull streams emit intermediate statuses such as
/// "verifying sha256 digest" where a substring rule would be fragile.
const SUCCESS_STATUS: &str = "success";

/// Lifecycle states of a streaming operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl SessionState {
    /// Returns true for states no event can leave (only `start()` can).
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Failed | SessionState::Cancelled
        )
    }
}

/// Immutable full read of a session's state, published on every applied
/// event. Subscribers render from this and nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    /// Text accumulated from `Token` events so far.
    pub text: String,
    /// Download progress in `[0, 1]`.
    pub progress: f64,
    /// Most recent status text from the backend, if any.
    pub status: Option<String>,
    /// Backend or transport error once `Failed`.
    pub error: Option<StreamError>,
}

impl SessionSnapshot {
    fn idle() -> Self {
        Self {
            state: SessionState::Idle,
            text: String::new(),
            progress: 0.0,
            status: None,
            error: None,
        }
    }
}

/// State machine accumulating one streaming operation.
///
/// `Idle → Running → {Completed, Failed, Cancelled}`; no transition leaves
/// a terminal state except an explicit `start()`, which resets everything.
pub struct StreamSession {
    state: SessionState,
    text: String,
    progress: f64,
    status: Option<String>,
    error: Option<StreamError>,
    tx: watch::Sender<SessionSnapshot>,
}

impl StreamSession {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(SessionSnapshot::idle());
        Self {
            state: SessionState::Idle,
            text: String::new(),
            progress: 0.0,
            status: None,
            error: None,
            tx,
        }
    }

    /// Returns a receiver observing the latest snapshot.
    ///
    /// Receivers created at any point see the current snapshot immediately;
    /// they never see intermediate history they missed.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Builds a snapshot of the full current state.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            text: self.text.clone(),
            progress: self.progress,
            status: self.status.clone(),
            error: self.error.clone(),
        }
    }

    /// Begins a new operation, resetting accumulator, progress and error.
    ///
    /// Rejected with a `Busy` error while an operation is already running;
    /// the running session is left untouched.
    pub fn start(&mut self) -> StreamResult<()> {
        if self.state == SessionState::Running {
            return Err(StreamError::busy());
        }
        self.state = SessionState::Running;
        self.text.clear();
        self.progress = 0.0;
        self.status = None;
        self.error = None;
        self.publish();
        Ok(())
    }

    /// Applies one backend event.
    ///
    /// Silently ignored unless the session is `Running` — events delivered
    /// after cancellation or failure belong to a superseded operation.
    pub fn on_event(&mut self, event: BackendEvent) {
        if self.state != SessionState::Running {
            tracing::debug!(state = ?self.state, "dropping event for non-running session");
            return;
        }

        match event {
            BackendEvent::Token(text) => {
                self.text.push_str(&text);
            }
            BackendEvent::Progress { completed, total } => {
                if total == 0 {
                    // Unusable ratio; keep the previous progress.
                    return;
                }
                self.progress = (completed as f64 / total as f64).clamp(0.0, 1.0);
            }
            BackendEvent::Status(status) => {
                if status.trim() == SUCCESS_STATUS {
                    self.state = SessionState::Completed;
                }
                self.status = Some(status);
            }
            BackendEvent::Error(message) => {
                self.state = SessionState::Failed;
                self.error = Some(StreamError::backend(message));
            }
            BackendEvent::Unknown => {
                tracing::debug!("skipping unrecognized record");
                return;
            }
        }
        self.publish();
    }

    /// Handles the transport closing without an explicit terminal event.
    ///
    /// Closing the connection after the final token, with no trailing
    /// marker, is the common success path — not a failure.
    pub fn on_stream_end(&mut self) {
        if self.state == SessionState::Running {
            self.state = SessionState::Completed;
            self.publish();
        }
    }

    /// Marks the session failed, preserving everything accumulated so far.
    pub fn fail(&mut self, error: &StreamError) {
        if self.state == SessionState::Running {
            self.state = SessionState::Failed;
            self.error = Some(error.clone());
            self.publish();
        }
    }

    /// Caller-initiated cancellation.
    ///
    /// The runner must also close the transport; this only transitions the
    /// state so that any stragglers from the old stream are discarded.
    pub fn cancel(&mut self) {
        if self.state == SessionState::Running {
            self.state = SessionState::Cancelled;
            self.publish();
        }
    }

    fn publish(&self) {
        self.tx.send_replace(self.snapshot());
    }
}

impl Default for StreamSession {
    fn default() -> Self {
        Self::new()
    }
}
