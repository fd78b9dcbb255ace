//! Structured errors for the backend stream pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Categories of stream errors for consistent handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamErrorKind {
    /// Connection dropped, unreachable, or timed out mid-stream
    Transport,
    /// Non-2xx HTTP status before streaming began
    HttpStatus,
    /// `start()` was invoked while a session was already running
    Busy,
    /// The backend reported an error through the stream itself
    Backend,
}

impl fmt::Display for StreamErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamErrorKind::Transport => write!(f, "transport"),
            StreamErrorKind::HttpStatus => write!(f, "http_status"),
            StreamErrorKind::Busy => write!(f, "busy"),
            StreamErrorKind::Backend => write!(f, "backend"),
        }
    }
}

/// Structured stream error with kind and details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamError {
    /// Error category
    pub kind: StreamErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Optional additional details (e.g., raw error body)
    pub details: Option<String>,
}

impl StreamError {
    /// Creates a new stream error.
    pub fn new(kind: StreamErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Creates a transport error (connect failure, mid-stream drop, timeout).
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(StreamErrorKind::Transport, message)
    }

    /// Creates an HTTP status error, extracting a cleaner message from a
    /// JSON error body when one is present.
    pub fn http_status(status: u16, body: &str) -> Self {
        let details = if body.is_empty() {
            None
        } else {
            Some(body.to_string())
        };
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|json| {
                json.get("error")
                    .and_then(|v| v.as_str())
                    .map(|msg| format!("HTTP {status}: {msg}"))
            })
            .unwrap_or_else(|| format!("HTTP {status}"));
        Self {
            kind: StreamErrorKind::HttpStatus,
            message,
            details,
        }
    }

    /// Creates a busy error for a rejected double-start.
    pub fn busy() -> Self {
        Self::new(
            StreamErrorKind::Busy,
            "a streaming operation is already running",
        )
    }

    /// Creates a backend error from an error record in the stream.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::new(StreamErrorKind::Backend, message)
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for StreamError {}

/// Result type for backend stream operations.
pub type StreamResult<T> = std::result::Result<T, StreamError>;
