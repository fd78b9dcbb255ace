//! Typed events decoded from backend stream records.
//!
//! One record is one JSON object. The shapes come from the Ollama API:
//! `/api/chat` nests text under `message.content`, `/api/generate` uses a
//! top-level `response`, and `/api/pull` emits progress/status records.
//! Parsing is tolerant: a record that matches no shape, or is not valid
//! JSON at all, maps to `Unknown` and the stream continues.

use serde::Deserialize;
use serde_json::Value;

/// Events decoded from backend records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    /// Incremental generated text
    Token(String),
    /// Download progress in bytes
    Progress { completed: u64, total: u64 },
    /// Status text from the backend (e.g., pull phases)
    Status(String),
    /// Error reported by the backend through the stream
    Error(String),
    /// Unrecognized or malformed record (skipped)
    Unknown,
}

#[derive(Debug, Deserialize)]
struct ChatRecord {
    message: ChatMessageRecord,
}

#[derive(Debug, Deserialize)]
struct ChatMessageRecord {
    content: String,
}

#[derive(Debug, Deserialize)]
struct GenerateRecord {
    response: String,
}

#[derive(Debug, Deserialize)]
struct ProgressRecord {
    completed: u64,
    total: u64,
}

#[derive(Debug, Deserialize)]
struct StatusRecord {
    status: String,
}

#[derive(Debug, Deserialize)]
struct ErrorRecord {
    error: String,
}

/// Parses one record into a `BackendEvent`. Never fails.
///
/// Shapes are checked in a fixed order; progress is checked before status
/// because pull progress records carry both fields.
pub fn parse_record(record: &str) -> BackendEvent {
    let Ok(value) = serde_json::from_str::<Value>(record) else {
        return BackendEvent::Unknown;
    };

    if let Ok(chat) = ChatRecord::deserialize(&value) {
        return BackendEvent::Token(chat.message.content);
    }
    if let Ok(generate) = GenerateRecord::deserialize(&value) {
        return BackendEvent::Token(generate.response);
    }
    if let Ok(progress) = ProgressRecord::deserialize(&value) {
        return BackendEvent::Progress {
            completed: progress.completed,
            total: progress.total,
        };
    }
    if let Ok(status) = StatusRecord::deserialize(&value) {
        return BackendEvent::Status(status.status);
    }
    if let Ok(error) = ErrorRecord::deserialize(&value) {
        return BackendEvent::Error(error.error);
    }

    BackendEvent::Unknown
}
