//! Backend transport and stream decoding (Ollama NDJSON).

pub mod client;
pub mod error;
pub mod event;
pub mod ndjson;

pub use client::{BackendRecords, GenerateOptions, OllamaClient};
pub use error::{StreamError, StreamErrorKind, StreamResult};
pub use event::{BackendEvent, parse_record};
pub use ndjson::{RecordDecoder, RecordStream};
