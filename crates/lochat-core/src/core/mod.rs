//! Streaming engine: session state machine, drain loop, history accounting.

pub mod context;
pub mod message;
pub mod runner;
pub mod session;

pub use context::{ContextSnapshot, UsageBand, estimate, retained};
pub use message::{Message, Role};
pub use runner::drain_stream;
pub use session::{SessionSnapshot, SessionState, StreamSession};
