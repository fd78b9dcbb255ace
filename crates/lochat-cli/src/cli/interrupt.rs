//! Ctrl+C wiring.
//!
//! The handler only cancels the token armed for the current streaming
//! operation; the command loop owns all printing. A second Ctrl+C while the
//! first is still being honored force-exits.

use std::sync::{Mutex, OnceLock};

use tokio_util::sync::CancellationToken;

static CURRENT: OnceLock<Mutex<CancellationToken>> = OnceLock::new();

fn slot() -> &'static Mutex<CancellationToken> {
    CURRENT.get_or_init(|| Mutex::new(CancellationToken::new()))
}

/// Installs the Ctrl+C handler.
///
/// # Panics
/// Panics if registering the handler fails.
pub fn init() {
    ctrlc::set_handler(|| {
        let Ok(token) = slot().lock() else {
            std::process::exit(130);
        };
        if token.is_cancelled() {
            // Second interrupt - force exit.
            std::process::exit(130);
        }
        token.cancel();
    })
    .expect("Error setting Ctrl+C handler");
}

/// Arms a fresh token for the next streaming operation and returns it.
pub fn arm() -> CancellationToken {
    let token = CancellationToken::new();
    if let Ok(mut current) = slot().lock() {
        *current = token.clone();
    }
    token
}
