//! Snapshot rendering for streamed output.
//!
//! Rendering reads the latest session snapshot, never individual events: a
//! missed update costs nothing because the next snapshot carries the full
//! accumulated state.

use std::io::Write;

use lochat_core::core::{SessionSnapshot, SessionState};
use tokio::sync::watch;

/// Prints streamed text as it accumulates, returning the terminal snapshot.
///
/// Only the not-yet-printed suffix of the accumulated text is written on
/// each update, so output appears incrementally without reprinting.
pub async fn print_stream(mut rx: watch::Receiver<SessionSnapshot>) -> SessionSnapshot {
    let mut printed = 0;
    loop {
        let terminal = {
            let snapshot = rx.borrow_and_update();
            if snapshot.text.len() > printed {
                print!("{}", &snapshot.text[printed..]);
                let _ = std::io::stdout().flush();
                printed = snapshot.text.len();
            }
            snapshot.state.is_terminal().then(|| (*snapshot).clone())
        };
        if let Some(snapshot) = terminal {
            return snapshot;
        }
        if rx.changed().await.is_err() {
            return rx.borrow().clone();
        }
    }
}

/// Prints download status and progress, returning the terminal snapshot.
///
/// Each status phase gets its own line; progress updates rewrite the
/// current line in place.
pub async fn print_progress(mut rx: watch::Receiver<SessionSnapshot>) -> SessionSnapshot {
    let mut current_status: Option<String> = None;
    loop {
        let terminal = {
            let snapshot = rx.borrow_and_update();
            if snapshot.status != current_status {
                if current_status.is_some() {
                    println!();
                }
                if let Some(status) = &snapshot.status {
                    print!("{status}");
                    let _ = std::io::stdout().flush();
                }
                current_status = snapshot.status.clone();
            } else if let Some(status) = &snapshot.status {
                let pct = (snapshot.progress * 100.0).round();
                print!("\r{status} {pct:>3.0}%");
                let _ = std::io::stdout().flush();
            }
            snapshot.state.is_terminal().then(|| (*snapshot).clone())
        };
        if let Some(snapshot) = terminal {
            if current_status.is_some() {
                println!();
            }
            return snapshot;
        }
        if rx.changed().await.is_err() {
            if current_status.is_some() {
                println!();
            }
            return rx.borrow().clone();
        }
    }
}

/// Reports a non-success terminal state on stderr.
pub fn report_outcome(snapshot: &SessionSnapshot) {
    match snapshot.state {
        SessionState::Failed => match &snapshot.error {
            Some(e) => eprintln!("error: {e}"),
            None => eprintln!("error: stream failed"),
        },
        SessionState::Cancelled => {
            eprintln!("(cancelled)");
        }
        _ => {}
    }
}
