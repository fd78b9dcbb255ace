//! Drives a record stream into a session until it finishes or is cancelled.

use futures_util::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::backend::{StreamResult, parse_record};
use crate::core::session::{SessionState, StreamSession};

/// Drains `records` into `session`, parsing each record into an event.
///
/// Returns when the stream ends (session completes), the session reaches a
/// terminal state through a backend event, the transport errors (session
/// fails, accumulated text preserved), or `cancel` fires. Cancellation drops
/// the stream, which closes the underlying connection.
pub async fn drain_stream<S>(
    session: &mut StreamSession,
    mut records: S,
    cancel: &CancellationToken,
) where
    S: Stream<Item = StreamResult<String>> + Unpin,
{
    loop {
        // Biased so a fired token always wins over a ready record; otherwise
        // events could still be consumed after cancellation was requested.
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                drop(records);
                session.cancel();
                return;
            }
            next = records.next() => next,
        };

        match next {
            Some(Ok(record)) => {
                session.on_event(parse_record(&record));
                if session.state() != SessionState::Running {
                    return;
                }
            }
            Some(Err(e)) => {
                tracing::warn!(error = %e, "stream transport error");
                session.fail(&e);
                return;
            }
            None => {
                session.on_stream_end();
                return;
            }
        }
    }
}
