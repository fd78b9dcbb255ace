//! Newline-delimited record decoding over a fragmented byte stream.
//!
//! Ollama streams one JSON object per line. Chunks arrive at arbitrary
//! boundaries, so bytes are buffered until a newline terminates a record;
//! text decoding happens only on complete records. A multi-byte character
//! split across a chunk boundary is therefore reconstructed intact.

use std::fmt;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

use super::error::{StreamError, StreamResult};

/// Splits raw byte chunks into complete newline-terminated records.
///
/// Any trailing partial record is retained internally and prefixed onto the
/// next `feed` call; it is never emitted until terminated or flushed.
#[derive(Debug, Default)]
pub struct RecordDecoder {
    pending: Vec<u8>,
}

impl RecordDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk and returns the records it completed, in order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut records = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
            line.pop(); // the newline itself
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            records.push(String::from_utf8_lossy(&line).into_owned());
        }
        records
    }

    /// Emits the pending partial record at stream end.
    ///
    /// Returns `None` if the remainder is empty after trimming whitespace.
    pub fn flush(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.pending);
        let text = String::from_utf8_lossy(&rest);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// Stream adapter that yields decoded records from a byte stream.
///
/// Transport errors from the underlying stream surface as `StreamError`s;
/// at stream end the pending partial record (if any) is flushed.
pub struct RecordStream<S> {
    inner: S,
    decoder: RecordDecoder,
    buffered: std::collections::VecDeque<String>,
    done: bool,
}

impl<S> fmt::Debug for RecordStream<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStream")
            .field("decoder", &self.decoder)
            .field("buffered", &self.buffered)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl<S> RecordStream<S> {
    pub fn new(stream: S) -> Self {
        Self {
            inner: stream,
            decoder: RecordDecoder::new(),
            buffered: std::collections::VecDeque::new(),
            done: false,
        }
    }
}

impl<S, E> Stream for RecordStream<S>
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Unpin,
    E: std::error::Error + Send + Sync + 'static,
{
    type Item = StreamResult<String>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        use std::task::Poll;

        loop {
            if let Some(record) = self.buffered.pop_front() {
                return Poll::Ready(Some(Ok(record)));
            }
            if self.done {
                return Poll::Ready(None);
            }

            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    let records = self.decoder.feed(&chunk);
                    self.buffered.extend(records);
                }
                Poll::Ready(Some(Err(e))) => {
                    self.done = true;
                    return Poll::Ready(Some(Err(StreamError::transport(format!(
                        "stream error: {e}"
                    )))));
                }
                Poll::Ready(None) => {
                    self.done = true;
                    if let Some(rest) = self.decoder.flush() {
                        self.buffered.push_back(rest);
                    }
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;

    use super::*;

    /// Decodes a byte sequence in one go, with flush.
    fn decode_whole(data: &[u8]) -> Vec<String> {
        let mut decoder = RecordDecoder::new();
        let mut records = decoder.feed(data);
        records.extend(decoder.flush());
        records
    }

    /// Decodes the same byte sequence split at every position `step` bytes apart.
    fn decode_split(data: &[u8], step: usize) -> Vec<String> {
        let mut decoder = RecordDecoder::new();
        let mut records = Vec::new();
        for chunk in data.chunks(step) {
            records.extend(decoder.feed(chunk));
        }
        records.extend(decoder.flush());
        records
    }

    #[test]
    fn test_feed_splits_on_newlines() {
        let mut decoder = RecordDecoder::new();
        let records = decoder.feed(b"{\"a\":1}\n{\"b\":2}\n");
        assert_eq!(records, vec!["{\"a\":1}", "{\"b\":2}"]);
    }

    #[test]
    fn test_partial_record_held_across_feeds() {
        let mut decoder = RecordDecoder::new();
        assert!(decoder.feed(b"{\"mess").is_empty());
        let records = decoder.feed(b"age\":{}}\n");
        assert_eq!(records, vec!["{\"message\":{}}"]);
    }

    #[test]
    fn test_arbitrary_chunking_is_equivalent() {
        let data = "{\"response\":\"a\"}\n{\"response\":\"b\"}\n{\"status\":\"success\"}\n".as_bytes();
        let whole = decode_whole(data);
        for step in 1..data.len() {
            assert_eq!(decode_split(data, step), whole, "split at step {step}");
        }
    }

    #[test]
    fn test_multibyte_char_split_across_chunks() {
        // 👋 = F0 9F 91 8B; split inside the code point.
        let data = "{\"response\":\"hi 👋\"}\n".as_bytes();
        let emoji_start = data
            .windows(4)
            .position(|w| w == [0xF0, 0x9F, 0x91, 0x8B])
            .unwrap();
        let split = emoji_start + 2;

        let mut decoder = RecordDecoder::new();
        assert!(decoder.feed(&data[..split]).is_empty());
        let records = decoder.feed(&data[split..]);
        assert_eq!(records, vec!["{\"response\":\"hi 👋\"}"]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut decoder = RecordDecoder::new();
        let records = decoder.feed(b"{\"a\":1}\r\n{\"b\":2}\r\n");
        assert_eq!(records, vec!["{\"a\":1}", "{\"b\":2}"]);
    }

    #[test]
    fn test_flush_emits_unterminated_record() {
        let mut decoder = RecordDecoder::new();
        assert!(decoder.feed(b"{\"done\":true}").is_empty());
        assert_eq!(decoder.flush().as_deref(), Some("{\"done\":true}"));
    }

    #[test]
    fn test_flush_discards_whitespace_remainder() {
        let mut decoder = RecordDecoder::new();
        assert_eq!(decoder.feed(b"{\"a\":1}\n  \t"), vec!["{\"a\":1}"]);
        assert_eq!(decoder.flush(), None);
    }

    #[test]
    fn test_flush_on_empty_decoder() {
        let mut decoder = RecordDecoder::new();
        assert_eq!(decoder.flush(), None);
    }

    #[tokio::test]
    async fn test_record_stream_yields_records_and_flushes() {
        let chunks: Vec<std::result::Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(b"{\"a\":1}\n{\"b\"")),
            Ok(Bytes::from_static(b":2}\n{\"c\":3}")),
        ];
        let mut stream = RecordStream::new(futures_util::stream::iter(chunks));

        let mut records = Vec::new();
        while let Some(result) = stream.next().await {
            records.push(result.unwrap());
        }
        assert_eq!(records, vec!["{\"a\":1}", "{\"b\":2}", "{\"c\":3}"]);
    }

    #[test]
    fn test_record_stream_debug_elides_inner_stream() {
        let stream =
            RecordStream::new(futures_util::stream::empty::<Result<Bytes, std::io::Error>>());
        let rendered = format!("{stream:?}");
        assert!(rendered.contains("RecordStream"));
        assert!(rendered.contains("done: false"));
    }

    #[tokio::test]
    async fn test_record_stream_surfaces_transport_error() {
        let chunks: Vec<std::result::Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(b"{\"a\":1}\n")),
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset",
            )),
        ];
        let mut stream = RecordStream::new(futures_util::stream::iter(chunks));

        assert_eq!(stream.next().await.unwrap().unwrap(), "{\"a\":1}");
        let err = stream.next().await.unwrap().unwrap_err();
        assert_eq!(err.kind, crate::backend::error::StreamErrorKind::Transport);
        assert!(stream.next().await.is_none());
    }
}
