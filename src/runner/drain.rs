//! # Stream drainer.
//!
//! One drainer task per child output stream. Each drainer continuously
//! reads lines into that stream's own buffer and into the shared combined
//! log, so neither stream's OS pipe buffer can fill and stall the child
//! while the other stream is still being read. Reading stdout to completion
//! and only then stderr can deadlock once the child fills the unread pipe;
//! the two concurrent drainers are the correctness requirement here.
//!
//! Ordering: within one stream, lines are appended in the order read (FIFO).
//! Across the two streams the combined log is best-effort only.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use crate::runner::session::{StreamChunk, StreamTag};

/// Shared, tag-interleaved log of both streams.
pub(crate) type CombinedLog = Arc<Mutex<Vec<StreamChunk>>>;

/// Drains one stream to EOF, returning that stream's lines in arrival order.
///
/// Every line is also appended to `combined`, tagged with `tag`. Lines are
/// read as raw bytes and converted lossily, so a child emitting arbitrary
/// binary output cannot abort the capture; invalid sequences become
/// replacement characters and draining continues. The drainer stops at EOF,
/// which the child's exit (or kill) guarantees; no external stop flag is
/// needed.
pub(crate) async fn drain_stream<R>(reader: R, tag: StreamTag, combined: CombinedLog) -> Vec<String>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut raw = Vec::new();
    let mut buffer = Vec::new();

    loop {
        raw.clear();
        match reader.read_until(b'\n', &mut raw).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                if raw.last() == Some(&b'\n') {
                    raw.pop();
                }
                if raw.last() == Some(&b'\r') {
                    raw.pop();
                }
                let line = String::from_utf8_lossy(&raw).into_owned();
                combined
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(StreamChunk {
                        tag,
                        text: line.clone(),
                    });
                buffer.push(line);
            }
        }
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn preserves_line_order_within_stream() {
        let input: &[u8] = b"one\ntwo\nthree\n";
        let combined: CombinedLog = Arc::default();
        let lines = drain_stream(input, StreamTag::Stdout, Arc::clone(&combined)).await;
        assert_eq!(lines, vec!["one", "two", "three"]);

        let log = combined.lock().unwrap();
        assert_eq!(log.len(), 3);
        assert!(log.iter().all(|c| c.tag == StreamTag::Stdout));
    }

    #[tokio::test]
    async fn handles_missing_trailing_newline() {
        let input: &[u8] = b"only line";
        let combined: CombinedLog = Arc::default();
        let lines = drain_stream(input, StreamTag::Stderr, combined).await;
        assert_eq!(lines, vec!["only line"]);
    }

    #[tokio::test]
    async fn empty_stream_yields_no_lines() {
        let input: &[u8] = b"";
        let combined: CombinedLog = Arc::default();
        let lines = drain_stream(input, StreamTag::Stdout, Arc::clone(&combined)).await;
        assert!(lines.is_empty());
        assert!(combined.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_utf8_does_not_abort_the_drain() {
        let input: &[u8] = b"\xff\xfe garbage\nok-1\nok-2\n";
        let combined: CombinedLog = Arc::default();
        let lines = drain_stream(input, StreamTag::Stdout, Arc::clone(&combined)).await;

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains('\u{FFFD}'));
        assert_eq!(lines[1], "ok-1");
        assert_eq!(lines[2], "ok-2");
        assert_eq!(combined.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn strips_carriage_returns() {
        let input: &[u8] = b"dos\r\nunix\n";
        let combined: CombinedLog = Arc::default();
        let lines = drain_stream(input, StreamTag::Stderr, combined).await;
        assert_eq!(lines, vec!["dos", "unix"]);
    }

    #[tokio::test]
    async fn two_drainers_share_combined_log() {
        let combined: CombinedLog = Arc::default();
        let out = drain_stream(&b"o1\no2\n"[..], StreamTag::Stdout, Arc::clone(&combined));
        let err = drain_stream(&b"e1\n"[..], StreamTag::Stderr, Arc::clone(&combined));
        let (out_lines, err_lines) = tokio::join!(out, err);

        assert_eq!(out_lines, vec!["o1", "o2"]);
        assert_eq!(err_lines, vec!["e1"]);
        assert_eq!(combined.lock().unwrap().len(), 3);
    }
}
