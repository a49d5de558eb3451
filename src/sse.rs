//! Server-Sent Events (SSE) frame decoding for analysis streams.
//!
//! The analysis endpoint answers with newline-delimited SSE frames over a
//! chunked response body:
//!
//! ```text
//! event: chunk
//! data: The NULL ratio of column "email" is
//!
//! event: progress
//! data: {"node_id": "n1", "status": "succeeded"}
//!
//! data: [DONE]
//! ```
//!
//! Transport chunks carry arbitrary byte ranges, so a line may span several
//! chunks or several lines may arrive in one. The decoder accumulates bytes
//! until a newline completes a line, classifies the line, and yields one
//! typed [`StreamMessage`] per non-empty `data:` payload. A payload of
//! `[DONE]` ends the session; anything still buffered after it is discarded.

use futures::stream::{self, Stream, StreamExt};

use crate::client::ClientError;
use crate::model::{StreamMessage, WorkflowNode};

/// Terminal sentinel payload distinct from transport end-of-stream.
const DONE_MARKER: &str = "[DONE]";

/// Event label assumed when a `data:` line arrives with no preceding
/// `event:` line in the current event block.
const DEFAULT_EVENT: &str = "data";

/// One classified line of an SSE stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseLine {
    /// Blank (post-trim) line; terminates the current event block
    Empty,
    /// `event: <label>` line, trimmed label
    Event(String),
    /// `data: <payload>` line, trimmed payload
    Data(String),
    /// Comment or any other shape; tolerated and skipped
    Ignored,
}

/// Classify a single line of SSE text.
pub fn parse_sse_line(line: &str) -> SseLine {
    if line.trim().is_empty() {
        return SseLine::Empty;
    }

    if let Some(rest) = line.strip_prefix("event:") {
        return SseLine::Event(rest.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("data:") {
        return SseLine::Data(rest.trim().to_string());
    }

    SseLine::Ignored
}

/// Check if a data payload is the stream-termination sentinel.
pub fn is_done_marker(data: &str) -> bool {
    data == DONE_MARKER
}

/// Convert a data payload into a typed message under the given event label.
///
/// `progress` payloads get a structured parse attempt; a payload that is not
/// a valid node record degrades to raw text rather than failing the stream.
/// The parse targets the node-record shape specifically, so a `progress`
/// payload holding some other valid JSON (a bare number, a string) also
/// comes through as raw text with no node data.
pub fn decode_data(event: &str, data: &str) -> StreamMessage {
    match event {
        "status" | "connected" | "started" | "finished" | "complete" => StreamMessage::Status {
            event: event.to_string(),
            content: data.to_string(),
        },
        "progress" => {
            let node = match serde_json::from_str::<WorkflowNode>(data) {
                Ok(node) => Some(node),
                Err(err) => {
                    tracing::warn!(%err, payload = data, "unparseable progress payload, keeping raw text");
                    None
                }
            };
            StreamMessage::Progress {
                event: event.to_string(),
                content: data.to_string(),
                node,
            }
        }
        "chunk" => StreamMessage::Content {
            event: event.to_string(),
            content: data.to_string(),
        },
        "error" => StreamMessage::Error {
            event: event.to_string(),
            error: data.to_string(),
        },
        _ => StreamMessage::Content {
            event: if event.is_empty() {
                DEFAULT_EVENT.to_string()
            } else {
                event.to_string()
            },
            content: data.to_string(),
        },
    }
}

/// Decode a fallible byte-chunk stream into a stream of typed messages.
///
/// The returned stream ends when the `[DONE]` sentinel is seen or the input
/// is exhausted; a transport error is yielded once and then the stream ends.
/// A trailing line with no terminating newline is discarded on every exit
/// path. Messages come out in the exact order their lines appeared.
///
/// The buffer holds raw bytes and is split on `b'\n'` (never part of a
/// multi-byte UTF-8 sequence), so only complete lines are decoded to text
/// and a character split across chunk boundaries survives intact.
pub fn decode_stream<S, B, E>(
    bytes: S,
) -> impl Stream<Item = Result<StreamMessage, ClientError>> + Send
where
    S: Stream<Item = Result<B, E>> + Send,
    B: AsRef<[u8]> + Send,
    E: Into<ClientError> + Send,
{
    stream::unfold(
        (Box::pin(bytes), Vec::new(), String::new(), false),
        |(mut byte_stream, mut buffer, mut event, mut stream_ended): (
            _,
            Vec<u8>,
            String,
            bool,
        )| async move {
            loop {
                // Drain complete lines before reading more bytes
                while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                    let line_bytes: Vec<u8> = buffer.drain(..=pos).collect();
                    let line = String::from_utf8_lossy(&line_bytes[..pos]);

                    match parse_sse_line(&line) {
                        SseLine::Empty => event.clear(),
                        SseLine::Event(label) => event = label,
                        SseLine::Data(data) => {
                            if is_done_marker(&data) {
                                // Terminal sentinel: stop reading, drop the rest
                                tracing::debug!("analysis stream signalled [DONE]");
                                return None;
                            }

                            let message = decode_data(&event, &data);
                            return Some((Ok(message), (byte_stream, buffer, event, stream_ended)));
                        }
                        SseLine::Ignored => {}
                    }
                }

                if stream_ended {
                    // Natural end of stream; an unterminated fragment is dropped
                    return None;
                }

                match byte_stream.next().await {
                    Some(Ok(chunk)) => {
                        buffer.extend_from_slice(chunk.as_ref());
                    }
                    Some(Err(e)) => {
                        // Yield once, then terminate on the next poll
                        return Some((Err(e.into()), (byte_stream, Vec::new(), event, true)));
                    }
                    None => {
                        stream_ended = true;
                    }
                }
            }
        },
    )
}

/// Extension trait for `reqwest::Response` to enable SSE message decoding.
pub trait SseResponseExt {
    /// Convert the response body into a stream of decoded analysis messages.
    ///
    /// See [`decode_stream`] for the framing and termination rules.
    fn analysis_messages(self) -> impl Stream<Item = Result<StreamMessage, ClientError>> + Send;
}

impl SseResponseExt for reqwest::Response {
    fn analysis_messages(self) -> impl Stream<Item = Result<StreamMessage, ClientError>> + Send {
        decode_stream(self.bytes_stream())
    }
}
