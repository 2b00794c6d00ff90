//! Data-stream translation for the chat endpoint.
//!
//! Model deltas are re-emitted in the line protocol the site's chat widget
//! consumes: one `0:<JSON string>` line per text delta, then a single
//! `d:{"finishReason":"stop"}` terminal line. A mid-stream upstream failure
//! cuts the body off without the terminal line, which the client surfaces
//! as an interrupted response instead of a silently truncated one.

use axum::body::Body;
use axum::response::Response;
use futures::{pin_mut, Stream, StreamExt};

use crate::core::Result;
use crate::services::StreamEvent;

const TERMINAL_LINE: &str = "d:{\"finishReason\":\"stop\"}\n";

/// Wrap a gateway event stream in a data-stream HTTP response.
pub fn data_stream_response<S>(upstream: S) -> Response
where
    S: Stream<Item = Result<StreamEvent>> + Send + 'static,
{
    Response::builder()
        .status(200)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Cache-Control", "no-cache")
        .header("X-Vercel-AI-Data-Stream", "v1")
        .body(Body::from_stream(translate(upstream)))
        .unwrap()
}

/// Translate gateway events into protocol lines.
///
/// The terminal line is emitted exactly once: on the explicit end-of-turn
/// event, or when the upstream stream ends cleanly without one. Upstream
/// errors become an `io::Error` item, which aborts the HTTP body.
fn translate<S>(upstream: S) -> impl Stream<Item = std::io::Result<Vec<u8>>> + Send + 'static
where
    S: Stream<Item = Result<StreamEvent>> + Send + 'static,
{
    async_stream::stream! {
        pin_mut!(upstream);
        let mut done = false;

        while let Some(event) = upstream.next().await {
            match event {
                Ok(StreamEvent::Delta(text)) => {
                    if !text.is_empty() {
                        yield Ok(delta_line(text));
                    }
                }
                Ok(StreamEvent::Done) => {
                    yield Ok(TERMINAL_LINE.as_bytes().to_vec());
                    done = true;
                    break;
                }
                Err(err) => {
                    tracing::error!("chat stream failed midway: {err}");
                    yield Err(std::io::Error::new(std::io::ErrorKind::Other, err.to_string()));
                    done = true;
                    break;
                }
            }
        }

        if !done {
            yield Ok(TERMINAL_LINE.as_bytes().to_vec());
        }
    }
}

/// One text delta as a protocol line; JSON string encoding handles quoting
/// and escaping of the chunk.
fn delta_line(text: String) -> Vec<u8> {
    format!("0:{}\n", serde_json::Value::String(text)).into_bytes()
}
