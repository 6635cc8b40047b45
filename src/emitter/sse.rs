// ABOUTME: Server-sent-events framing - splits a raw byte stream into the JSON
// ABOUTME: payloads of its `data:` fields, one payload per event.

use std::pin::Pin;

use futures::{Stream, StreamExt};

/// Stream of SSE event payloads.
pub type SsePayloads = Pin<Box<dyn Stream<Item = anyhow::Result<String>> + Send + 'static>>;

const DONE_SENTINEL: &str = "[DONE]";

/// Frame a byte stream as server-sent events and yield each event's data.
///
/// Multi-line data fields are joined with `\n`. Comments, other fields and the
/// `[DONE]` sentinel are skipped. Byte chunks may split lines (and UTF-8
/// sequences) anywhere.
pub fn sse_payloads<S, B>(bytes: S) -> SsePayloads
where
    S: Stream<Item = anyhow::Result<B>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    Box::pin(async_stream::try_stream! {
        let mut bytes = Box::pin(bytes);
        let mut buffer: Vec<u8> = Vec::new();
        let mut data = String::new();

        while let Some(chunk) = bytes.next().await {
            buffer.extend_from_slice(chunk?.as_ref());

            while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
                let raw: Vec<u8> = buffer.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&raw);
                let line = line.trim_end_matches(['\n', '\r']);

                if line.is_empty() {
                    let payload = std::mem::take(&mut data);
                    if !payload.is_empty() && payload != DONE_SENTINEL {
                        yield payload;
                    }
                    continue;
                }
                if let Some(value) = line.strip_prefix("data:") {
                    if !data.is_empty() {
                        data.push('\n');
                    }
                    data.push_str(value.strip_prefix(' ').unwrap_or(value));
                }
            }
        }

        // A final event without a trailing blank line.
        let tail = String::from_utf8_lossy(&buffer).into_owned();
        if let Some(value) = tail.trim_end_matches('\r').strip_prefix("data:") {
            if !data.is_empty() {
                data.push('\n');
            }
            data.push_str(value.strip_prefix(' ').unwrap_or(value));
        }
        if !data.is_empty() && data != DONE_SENTINEL {
            yield data;
        }
    })
}
