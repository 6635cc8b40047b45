// ABOUTME: Event source abstraction for the chunk emitter, with adapters over
// ABOUTME: a stream of decoded events and a stream of raw JSON payloads.

use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt};

use super::{SsePayloads, sse_payloads};
use crate::wire::{ResponseStreamEvent, decode_event};

/// A pull-based source of vendor stream events.
///
/// `Ok(None)` is end of stream. `close` releases whatever the source holds
/// (connection, reader) and is called exactly once when the producer stops.
#[async_trait]
pub trait EventSource: Send {
    /// Next event, `None` at end of stream.
    async fn next_event(&mut self) -> anyhow::Result<Option<ResponseStreamEvent>>;

    /// Release the source. Later calls to `next_event` return `Ok(None)`.
    async fn close(&mut self);
}

/// Event source over any stream of decoded events.
pub struct StreamSource<S> {
    inner: Option<S>,
}

impl<S> StreamSource<S> {
    pub fn new(stream: S) -> Self {
        Self {
            inner: Some(stream),
        }
    }

    /// True once the source has been closed.
    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }
}

/// Stream of already-decoded events, used as a fixture source.
pub type EventIter = stream::Iter<std::vec::IntoIter<anyhow::Result<ResponseStreamEvent>>>;

impl StreamSource<EventIter> {
    /// Source that yields `events` in order, then ends.
    pub fn from_events(events: Vec<ResponseStreamEvent>) -> Self {
        let items: Vec<anyhow::Result<ResponseStreamEvent>> = events.into_iter().map(Ok).collect();
        Self::new(stream::iter(items))
    }
}

#[async_trait]
impl<S> EventSource for StreamSource<S>
where
    S: Stream<Item = anyhow::Result<ResponseStreamEvent>> + Send + Unpin,
{
    async fn next_event(&mut self) -> anyhow::Result<Option<ResponseStreamEvent>> {
        match self.inner.as_mut() {
            Some(stream) => stream.next().await.transpose(),
            None => Ok(None),
        }
    }

    async fn close(&mut self) {
        self.inner = None;
    }
}

/// Event source over raw JSON event payloads, such as the `data` lines of an
/// SSE response. Payloads that fail to decode surface as crate errors wrapped in
/// `anyhow`, so the emitter can report them as protocol failures.
pub struct JsonSource<S> {
    inner: Option<S>,
}

impl<S> JsonSource<S> {
    pub fn new(payloads: S) -> Self {
        Self {
            inner: Some(payloads),
        }
    }
}

impl JsonSource<SsePayloads> {
    /// Source over a raw server-sent-events byte stream.
    pub fn from_sse<S, B>(bytes: S) -> Self
    where
        S: Stream<Item = anyhow::Result<B>> + Send + 'static,
        B: AsRef<[u8]> + Send + 'static,
    {
        Self::new(sse_payloads(bytes))
    }
}

#[async_trait]
impl<S> EventSource for JsonSource<S>
where
    S: Stream<Item = anyhow::Result<String>> + Send + Unpin,
{
    async fn next_event(&mut self) -> anyhow::Result<Option<ResponseStreamEvent>> {
        let Some(payloads) = self.inner.as_mut() else {
            return Ok(None);
        };
        match payloads.next().await {
            Some(payload) => Ok(Some(decode_event(&payload?)?)),
            None => Ok(None),
        }
    }

    async fn close(&mut self) {
        self.inner = None;
    }
}
