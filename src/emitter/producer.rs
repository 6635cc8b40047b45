// ABOUTME: Chunk emitter - runs the event projector in a producer task and hands
// ABOUTME: chunks to the consumer through a bounded channel.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Once;
use std::task::{Context, Poll};

use futures::{FutureExt, Stream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use super::EventSource;
use crate::concat::concat_chunks;
use crate::config::StreamConfig;
use crate::error::{Error, StreamError};
use crate::projector::EventProjector;
use crate::schema::{Message, StreamChunk};

/// One item delivered to the consumer. An `Err` is always the last item.
pub type ChunkResult = Result<StreamChunk, Error>;

/// Start projecting `source` on a new tokio task.
///
/// The producer reads events strictly in order and stays at most
/// `config.channel_capacity` chunks ahead of the consumer. Conversion failures,
/// transport failures and panics end the stream with one terminal error. The
/// source is closed whenever the producer stops, including when the consumer
/// goes away early.
pub fn spawn_chunk_stream<S>(source: S, config: StreamConfig) -> ChunkStream
where
    S: EventSource + 'static,
{
    let (tx, rx) = mpsc::channel(config.effective_capacity());
    let handle = tokio::spawn(produce(source, config, tx));
    ChunkStream {
        rx,
        handle: Some(handle),
    }
}

tokio::task_local! {
    /// Backtrace of a panic raised while the producer is being polled.
    static PANIC_BACKTRACE: RefCell<Option<String>>;
}

static PANIC_HOOK: Once = Once::new();

/// Chain a panic hook that records the backtrace at the panic site, but only for
/// panics raised inside a producer task. Other panics go straight to the
/// previous hook.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let _ = PANIC_BACKTRACE.try_with(|slot| {
                if let Ok(mut slot) = slot.try_borrow_mut() {
                    if slot.is_none() {
                        *slot = Some(Backtrace::force_capture().to_string());
                    }
                }
            });
            previous(info);
        }));
    });
}

async fn produce<S: EventSource>(mut source: S, config: StreamConfig, tx: mpsc::Sender<ChunkResult>) {
    install_panic_hook();
    let (outcome, captured) = PANIC_BACKTRACE
        .scope(RefCell::new(None), async {
            let outcome = AssertUnwindSafe(pump(&mut source, config, &tx))
                .catch_unwind()
                .await;
            let captured = PANIC_BACKTRACE.with(|slot| slot.borrow_mut().take());
            (outcome, captured)
        })
        .await;

    if let Err(payload) = outcome {
        let message = panic_message(payload.as_ref());
        // Falls back to the recovery site if the hook was replaced after install.
        let backtrace = captured.unwrap_or_else(|| Backtrace::force_capture().to_string());
        error!(%message, "recovered panic in stream producer");
        let _ = tx.send(Err(StreamError::Panic { message, backtrace }.into())).await;
    }

    if AssertUnwindSafe(source.close()).catch_unwind().await.is_err() {
        error!("event source panicked while closing");
    }
    debug!("stream producer stopped");
}

async fn pump<S: EventSource>(source: &mut S, config: StreamConfig, tx: &mpsc::Sender<ChunkResult>) {
    let mut projector = EventProjector::new(config);
    loop {
        let next = tokio::select! {
            biased;
            _ = tx.closed() => {
                debug!("consumer closed the stream");
                return;
            }
            next = source.next_event() => next,
        };

        let event = match next {
            Ok(Some(event)) => event,
            Ok(None) => {
                debug!(blocks = projector.allocated(), "event source exhausted");
                return;
            }
            Err(err) => {
                let _ = tx.send(Err(source_error(err))).await;
                return;
            }
        };

        let kind = event.kind();
        let chunks = match projector.project(&event) {
            Ok(chunks) => chunks,
            Err(err) => {
                debug!(kind, error = %err, "event conversion failed");
                let failure = StreamError::Convert {
                    kind,
                    source: Box::new(err),
                };
                let _ = tx.send(Err(failure.into())).await;
                return;
            }
        };

        for chunk in chunks {
            if tx.send(Ok(chunk)).await.is_err() {
                debug!(kind, "consumer closed the stream");
                return;
            }
        }
    }
}

/// Errors raised by this crate inside a source keep their identity; anything
/// else is a transport failure.
fn source_error(err: anyhow::Error) -> Error {
    match err.downcast::<Error>() {
        Ok(err) => err,
        Err(err) => StreamError::Transport(err).into(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Consumer side of a chunk stream.
///
/// Dropping it closes the channel; the producer notices, closes its event
/// source and exits.
pub struct ChunkStream {
    rx: mpsc::Receiver<ChunkResult>,
    handle: Option<JoinHandle<()>>,
}

impl ChunkStream {
    /// Receive the next chunk. `None` once the stream has ended.
    pub async fn recv(&mut self) -> Option<ChunkResult> {
        self.rx.recv().await
    }

    /// Stop consuming and wait for the producer to release its source.
    pub async fn cancel(self) {
        let ChunkStream { rx, handle } = self;
        drop(rx);
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                error!(error = %err, "stream producer task failed");
            }
        }
    }

    /// Drain every chunk, stopping at the first error.
    pub async fn collect_chunks(mut self) -> Result<Vec<StreamChunk>, Error> {
        let mut chunks = Vec::new();
        while let Some(item) = self.recv().await {
            chunks.push(item?);
        }
        Ok(chunks)
    }

    /// Drain the stream and assemble the final assistant message.
    pub async fn collect_message(self) -> Result<Message, Error> {
        let chunks = self.collect_chunks().await?;
        Ok(concat_chunks(&chunks)?)
    }
}

impl Stream for ChunkStream {
    type Item = ChunkResult;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
