// ABOUTME: Defines all error types for chunkflow using thiserror.
// ABOUTME: Each stage has its own error enum, unified under Error.

/// Top-level error type for chunkflow.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Concat error: {0}")]
    Concat(#[from] ConcatError),

    #[error("Pairing error: {0}")]
    Pairing(#[from] PairingError),

    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Violations of the vendor event protocol. Fatal for the current stream.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("unrecognized event type '{0}'")]
    UnrecognizedEvent(String),

    #[error("unrecognized output item in {0}")]
    UnrecognizedItem(&'static str),

    #[error("unrecognized content part in {0}")]
    UnrecognizedPart(&'static str),

    #[error("item {0} not found in processing queue")]
    ItemNotFound(String),

    #[error("no processing index {index} for item {item_id}")]
    NoProcessingIndex { item_id: String, index: usize },

    #[error("vendor error ({code}): {message}")]
    Vendor { code: String, message: String },
}

/// Errors raised while merging chunks into final blocks.
#[derive(Debug, thiserror::Error)]
pub enum ConcatError {
    #[error("cannot concat an empty chunk group")]
    EmptyGroup,

    #[error("cannot concat different block kinds: {first} and {other}")]
    MixedKinds {
        first: &'static str,
        other: &'static str,
    },

    #[error("cannot concat multiple {0}")]
    Multiple(&'static str),

    #[error("duplicate annotation index {0}")]
    DuplicateAnnotationIndex(usize),
}

/// Errors raised while re-pairing call/result items for replay.
#[derive(Debug, thiserror::Error)]
pub enum PairingError {
    #[error("{kind} item '{id}' should have exactly 2 items, but found {found}")]
    Cardinality {
        kind: &'static str,
        id: String,
        found: usize,
    },

    #[error("{0} item has no id to pair on")]
    MissingId(&'static str),

    #[error("unsupported server tool '{0}'")]
    UnsupportedServerTool(String),
}

/// Terminal errors delivered through a chunk stream.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("failed to convert event {kind}: {source}")]
    Convert {
        kind: &'static str,
        #[source]
        source: Box<Error>,
    },

    #[error("event source error: {0}")]
    Transport(#[source] anyhow::Error),

    #[error("panic in stream producer: {message}\n{backtrace}")]
    Panic { message: String, backtrace: String },
}

impl Error {
    /// True when the error is a protocol violation, directly or as the cause of a
    /// failed event conversion.
    pub fn is_protocol(&self) -> bool {
        match self {
            Error::Protocol(_) => true,
            Error::Stream(StreamError::Convert { source, .. }) => source.is_protocol(),
            _ => false,
        }
    }
}
