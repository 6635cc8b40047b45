// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use chunkflow::prelude::*;` to get started quickly.

pub use crate::concat::{concat_block_chunks, concat_blocks, concat_chunks, concat_response_meta};
pub use crate::config::StreamConfig;
pub use crate::emitter::{
    ChunkResult, ChunkStream, EventSource, JsonSource, StreamSource, spawn_chunk_stream,
};
pub use crate::error::{ConcatError, Error, PairingError, ProtocolError, StreamError};
pub use crate::pairing::{pair_for_reuse, pair_for_reuse_with};
pub use crate::projector::{EventProjector, project_complete, project_complete_with};
pub use crate::schema::{
    BlockContent, BlockMeta, ContentBlock, ContentBlockChunk, ItemStatus, Message,
    ResponseMeta, Role, StreamChunk, TokenUsage,
};
pub use crate::wire::{OutputItem, ResponseObject, ResponseStreamEvent, decode_event};
