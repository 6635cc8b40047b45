// ABOUTME: Concatenation engine - folds streamed chunks back into final blocks,
// ABOUTME: response metadata and whole messages.

mod block;
mod meta;

pub use block::{concat_block_chunks, concat_blocks};
pub use meta::{concat_chunks, concat_response_meta};
