// ABOUTME: Schema module - the normalized, vendor-agnostic conversation model.
// ABOUTME: Content blocks, chunks, messages and response metadata.

mod block;
mod message;

pub use block::*;
pub use message::*;
