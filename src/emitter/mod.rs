// ABOUTME: Chunk emitter module - producer task, consumer handle and the event
// ABOUTME: source abstraction it reads from.

mod producer;
mod source;
mod sse;

pub use producer::*;
pub use source::*;
pub use sse::*;
