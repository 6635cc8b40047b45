// ABOUTME: Wire module - the vendor's streamed events, output items and response object.
// ABOUTME: Everything the engine consumes from, or hands back to, request/transport code.

mod event;
mod item;

pub use event::*;
pub use item::*;
