// ABOUTME: Projector module - turns vendor events (or a complete response) into
// ABOUTME: normalized content block chunks (or a complete message).

mod complete;
mod items;
mod stream;

pub use complete::*;
pub use stream::*;

#[cfg(test)]
mod projector_test;
