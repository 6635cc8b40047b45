// ABOUTME: Input pairing engine - turns a finished message back into request input
// ABOUTME: items, merging tool call and tool result halves that share an id.

mod flatten;
mod merge;

pub use merge::{pair_for_reuse, pair_for_reuse_with, pair_items};
