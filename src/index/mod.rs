// ABOUTME: Index module - the mutable bookkeeping owned by one stream: block index
// ABOUTME: registries, the item state cache and the pending block set.

mod cache;
mod pending;
mod registry;

pub use cache::*;
pub use pending::*;
pub use registry::*;
