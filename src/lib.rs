// ABOUTME: Root module for chunkflow - streaming response reconstruction and concatenation.
// ABOUTME: Re-exports the main entry points from submodules.

pub mod concat;
pub mod config;
pub mod emitter;
pub mod error;
pub mod index;
pub mod pairing;
pub mod prelude;
pub mod projector;
pub mod schema;
pub mod wire;

pub use config::StreamConfig;
pub use error::Error;
