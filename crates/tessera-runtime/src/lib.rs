//! Chunk streaming around a view, background generation workers, and the
//! session that owns a running world.
#![forbid(unsafe_code)]

mod config;
mod error;
mod session;
mod streamer;
mod workers;

#[cfg(test)]
mod tests;

pub use config::{SessionConfig, StreamingConfig, load_session_config_from_path};
pub use error::SessionError;
pub use session::WorldSession;
pub use streamer::{ChunkStreamer, LoadBounds, StreamCtx, StreamEvent};
pub use workers::{GenJob, GenOut, GenWorkers};
