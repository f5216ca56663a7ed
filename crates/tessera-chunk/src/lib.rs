//! Chunk grids, the persistent chunk store, live chunk index, and generation glue.
#![forbid(unsafe_code)]

mod chunk;
mod color;
mod generate;
mod map;
mod store;

pub use chunk::{Chunk, ChunkState, ChunkTiles, Layer, LightId, TileGrid};
pub use color::{Channel, Rgb};
pub use generate::WorldGenerator;
pub use map::{ChunkHandle, ChunkMap};
pub use store::{ChunkStore, StoredChunk};
