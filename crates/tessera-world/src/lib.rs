//! World sizing, noise sampling, the base terrain pass, and per-chunk fill.
#![forbid(unsafe_code)]

pub mod coord;
pub mod error;
pub mod fill;
pub mod noise;
pub mod profile;
pub mod worldgen;

pub use coord::{ChunkCoord, TilePos, WorldGeometry};
pub use error::ConfigError;
pub use fill::{ChunkFill, FillContext, Palette};
pub use noise::NoiseField;
pub use profile::WorldProfile;
pub use worldgen::{WorldGenConfig, WorldGenParams};
