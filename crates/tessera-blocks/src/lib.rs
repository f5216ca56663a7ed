//! Tile types, block definitions, and the ordered block catalog.
#![forbid(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod types;

pub use catalog::{BlockCatalog, BlockEntry, BlockId, EligibilityRule, NoiseGate};
pub use error::CatalogError;
pub use types::TileType;
