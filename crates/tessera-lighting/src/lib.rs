//! Per-tile RGB light: additive-max flood fill, two-phase removal, and
//! ambient source derivation across chunk seams.
#![forbid(unsafe_code)]

mod ambient;
mod config;
mod engine;
mod registry;
mod task;

pub use ambient::{ambient_positions, structure_light_slots};
pub use config::{LightingConfig, LightingConfigError};
pub use engine::{LightEngine, LightNode};
pub use registry::{LightKind, LightRegistry, LightSource};
pub use task::LightTask;
