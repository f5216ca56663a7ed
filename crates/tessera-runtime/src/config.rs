use std::fs;
use std::path::Path;

use serde::Deserialize;
use tessera_lighting::LightingConfig;
use tessera_world::WorldGenConfig;

use crate::error::SessionError;

/// Viewport-driven load/unload settings.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct StreamingConfig {
    /// Tiles left and right of the view kept loaded.
    #[serde(default = "default_horizontal_radius")]
    pub horizontal_radius: i32,
    /// Tiles above and below the view kept loaded.
    #[serde(default = "default_vertical_radius")]
    pub vertical_radius: i32,
    #[serde(default = "default_scan_interval")]
    pub scan_interval_secs: f32,
    /// Generation threads. Zero generates on the calling thread.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Seeds the ore and sand coin flips per chunk. Entropy when absent.
    #[serde(default)]
    pub generation_seed: Option<u64>,
}

fn default_horizontal_radius() -> i32 {
    64
}
fn default_vertical_radius() -> i32 {
    48
}
fn default_scan_interval() -> f32 {
    0.5
}
fn default_workers() -> usize {
    2
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            horizontal_radius: default_horizontal_radius(),
            vertical_radius: default_vertical_radius(),
            scan_interval_secs: default_scan_interval(),
            workers: default_workers(),
            generation_seed: None,
        }
    }
}

impl StreamingConfig {
    pub fn validate(&self) -> Result<(), SessionError> {
        for (what, value) in [
            ("horizontal radius", self.horizontal_radius as f32),
            ("vertical radius", self.vertical_radius as f32),
            ("scan interval", self.scan_interval_secs),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(SessionError::NegativeStreaming { what, value });
            }
        }
        Ok(())
    }
}

/// Everything a session is built from. World tables sit at the top level
/// next to `[lighting]` and `[streaming]`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SessionConfig {
    #[serde(flatten)]
    pub worldgen: WorldGenConfig,
    #[serde(default)]
    pub lighting: LightingConfig,
    #[serde(default)]
    pub streaming: StreamingConfig,
}

impl SessionConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, SessionError> {
        Ok(toml::from_str(s)?)
    }
}

pub fn load_session_config_from_path(path: &Path) -> Result<SessionConfig, SessionError> {
    let s = fs::read_to_string(path)?;
    SessionConfig::from_toml_str(&s)
}
