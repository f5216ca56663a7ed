use serde::Deserialize;

use tessera_chunk::Rgb;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct LightingConfig {
    /// Tiles of solid front layer light can pass before fading out.
    #[serde(default = "default_penetration")]
    pub penetration: f32,
    /// Same for tiles that only have a back layer.
    #[serde(default = "default_penetration_back")]
    pub penetration_back: f32,
    /// Brightness multiplier applied when presenting back-layer tiles.
    #[serde(default = "default_back_shadow_factor")]
    pub back_shadow_factor: f32,
    /// Dequeues per step of a smoothed light task.
    #[serde(default = "default_iteration_limit")]
    pub iteration_limit: usize,
    /// Extra margin a neighbor must fall short by before light spreads into it.
    #[serde(default)]
    pub pass_threshold: f32,
    #[serde(default = "default_ambient_color")]
    pub ambient_color: [f32; 3],
    #[serde(default = "default_ambient_strength")]
    pub ambient_strength: f32,
    #[serde(default = "default_placed_color")]
    pub placed_color: [f32; 3],
    /// When off, presentation shows every tile at full brightness. Colors
    /// are still tracked.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_penetration() -> f32 {
    4.0
}
fn default_penetration_back() -> f32 {
    8.0
}
fn default_back_shadow_factor() -> f32 {
    0.6
}
fn default_iteration_limit() -> usize {
    500
}
fn default_ambient_color() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}
fn default_ambient_strength() -> f32 {
    1.0
}
fn default_placed_color() -> [f32; 3] {
    [0.99, 0.99, 0.99]
}
fn default_enabled() -> bool {
    true
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            penetration: default_penetration(),
            penetration_back: default_penetration_back(),
            back_shadow_factor: default_back_shadow_factor(),
            iteration_limit: default_iteration_limit(),
            pass_threshold: 0.0,
            ambient_color: default_ambient_color(),
            ambient_strength: default_ambient_strength(),
            placed_color: default_placed_color(),
            enabled: default_enabled(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LightingConfigError {
    #[error("lighting {what} must be positive, got {value}")]
    NonPositive { what: &'static str, value: f32 },
    #[error("lighting iteration_limit must be at least 1")]
    ZeroIterationLimit,
    #[error("lighting {what} must lie in [0, 1], got {value}")]
    OutOfUnit { what: &'static str, value: f32 },
}

impl LightingConfig {
    pub fn validate(&self) -> Result<(), LightingConfigError> {
        for (what, value) in [("penetration", self.penetration), ("penetration_back", self.penetration_back)] {
            if value.is_nan() || value <= 0.0 {
                return Err(LightingConfigError::NonPositive { what, value });
            }
        }
        if self.iteration_limit == 0 {
            return Err(LightingConfigError::ZeroIterationLimit);
        }
        for (what, value) in [
            ("ambient_strength", self.ambient_strength),
            ("back_shadow_factor", self.back_shadow_factor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(LightingConfigError::OutOfUnit { what, value });
            }
        }
        if self.pass_threshold < 0.0 {
            return Err(LightingConfigError::OutOfUnit { what: "pass_threshold", value: self.pass_threshold });
        }
        Ok(())
    }

    #[inline]
    pub fn falloff(&self) -> f32 {
        1.0 / self.penetration
    }

    #[inline]
    pub fn falloff_back(&self) -> f32 {
        1.0 / self.penetration_back
    }

    #[inline]
    pub fn ambient(&self) -> Rgb {
        Rgb::from(self.ambient_color)
    }

    #[inline]
    pub fn placed(&self) -> Rgb {
        Rgb::from(self.placed_color)
    }
}
