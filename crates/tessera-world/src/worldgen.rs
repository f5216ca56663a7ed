use serde::Deserialize;

use crate::coord::WorldGeometry;
use crate::error::ConfigError;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct WorldGenConfig {
    #[serde(default)]
    pub world: World,
    #[serde(default)]
    pub terrain: Terrain,
    #[serde(default)]
    pub trees: Trees,
    #[serde(default)]
    pub structure: Structure,
}

#[derive(Clone, Debug, Deserialize)]
pub struct World {
    #[serde(default = "default_width")]
    pub width: i32,
    #[serde(default = "default_height")]
    pub height: i32,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: i32,
    /// Random when absent.
    #[serde(default)]
    pub seed: Option<i64>,
    /// 0 grows trees; 1 and 2 are barren.
    #[serde(default)]
    pub world_type: u8,
}
fn default_width() -> i32 {
    1024
}
fn default_height() -> i32 {
    512
}
fn default_chunk_size() -> i32 {
    32
}
impl Default for World {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            chunk_size: default_chunk_size(),
            seed: None,
            world_type: 0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Terrain {
    /// Starting surface height as a fraction of world height.
    #[serde(default = "default_surface_ratio")]
    pub surface_ratio: f32,
    /// Noise value that leaves the running average unchanged.
    #[serde(default = "default_surface_bias")]
    pub surface_bias: f32,
    #[serde(default = "default_average_multiplier")]
    pub average_multiplier: f32,
    #[serde(default = "default_height_multiplier")]
    pub height_multiplier: f32,
    #[serde(default = "default_perlin_speed")]
    pub perlin_speed: f32,
    #[serde(default = "default_min_surface_ratio")]
    pub min_surface_ratio: f32,
    #[serde(default = "default_max_surface_ratio")]
    pub max_surface_ratio: f32,
    /// Rows below this absolute y are bedrock.
    #[serde(default = "default_bedrock_depth")]
    pub bedrock_depth: i32,
    /// Depth under the surface that still receives sky light when opened up.
    #[serde(default = "default_stone_depth")]
    pub stone_depth: i32,
    #[serde(default = "default_seam_columns")]
    pub seam_columns: i32,
}
fn default_surface_ratio() -> f32 {
    0.6
}
fn default_surface_bias() -> f32 {
    0.5
}
fn default_average_multiplier() -> f32 {
    8.0
}
fn default_height_multiplier() -> f32 {
    12.0
}
fn default_perlin_speed() -> f32 {
    0.05
}
fn default_min_surface_ratio() -> f32 {
    0.3
}
fn default_max_surface_ratio() -> f32 {
    0.85
}
fn default_bedrock_depth() -> i32 {
    64
}
fn default_stone_depth() -> i32 {
    12
}
fn default_seam_columns() -> i32 {
    10
}
impl Default for Terrain {
    fn default() -> Self {
        Self {
            surface_ratio: default_surface_ratio(),
            surface_bias: default_surface_bias(),
            average_multiplier: default_average_multiplier(),
            height_multiplier: default_height_multiplier(),
            perlin_speed: default_perlin_speed(),
            min_surface_ratio: default_min_surface_ratio(),
            max_surface_ratio: default_max_surface_ratio(),
            bedrock_depth: default_bedrock_depth(),
            stone_depth: default_stone_depth(),
            seam_columns: default_seam_columns(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Trees {
    #[serde(default = "default_tree_min")]
    pub min_height: i32,
    #[serde(default = "default_tree_max")]
    pub max_height: i32,
    /// Columns that must separate two trunks.
    #[serde(default = "default_tree_gap")]
    pub min_gap: i32,
    /// One tree per `chance` eligible columns on average.
    #[serde(default = "default_tree_chance")]
    pub chance: u32,
}
fn default_tree_min() -> i32 {
    8
}
fn default_tree_max() -> i32 {
    11
}
fn default_tree_gap() -> i32 {
    2
}
fn default_tree_chance() -> u32 {
    10
}
impl Default for Trees {
    fn default() -> Self {
        Self {
            min_height: default_tree_min(),
            max_height: default_tree_max(),
            min_gap: default_tree_gap(),
            chance: default_tree_chance(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Structure {
    #[serde(default = "default_structure_enabled")]
    pub enabled: bool,
    /// Tree-free margin around the footprint.
    #[serde(default = "default_structure_clearance")]
    pub clearance: i32,
}
fn default_structure_enabled() -> bool {
    true
}
fn default_structure_clearance() -> i32 {
    5
}
impl Default for Structure {
    fn default() -> Self {
        Self { enabled: default_structure_enabled(), clearance: default_structure_clearance() }
    }
}

/// Validated, flattened view of [`WorldGenConfig`].
#[derive(Clone, Debug)]
pub struct WorldGenParams {
    pub geometry: WorldGeometry,
    pub seed: i64,
    pub trees_enabled: bool,
    pub surface_ratio: f32,
    pub surface_bias: f32,
    pub average_multiplier: f32,
    pub height_multiplier: f32,
    pub perlin_speed: f32,
    pub min_surface: i32,
    pub max_surface: i32,
    pub bedrock_depth: i32,
    pub stone_depth: i32,
    pub seam_columns: i32,
    pub tree_min: i32,
    pub tree_max: i32,
    pub tree_gap: i32,
    pub tree_chance: u32,
    pub structure_enabled: bool,
    pub structure_clearance: i32,
}

impl WorldGenParams {
    /// Validates the config. A missing seed is drawn from entropy.
    pub fn from_config(cfg: &WorldGenConfig, structure_width: i32) -> Result<Self, ConfigError> {
        let w = &cfg.world;
        for (what, value) in [("width", w.width), ("height", w.height), ("chunk size", w.chunk_size)] {
            if value <= 0 {
                return Err(ConfigError::NonPositive { what, value });
            }
        }
        for (what, value) in [("width", w.width), ("height", w.height)] {
            if value % w.chunk_size != 0 {
                return Err(ConfigError::NotChunkAligned { what, value, chunk_size: w.chunk_size });
            }
        }
        let t = &cfg.terrain;
        if t.seam_columns < 0 || w.width < t.seam_columns + 2 {
            return Err(ConfigError::TooNarrow(w.width));
        }
        if cfg.structure.enabled && w.chunk_size < structure_width {
            return Err(ConfigError::StructureTooWide { chunk_size: w.chunk_size, width: structure_width });
        }
        let tr = &cfg.trees;
        if tr.min_height <= 0 || tr.max_height < tr.min_height || tr.min_gap < 0 {
            return Err(ConfigError::TreeHeights { min: tr.min_height, max: tr.max_height });
        }
        let ordered = 0.0 <= t.min_surface_ratio
            && t.min_surface_ratio <= t.surface_ratio
            && t.surface_ratio <= t.max_surface_ratio
            && t.max_surface_ratio <= 1.0;
        if !ordered {
            return Err(ConfigError::SurfaceRatios);
        }
        let h = w.height as f32;
        Ok(Self {
            geometry: WorldGeometry::new(w.width, w.height, w.chunk_size),
            seed: w.seed.unwrap_or_else(|| i64::from(rand::random::<u32>())),
            trees_enabled: w.world_type != 1 && w.world_type != 2,
            surface_ratio: t.surface_ratio,
            surface_bias: t.surface_bias,
            average_multiplier: t.average_multiplier,
            height_multiplier: t.height_multiplier,
            perlin_speed: t.perlin_speed,
            min_surface: (h * t.min_surface_ratio) as i32,
            max_surface: ((h * t.max_surface_ratio) as i32).min(w.height - 1),
            bedrock_depth: t.bedrock_depth,
            stone_depth: t.stone_depth,
            seam_columns: t.seam_columns,
            tree_min: tr.min_height,
            tree_max: tr.max_height,
            tree_gap: tr.min_gap,
            tree_chance: tr.chance.max(1),
            structure_enabled: cfg.structure.enabled,
            structure_clearance: cfg.structure.clearance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(width: i32, height: i32, chunk: i32) -> WorldGenConfig {
        let mut c = WorldGenConfig::default();
        c.world.width = width;
        c.world.height = height;
        c.world.chunk_size = chunk;
        c.world.seed = Some(1);
        c
    }

    #[test]
    fn defaults_validate() {
        let p = WorldGenParams::from_config(&cfg(256, 512, 32), 29).unwrap();
        assert_eq!(p.geometry.chunks_x(), 8);
        assert_eq!(p.seed, 1);
        assert!(p.trees_enabled);
    }

    #[test]
    fn rejects_bad_dimensions() {
        assert!(matches!(
            WorldGenParams::from_config(&cfg(0, 512, 32), 29),
            Err(ConfigError::NonPositive { what: "width", .. })
        ));
        assert!(matches!(
            WorldGenParams::from_config(&cfg(250, 512, 32), 29),
            Err(ConfigError::NotChunkAligned { what: "width", .. })
        ));
        assert!(matches!(
            WorldGenParams::from_config(&cfg(256, 512, 0), 29),
            Err(ConfigError::NonPositive { .. })
        ));
        assert!(matches!(
            WorldGenParams::from_config(&cfg(256, 512, 16), 29),
            Err(ConfigError::StructureTooWide { .. })
        ));
    }

    #[test]
    fn barren_world_types() {
        let mut c = cfg(256, 512, 32);
        c.world.world_type = 2;
        assert!(!WorldGenParams::from_config(&c, 29).unwrap().trees_enabled);
    }

    #[test]
    fn parses_partial_toml() {
        let c: WorldGenConfig = toml::from_str(
            r#"
            [world]
            width = 512
            seed = 9
            [trees]
            chance = 4
            "#,
        )
        .unwrap();
        assert_eq!(c.world.width, 512);
        assert_eq!(c.world.height, 512);
        assert_eq!(c.trees.chance, 4);
        assert_eq!(c.terrain.bedrock_depth, 64);
    }
}
