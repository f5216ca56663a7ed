use std::collections::HashMap;

use serde::Deserialize;

use crate::types::TileType;

#[derive(Clone, Debug, Deserialize)]
pub struct CatalogConfig {
    /// Name of the block every buried tile starts as before the catalog is
    /// consulted.
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default)]
    pub blocks: Vec<BlockDef>,
    /// Extra break-drop substitutions layered over the built-in ones.
    #[serde(default)]
    pub drops: HashMap<TileType, TileType>,
    #[serde(default)]
    pub smelting: HashMap<TileType, TileType>,
}

fn default_background() -> String {
    "stone".to_string()
}

#[derive(Clone, Debug, Deserialize)]
pub struct BlockDef {
    pub name: String,
    pub tile: TileType,
    pub break_duration: Option<f32>,
    pub light_source: Option<bool>,
    /// `[min, max)` depth below the surface.
    pub depth: Option<[i32; 2]>,
    /// `[speed, level]` pairs; omitted or `[0, 0]` disables the gate.
    pub perlin: Option<[f32; 2]>,
    pub zone: Option<[f32; 2]>,
    pub map: Option<[f32; 2]>,
}
