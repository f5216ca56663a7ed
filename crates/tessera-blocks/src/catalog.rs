use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::config::{BlockDef, CatalogConfig};
use crate::error::CatalogError;
use crate::types::TileType;

pub type BlockId = u16;

const DEFAULT_CATALOG: &str = include_str!("../catalog.toml");
const DEFAULT_BREAK_DURATION: f32 = 0.25;

/// A `(speed, level)` noise threshold. The all-zero pair means "no gate".
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NoiseGate {
    pub speed: f32,
    pub level: f32,
}

impl NoiseGate {
    pub const DISABLED: NoiseGate = NoiseGate { speed: 0.0, level: 0.0 };

    #[inline]
    pub fn is_disabled(&self) -> bool {
        self.speed == 0.0 && self.level == 0.0
    }

    fn from_pair(p: Option<[f32; 2]>) -> Self {
        p.map(|[speed, level]| NoiseGate { speed, level }).unwrap_or(Self::DISABLED)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EligibilityRule {
    /// `None` when either bound is unset; otherwise depth must satisfy
    /// `min <= depth < max`.
    pub depth: Option<(i32, i32)>,
    pub perlin: NoiseGate,
    pub zone: NoiseGate,
    pub map: NoiseGate,
}

impl EligibilityRule {
    pub const NEVER: EligibilityRule = EligibilityRule {
        depth: None,
        perlin: NoiseGate::DISABLED,
        zone: NoiseGate::DISABLED,
        map: NoiseGate::DISABLED,
    };

    /// Blocks with no primary gate never generate on their own.
    #[inline]
    pub fn spawns(&self) -> bool {
        !self.perlin.is_disabled()
    }
}

#[derive(Clone, Debug)]
pub struct BlockEntry {
    pub id: BlockId,
    pub name: String,
    pub tile: TileType,
    pub break_duration: f32,
    pub light_source: bool,
    pub rule: EligibilityRule,
}

/// Ordered block definitions. Order decides which block wins when several
/// are eligible, so it must stay stable across a save and its reload.
#[derive(Clone, Debug)]
pub struct BlockCatalog {
    pub entries: Vec<BlockEntry>,
    by_name: HashMap<String, BlockId>,
    by_tile: HashMap<TileType, BlockId>,
    background: BlockId,
    drops: HashMap<TileType, TileType>,
    smelting: HashMap<TileType, TileType>,
}

impl BlockCatalog {
    pub fn from_config(cfg: CatalogConfig) -> Result<Self, CatalogError> {
        let mut entries = Vec::with_capacity(cfg.blocks.len());
        let mut by_name = HashMap::new();
        let mut by_tile = HashMap::new();
        for (i, def) in cfg.blocks.into_iter().enumerate() {
            let id = i as BlockId;
            let entry = compile_entry(id, def)?;
            if by_name.insert(entry.name.clone(), id).is_some() {
                return Err(CatalogError::DuplicateName(entry.name));
            }
            // First definition of a tile type is the canonical one.
            by_tile.entry(entry.tile).or_insert(id);
            entries.push(entry);
        }
        let background = *by_name
            .get(&cfg.background)
            .ok_or_else(|| CatalogError::MissingBackground(cfg.background.clone()))?;
        Ok(Self { entries, by_name, by_tile, background, drops: cfg.drops, smelting: cfg.smelting })
    }

    pub fn from_toml_str(s: &str) -> Result<Self, CatalogError> {
        let cfg: CatalogConfig = toml::from_str(s)?;
        Self::from_config(cfg)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, CatalogError> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    /// The catalog shipped with the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_toml_str(DEFAULT_CATALOG)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn get(&self, id: BlockId) -> Option<&BlockEntry> {
        self.entries.get(id as usize)
    }

    pub fn id_by_name(&self, name: &str) -> Option<BlockId> {
        self.by_name.get(name).copied()
    }

    pub fn by_tile(&self, tile: TileType) -> Option<&BlockEntry> {
        self.by_tile.get(&tile).and_then(|&id| self.get(id))
    }

    /// Like [`by_tile`](Self::by_tile) but a missing tile is a configuration error.
    pub fn require(&self, tile: TileType) -> Result<&BlockEntry, CatalogError> {
        self.by_tile(tile).ok_or(CatalogError::MissingTile(tile))
    }

    #[inline]
    pub fn background(&self) -> &BlockEntry {
        &self.entries[self.background as usize]
    }

    pub fn is_light_source(&self, tile: TileType) -> bool {
        self.by_tile(tile).is_some_and(|e| e.light_source)
    }

    pub fn break_duration(&self, tile: TileType) -> f32 {
        self.by_tile(tile).map(|e| e.break_duration).unwrap_or(DEFAULT_BREAK_DURATION)
    }

    /// Item produced by breaking `tile`.
    pub fn drop_for(&self, tile: TileType) -> TileType {
        self.drops.get(&tile).copied().unwrap_or_else(|| tile.drop())
    }

    pub fn smelt(&self, tile: TileType) -> Option<TileType> {
        self.smelting.get(&tile).copied().or_else(|| tile.smelted())
    }
}

fn compile_entry(id: BlockId, def: BlockDef) -> Result<BlockEntry, CatalogError> {
    let depth = match def.depth {
        Some([min, max]) if min == -1 || max == -1 => None,
        Some([min, max]) if max <= min => {
            return Err(CatalogError::BadDepth { name: def.name, min, max });
        }
        Some([min, max]) => Some((min, max)),
        None => None,
    };
    Ok(BlockEntry {
        id,
        tile: def.tile,
        break_duration: def.break_duration.unwrap_or(DEFAULT_BREAK_DURATION),
        light_source: def.light_source.unwrap_or(false),
        rule: EligibilityRule {
            depth,
            perlin: NoiseGate::from_pair(def.perlin),
            zone: NoiseGate::from_pair(def.zone),
            map: NoiseGate::from_pair(def.map),
        },
        name: def.name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_parses() {
        let cat = BlockCatalog::builtin().unwrap();
        assert_eq!(cat.get(0).unwrap().tile, TileType::Air);
        assert_eq!(cat.background().tile, TileType::Stone);
        for t in [TileType::Stone, TileType::Bedrock, TileType::Sand, TileType::DirtGrass, TileType::Log, TileType::Leaf] {
            assert!(cat.require(t).is_ok(), "missing {t:?}");
        }
        assert!(cat.is_light_source(TileType::Torch));
        assert!(!cat.is_light_source(TileType::Stone));
    }

    #[test]
    fn zero_pairs_disable_gates() {
        let cat = BlockCatalog::from_toml_str(
            r#"
            background = "stone"
            [[blocks]]
            name = "stone"
            tile = "stone"
            [[blocks]]
            name = "coal"
            tile = "coal_ore"
            depth = [4, 40]
            perlin = [0.1, 0.6]
            zone = [0.0, 0.0]
            "#,
        )
        .unwrap();
        let stone = cat.by_tile(TileType::Stone).unwrap();
        assert!(!stone.rule.spawns());
        assert_eq!(stone.break_duration, 0.25);
        let coal = cat.by_tile(TileType::CoalOre).unwrap();
        assert!(coal.rule.spawns());
        assert!(coal.rule.zone.is_disabled());
        assert_eq!(coal.rule.depth, Some((4, 40)));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = BlockCatalog::from_toml_str(
            r#"
            [[blocks]]
            name = "stone"
            tile = "stone"
            [[blocks]]
            name = "stone"
            tile = "dirt"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateName(n) if n == "stone"));
    }

    #[test]
    fn missing_background_is_rejected() {
        let err = BlockCatalog::from_toml_str(
            r#"
            background = "granite"
            [[blocks]]
            name = "stone"
            tile = "stone"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::MissingBackground(_)));
    }

    #[test]
    fn drop_overrides_layer_over_builtin() {
        let cat = BlockCatalog::from_toml_str(
            r#"
            [[blocks]]
            name = "stone"
            tile = "stone"
            [drops]
            stone = "sand"
            "#,
        )
        .unwrap();
        assert_eq!(cat.drop_for(TileType::Stone), TileType::Sand);
        assert_eq!(cat.drop_for(TileType::DirtGrass), TileType::Dirt);
    }
}
