//! Gameplay tile edits: placing and breaking blocks, and the light changes they cause.
#![forbid(unsafe_code)]

use tessera_blocks::{BlockCatalog, TileType};
use tessera_chunk::{ChunkMap, ChunkStore, Layer, Rgb};
use tessera_lighting::{LightEngine, LightKind, LightSource};
use tessera_world::{TilePos, WorldProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("no live chunk at ({}, {})", .0.x, .0.y)]
    NoChunk(TilePos),
    #[error("{0:?} cannot be broken")]
    Unbreakable(TileType),
    #[error("nothing to break at ({}, {})", .0.x, .0.y)]
    Empty(TilePos),
    #[error("cannot place air")]
    AirBlock,
    #[error("tile is already occupied by {0:?}")]
    Occupied(TileType),
    #[error("nothing to attach to at ({}, {})", .0.x, .0.y)]
    Unsupported(TilePos),
    #[error("{0:?} has no block catalog entry")]
    UnknownBlock(TileType),
}

/// Mutable view over everything an edit touches.
///
/// Tile writes go to both the live chunk and the chunk store so an edit
/// survives unloading.
pub struct WorldEdit<'a> {
    pub chunks: &'a mut ChunkMap,
    pub store: &'a mut ChunkStore,
    pub lights: &'a mut LightEngine,
    pub catalog: &'a BlockCatalog,
    pub profile: &'a WorldProfile,
}

impl WorldEdit<'_> {
    /// Writes a tile to the live chunk and its store entry.
    pub fn set_tile(&mut self, pos: TilePos, layer: Layer, tile: TileType) -> bool {
        let g = self.chunks.geometry();
        if !self.chunks.set_tile(pos, layer, tile) {
            return false;
        }
        let (x, y) = g.local(pos);
        if !self.store.set_tile(g.chunk_of(pos), layer, x, y, tile) {
            log::debug!("edit at ({}, {}) has no store entry", pos.x, pos.y);
        }
        true
    }

    fn require_chunk(&self, pos: TilePos) -> Result<(), EditError> {
        if self.chunks.geometry().contains_y(pos.y) && self.chunks.chunk_at(pos).is_some() {
            Ok(())
        } else {
            Err(EditError::NoChunk(pos))
        }
    }

    /// Breaks the tile on `layer` and returns the item it drops.
    ///
    /// Breaking a light-emitting tile takes its placed light with it. Any
    /// other break either opens the spot to ambient light, when the back
    /// layer is now empty near the surface, or brightens it by the
    /// difference between the two falloffs.
    pub fn break_block(&mut self, pos: TilePos, layer: Layer) -> Result<TileType, EditError> {
        self.require_chunk(pos)?;
        let tile = self.chunks.tile_type(pos, layer);
        if tile.is_air() {
            return Err(EditError::Empty(pos));
        }
        if tile == TileType::Bedrock {
            return Err(EditError::Unbreakable(tile));
        }
        self.set_tile(pos, layer, TileType::Air);

        if self.catalog.is_light_source(tile) {
            let g = self.chunks.geometry();
            let placed: Vec<_> = self
                .lights
                .registry()
                .all_at(g.globalize(pos))
                .iter()
                .copied()
                .filter(|&id| self.lights.registry().get(id).is_some_and(|s| s.kind == LightKind::Placed))
                .collect();
            for id in placed {
                self.lights.remove_light_source(self.chunks, id, true);
            }
        } else if self.chunks.tile_type(pos, Layer::Back).is_air()
            && pos.y >= self.profile.surface_height(pos.x) - self.profile.stone_depth()
        {
            if self.lights.light_at(self.chunks, pos).is_none() {
                let cfg = self.lights.config();
                let owner = self.chunks.geometry().chunk_of(pos);
                let source = LightSource::new(pos, cfg.ambient(), cfg.ambient_strength, LightKind::Ambient).owned_by(owner);
                self.lights.create_light_source(self.chunks, source, true);
            }
        } else if let Some(current) = self.chunks.tile_color(pos).filter(|c| !c.is_black()) {
            let step = self.lights.falloff() - self.lights.falloff_back();
            let brighter = Rgb::new(current.r + step, current.g + step, current.b + step).clamp01();
            self.chunks.set_tile_color(pos, brighter);
            // spread a one-off light, then forget it and keep what it lit
            let strength = self.lights.config().ambient_strength;
            let source = LightSource::new(pos, brighter, strength, LightKind::Ambient);
            let id = self.lights.create_light_source(self.chunks, source, true);
            self.lights.remove_light_source(self.chunks, id, false);
        }

        let drop = self.catalog.drop_for(tile);
        log::debug!("broke {:?} at ({}, {}), dropped {:?}", tile, pos.x, pos.y, drop);
        Ok(drop)
    }

    /// Places `tile` on `layer`. Light-emitting tiles always go on the front
    /// layer and get a placed light; anything else darkens its spot and
    /// exposes its empty neighbors to ambient light.
    pub fn place_block(&mut self, pos: TilePos, layer: Layer, tile: TileType) -> Result<(), EditError> {
        self.require_chunk(pos)?;
        if tile.is_air() {
            return Err(EditError::AirBlock);
        }
        if self.catalog.by_tile(tile).is_none() {
            return Err(EditError::UnknownBlock(tile));
        }
        let light = self.catalog.is_light_source(tile);
        let layer = if light { Layer::Front } else { layer };
        let existing = self.chunks.tile_type(pos, layer);
        if !existing.is_air() {
            return Err(EditError::Occupied(existing));
        }
        if !self.is_supported(pos, layer) {
            return Err(EditError::Unsupported(pos));
        }

        let g = self.chunks.geometry();
        if light {
            self.set_tile(pos, layer, tile);
            let color = self.lights.config().placed();
            let source = LightSource::new(pos, color, 1.0, LightKind::Placed).owned_by(g.chunk_of(pos));
            self.lights.create_light_source(self.chunks, source, true);
            return Ok(());
        }

        let previous = self.chunks.tile_color(pos).unwrap_or(Rgb::BLACK);
        self.chunks.set_tile_color(pos, Rgb::BLACK);
        self.set_tile(pos, layer, tile);

        let (ambient, strength) = {
            let cfg = self.lights.config();
            (cfg.ambient(), cfg.ambient_strength)
        };
        for n in pos.neighbors() {
            if !self.chunks.geometry().contains_y(n.y) || self.chunks.chunk_at(n).is_none() {
                continue;
            }
            if self.chunks.is_air_block(n) && self.lights.light_at(self.chunks, n).is_none() {
                let source = LightSource::new(n, ambient, strength, LightKind::Ambient).owned_by(g.chunk_of(n));
                self.lights.create_light_source(self.chunks, source, true);
            }
        }

        // darken around the new tile by removing a light carrying its old
        // color; an emitter already on this tile keeps its placed light
        let at = g.globalize(pos);
        let registry = self.lights.registry();
        let placed: Vec<_> = registry
            .all_at(at)
            .iter()
            .copied()
            .filter(|&id| registry.get(id).is_some_and(|s| s.kind == LightKind::Placed))
            .collect();
        let other = registry.all_at(at).iter().copied().find(|id| !placed.contains(id));
        let id = match other {
            Some(id) => id,
            None => {
                let source = LightSource::new(pos, previous, strength, LightKind::Ambient);
                self.lights.create_light_source(self.chunks, source, false)
            }
        };
        self.lights.remove_light_source(self.chunks, id, true);
        for id in placed {
            self.lights.update_light(self.chunks, id);
        }
        log::debug!("placed {:?} at ({}, {})", tile, pos.x, pos.y);
        Ok(())
    }

    /// Front tiles need a back tile behind them or any occupied neighbor.
    /// Back tiles need a front tile or a back-layer neighbor.
    pub fn is_supported(&self, pos: TilePos, layer: Layer) -> bool {
        match layer {
            Layer::Front => {
                !self.chunks.tile_type(pos, Layer::Back).is_air()
                    || pos.neighbors().into_iter().any(|n| !self.chunks.is_air_block(n))
            }
            Layer::Back => {
                !self.chunks.tile_type(pos, Layer::Front).is_air()
                    || pos.neighbors().into_iter().any(|n| !self.chunks.tile_type(n, Layer::Back).is_air())
            }
        }
    }
}
