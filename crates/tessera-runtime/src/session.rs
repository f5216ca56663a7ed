use std::path::Path;
use std::sync::Arc;

use tessera_blocks::{BlockCatalog, TileType};
use tessera_chunk::{Chunk, ChunkMap, ChunkStore, Layer, Rgb, WorldGenerator};
use tessera_edit::{EditError, WorldEdit};
use tessera_lighting::{LightEngine, LightingConfig};
use tessera_structures::StructurePlan;
use tessera_world::{ChunkCoord, TilePos, WorldGenParams, WorldGeometry, WorldProfile};

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::streamer::{ChunkStreamer, StreamCtx, StreamEvent};
use crate::workers::GenWorkers;

/// One running world: generation inputs, live chunks, the chunk store,
/// lighting, and the streamer that ties them to a view position.
pub struct WorldSession {
    config: SessionConfig,
    generator: WorldGenerator,
    chunks: ChunkMap,
    store: ChunkStore,
    lights: LightEngine,
    streamer: ChunkStreamer,
    view: TilePos,
}

impl WorldSession {
    /// Fresh world from config. A missing seed is drawn from entropy.
    pub fn new(config: SessionConfig, catalog: BlockCatalog) -> Result<Self, SessionError> {
        Self::build(config, catalog, None)
    }

    /// Continues a saved world from `dir`, or starts fresh when there is no
    /// readable save there.
    pub fn from_save(mut config: SessionConfig, catalog: BlockCatalog, dir: &Path) -> Result<Self, SessionError> {
        let chunk_size = config.worldgen.world.chunk_size.max(1) as usize;
        match tessera_io::try_load_world(dir, chunk_size) {
            Some(save) => {
                config.worldgen.world.seed = Some(save.seed);
                Self::build(config, catalog, Some(save.store))
            }
            None => {
                log::info!("starting a fresh world; nothing to load from {}", dir.display());
                Self::build(config, catalog, None)
            }
        }
    }

    fn build(config: SessionConfig, catalog: BlockCatalog, store: Option<ChunkStore>) -> Result<Self, SessionError> {
        config.lighting.validate()?;
        config.streaming.validate()?;
        let plan = StructurePlan::spaceship();
        let params = WorldGenParams::from_config(&config.worldgen, plan.width() as i32)?;
        let profile = Arc::new(WorldProfile::generate(params, &plan));
        let generator = WorldGenerator::new(profile, Arc::new(catalog), plan)?;
        let g = generator.profile.geometry();
        let workers = GenWorkers::new(generator.clone(), config.streaming.workers)?;
        let store = store.unwrap_or_else(|| ChunkStore::new(g.chunk_size as usize));
        log::info!(
            "world session: {}x{} tiles, chunk {}, seed {}, {} stored chunks",
            g.width,
            g.height,
            g.chunk_size,
            generator.profile.seed(),
            store.len()
        );
        Ok(Self {
            chunks: ChunkMap::new(g),
            store,
            lights: LightEngine::new(config.lighting.clone()),
            streamer: ChunkStreamer::new(config.streaming.clone(), workers),
            view: TilePos::new(g.width / 2, g.height / 2),
            generator,
            config,
        })
    }

    pub fn save(&self, dir: &Path) -> Result<(), SessionError> {
        tessera_io::save_world(dir, self.seed(), &self.store)?;
        Ok(())
    }

    #[inline]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[inline]
    pub fn seed(&self) -> i64 {
        self.generator.profile.seed()
    }

    #[inline]
    pub fn geometry(&self) -> WorldGeometry {
        self.chunks.geometry()
    }

    pub fn profile(&self) -> &WorldProfile {
        &self.generator.profile
    }

    pub fn catalog(&self) -> &BlockCatalog {
        &self.generator.catalog
    }

    pub fn lights(&self) -> &LightEngine {
        &self.lights
    }

    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    pub fn chunks(&self) -> &ChunkMap {
        &self.chunks
    }

    #[inline]
    pub fn view(&self) -> TilePos {
        self.view
    }

    pub fn set_view(&mut self, view: TilePos) {
        self.view = view;
    }

    fn stream_ctx(&mut self) -> (StreamCtx<'_>, &mut ChunkStreamer) {
        let ctx = StreamCtx {
            chunks: &mut self.chunks,
            store: &mut self.store,
            lights: &mut self.lights,
            generator: &self.generator,
        };
        (ctx, &mut self.streamer)
    }

    /// Advances streaming and lighting by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        let view = self.view;
        let (mut ctx, streamer) = self.stream_ctx();
        streamer.tick(&mut ctx, view, dt);
    }

    /// Loads and lights everything around the view before returning.
    pub fn settle(&mut self) {
        let view = self.view;
        let (mut ctx, streamer) = self.stream_ctx();
        streamer.settle(&mut ctx, view);
    }

    pub fn is_idle(&self) -> bool {
        self.streamer.is_idle()
    }

    /// Drops every live chunk and starts loading again from the store.
    pub fn clear_all_chunks(&mut self) {
        let (mut ctx, streamer) = self.stream_ctx();
        streamer.clear_all_chunks(&mut ctx);
    }

    pub fn drain_events(&mut self) -> Vec<StreamEvent> {
        self.streamer.drain_events()
    }

    /// Applies new lighting settings to light work from now on.
    pub fn set_lighting_config(&mut self, config: LightingConfig) -> Result<(), SessionError> {
        config.validate()?;
        self.lights.set_config(config.clone());
        self.config.lighting = config;
        Ok(())
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(coord)
    }

    pub fn chunk_at(&self, pos: TilePos) -> Option<&Chunk> {
        if !self.geometry().contains_y(pos.y) {
            return None;
        }
        self.chunks.chunk_at(pos)
    }

    pub fn tile_type(&self, pos: TilePos, layer: Layer) -> TileType {
        self.chunks.tile_type(pos, layer)
    }

    /// Light at a tile; `None` reads as transparent.
    pub fn tile_color(&self, pos: TilePos) -> Option<Rgb> {
        self.chunks.tile_color(pos)
    }

    /// Color a renderer should draw the tile's layer with.
    pub fn display_color(&self, pos: TilePos, layer: Layer) -> Option<Rgb> {
        self.lights.display_color(self.tile_color(pos), layer)
    }

    pub fn is_air_block(&self, pos: TilePos) -> bool {
        self.chunks.is_air_block(pos)
    }

    pub fn has_adjacent_tiles(&self, pos: TilePos) -> bool {
        self.chunks.has_adjacent_tiles(pos)
    }

    fn edit(&mut self) -> WorldEdit<'_> {
        WorldEdit {
            chunks: &mut self.chunks,
            store: &mut self.store,
            lights: &mut self.lights,
            catalog: &self.generator.catalog,
            profile: &self.generator.profile,
        }
    }

    /// Raw tile write to the live chunk and the store, without lighting.
    pub fn set_tile(&mut self, pos: TilePos, layer: Layer, tile: TileType) -> bool {
        self.edit().set_tile(pos, layer, tile)
    }

    pub fn place_block(&mut self, pos: TilePos, layer: Layer, tile: TileType) -> Result<(), EditError> {
        self.edit().place_block(pos, layer, tile)
    }

    pub fn break_block(&mut self, pos: TilePos, layer: Layer) -> Result<TileType, EditError> {
        self.edit().break_block(pos, layer)
    }

    /// Tile as recorded in the store, loaded or not.
    pub fn stored_tile(&self, pos: TilePos, layer: Layer) -> TileType {
        let g = self.geometry();
        if !g.contains_y(pos.y) {
            return TileType::Air;
        }
        let (x, y) = g.local(pos);
        self.store.get(g.chunk_of(pos)).map_or(TileType::Air, |s| s.layer(layer).get(x, y))
    }

    /// Top-left tile of the structure, when the world has one.
    pub fn structure_anchor(&self) -> Option<TilePos> {
        self.generator.structure_anchor()
    }

    /// Whether the structure's front layer still matches its layout.
    pub fn structure_complete(&self) -> bool {
        let Some(anchor) = self.structure_anchor() else { return false };
        self.generator
            .plan
            .is_complete((anchor.x, anchor.y), |x, y| self.stored_tile(TilePos::new(x, y), Layer::Front))
    }
}
