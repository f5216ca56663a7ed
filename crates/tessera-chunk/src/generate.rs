use std::sync::Arc;

use rand::Rng;
use tessera_blocks::{BlockCatalog, CatalogError};
use tessera_structures::StructurePlan;
use tessera_world::{ChunkCoord, ChunkFill, FillContext, Palette, TilePos, WorldProfile};

use crate::chunk::{Chunk, ChunkState, TileGrid};
use crate::store::{ChunkStore, StoredChunk};

/// Shared, immutable generation inputs. Clone freely into worker jobs.
#[derive(Clone, Debug)]
pub struct WorldGenerator {
    pub profile: Arc<WorldProfile>,
    pub catalog: Arc<BlockCatalog>,
    pub plan: StructurePlan,
    palette: Arc<Palette>,
}

impl WorldGenerator {
    pub fn new(profile: Arc<WorldProfile>, catalog: Arc<BlockCatalog>, plan: StructurePlan) -> Result<Self, CatalogError> {
        let palette = Arc::new(Palette::resolve(&catalog)?);
        Ok(Self { profile, catalog, plan, palette })
    }

    fn context(&self) -> FillContext<'_> {
        FillContext { profile: &self.profile, catalog: &self.catalog, palette: &self.palette, plan: &self.plan }
    }

    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.profile.geometry().chunk_size as usize
    }

    /// Pure fill of a never-seen chunk; safe to run off the main thread.
    pub fn fill_fresh<R: Rng + ?Sized>(&self, coord: ChunkCoord, rng: &mut R) -> ChunkFill {
        self.context().fill(coord, rng)
    }

    /// Replays stored tiles, re-detecting the structure anchor.
    pub fn restore(&self, coord: ChunkCoord, stored: &StoredChunk) -> ChunkFill {
        let coord = self.profile.geometry().wrap_chunk(coord);
        ChunkFill {
            coord,
            front: stored.front.tiles.clone(),
            back: stored.back.tiles.clone(),
            anchor: self.context().detect_anchor(coord),
        }
    }

    /// Moves a fill into its live chunk and records fresh chunks in the store.
    ///
    /// The store is written only for chunks it has never seen, so edits
    /// already recorded there survive any regeneration.
    pub fn commit(&self, chunk: &mut Chunk, fill: ChunkFill, store: &mut ChunkStore) {
        let size = self.chunk_size();
        let front = TileGrid::from_tiles(size, fill.front);
        let back = TileGrid::from_tiles(size, fill.back);
        if !store.contains(fill.coord) {
            store.insert(fill.coord, StoredChunk { front: front.clone(), back: back.clone() });
            log::trace!(target: "stream", "stored {:?}", fill.coord);
        }
        chunk.tiles.front = front;
        chunk.tiles.back = back;
        chunk.settle_colors();
        chunk.state = ChunkState::Lighting;
    }

    /// Top-left tile of the structure, if the world has one that fits.
    pub fn structure_anchor(&self) -> Option<TilePos> {
        let home = self.profile.structure_home()?;
        let ground = self.profile.structure_ground(&self.plan)?;
        let top = ground + self.plan.height() as i32;
        let cy = top.div_euclid(self.profile.geometry().chunk_size);
        self.context().detect_anchor(ChunkCoord::new(home, cy))
    }

    /// Synchronous generate-or-restore of one chunk. Returns the structure
    /// anchor when this chunk holds the structure's top row.
    pub fn generate_chunk<R: Rng + ?Sized>(&self, chunk: &mut Chunk, store: &mut ChunkStore, rng: &mut R) -> Option<TilePos> {
        let coord = self.profile.geometry().wrap_chunk(chunk.coord);
        let fill = match store.get(coord) {
            Some(stored) => self.restore(coord, stored),
            None => self.fill_fresh(coord, rng),
        };
        let anchor = fill.anchor;
        self.commit(chunk, fill, store);
        anchor
    }
}
