use std::collections::BTreeMap;

use tessera_blocks::TileType;
use tessera_world::ChunkCoord;

use crate::chunk::{Layer, TileGrid};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredChunk {
    pub front: TileGrid,
    pub back: TileGrid,
}

impl StoredChunk {
    #[inline]
    pub fn layer(&self, layer: Layer) -> &TileGrid {
        match layer {
            Layer::Front => &self.front,
            Layer::Back => &self.back,
        }
    }

    #[inline]
    pub fn layer_mut(&mut self, layer: Layer) -> &mut TileGrid {
        match layer {
            Layer::Front => &mut self.front,
            Layer::Back => &mut self.back,
        }
    }
}

/// Authoritative tile record for every chunk ever generated or edited.
///
/// An entry is written once when its chunk is first generated; after that
/// only edits touch it. Lighting is never stored.
#[derive(Clone, Debug)]
pub struct ChunkStore {
    chunk_size: usize,
    entries: BTreeMap<ChunkCoord, StoredChunk>,
}

impl ChunkStore {
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size, entries: BTreeMap::new() }
    }

    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    #[inline]
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.entries.contains_key(&coord)
    }

    #[inline]
    pub fn get(&self, coord: ChunkCoord) -> Option<&StoredChunk> {
        self.entries.get(&coord)
    }

    #[inline]
    pub fn get_mut(&mut self, coord: ChunkCoord) -> Option<&mut StoredChunk> {
        self.entries.get_mut(&coord)
    }

    /// Records a chunk unless one is already present. Returns whether it was written.
    pub fn insert(&mut self, coord: ChunkCoord, stored: StoredChunk) -> bool {
        if self.entries.contains_key(&coord) {
            return false;
        }
        self.entries.insert(coord, stored);
        true
    }

    /// Overwrites one tile of an existing entry; returns false if there is none.
    pub fn set_tile(&mut self, coord: ChunkCoord, layer: Layer, x: usize, y: usize, t: TileType) -> bool {
        match self.entries.get_mut(&coord) {
            Some(s) => {
                s.layer_mut(layer).set(x, y, t);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = (&ChunkCoord, &StoredChunk)> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
