use std::collections::HashMap;

use tessera_blocks::TileType;
use tessera_world::{ChunkCoord, TilePos, WorldGeometry};

use crate::chunk::{Chunk, Layer};
use crate::color::Rgb;

/// Non-owning reference to a live chunk. Goes stale once the chunk unloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkHandle {
    slot: u32,
    generation: u32,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    chunk: Option<Chunk>,
}

/// Spatial index of live chunks keyed by wrapped chunk coordinate.
///
/// Chunks sit in a slab so hot loops can hold a [`ChunkHandle`] instead of
/// hashing the coordinate on every tile.
#[derive(Debug)]
pub struct ChunkMap {
    geometry: WorldGeometry,
    slots: Vec<Slot>,
    free: Vec<u32>,
    index: HashMap<ChunkCoord, ChunkHandle>,
}

impl ChunkMap {
    pub fn new(geometry: WorldGeometry) -> Self {
        Self { geometry, slots: Vec::new(), free: Vec::new(), index: HashMap::new() }
    }

    #[inline]
    pub fn geometry(&self) -> WorldGeometry {
        self.geometry
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Inserts a chunk, replacing any live chunk at the same coordinate.
    pub fn insert(&mut self, chunk: Chunk) -> ChunkHandle {
        let coord = self.geometry.wrap_chunk(chunk.coord);
        self.remove(coord);
        let slot = match self.free.pop() {
            Some(s) => s,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let entry = &mut self.slots[slot as usize];
        entry.chunk = Some(chunk);
        let handle = ChunkHandle { slot, generation: entry.generation };
        self.index.insert(coord, handle);
        handle
    }

    pub fn remove(&mut self, coord: ChunkCoord) -> Option<Chunk> {
        let handle = self.index.remove(&self.geometry.wrap_chunk(coord))?;
        let entry = &mut self.slots[handle.slot as usize];
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(handle.slot);
        entry.chunk.take()
    }

    pub fn clear(&mut self) -> Vec<Chunk> {
        let coords: Vec<ChunkCoord> = self.index.keys().copied().collect();
        coords.into_iter().filter_map(|c| self.remove(c)).collect()
    }

    #[inline]
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.index.contains_key(&self.geometry.wrap_chunk(coord))
    }

    #[inline]
    pub fn handle(&self, coord: ChunkCoord) -> Option<ChunkHandle> {
        self.index.get(&self.geometry.wrap_chunk(coord)).copied()
    }

    #[inline]
    pub fn handle_at(&self, pos: TilePos) -> Option<ChunkHandle> {
        self.handle(self.geometry.chunk_of(pos))
    }

    #[inline]
    pub fn resolve(&self, h: ChunkHandle) -> Option<&Chunk> {
        let s = self.slots.get(h.slot as usize)?;
        if s.generation != h.generation {
            return None;
        }
        s.chunk.as_ref()
    }

    #[inline]
    pub fn resolve_mut(&mut self, h: ChunkHandle) -> Option<&mut Chunk> {
        let s = self.slots.get_mut(h.slot as usize)?;
        if s.generation != h.generation {
            return None;
        }
        s.chunk.as_mut()
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.handle(coord).and_then(|h| self.resolve(h))
    }

    pub fn get_mut(&mut self, coord: ChunkCoord) -> Option<&mut Chunk> {
        let h = self.handle(coord)?;
        self.resolve_mut(h)
    }

    pub fn chunk_at(&self, pos: TilePos) -> Option<&Chunk> {
        self.get(self.geometry.chunk_of(pos))
    }

    pub fn chunk_at_mut(&mut self, pos: TilePos) -> Option<&mut Chunk> {
        self.get_mut(self.geometry.chunk_of(pos))
    }

    pub fn coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.index.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chunk> {
        self.slots.iter().filter_map(|s| s.chunk.as_ref())
    }

    /// Tile at a world position; air when out of range or not loaded.
    pub fn tile_type(&self, pos: TilePos, layer: Layer) -> TileType {
        if !self.geometry.contains_y(pos.y) {
            return TileType::Air;
        }
        let (x, y) = self.geometry.local(pos);
        self.chunk_at(pos).map_or(TileType::Air, |c| c.tile(layer, x, y))
    }

    pub fn set_tile(&mut self, pos: TilePos, layer: Layer, t: TileType) -> bool {
        if !self.geometry.contains_y(pos.y) {
            return false;
        }
        let (x, y) = self.geometry.local(pos);
        match self.chunk_at_mut(pos) {
            Some(c) => {
                c.set_tile(layer, x, y, t);
                true
            }
            None => false,
        }
    }

    pub fn tile_color(&self, pos: TilePos) -> Option<Rgb> {
        if !self.geometry.contains_y(pos.y) {
            return None;
        }
        let (x, y) = self.geometry.local(pos);
        self.chunk_at(pos).and_then(|c| c.color(x, y))
    }

    pub fn set_tile_color(&mut self, pos: TilePos, color: Rgb) -> bool {
        if !self.geometry.contains_y(pos.y) {
            return false;
        }
        let (x, y) = self.geometry.local(pos);
        match self.chunk_at_mut(pos) {
            Some(c) => {
                c.set_color(x, y, color);
                true
            }
            None => false,
        }
    }

    /// Both layers empty. Positions without a live chunk count as air.
    pub fn is_air_block(&self, pos: TilePos) -> bool {
        if !self.geometry.contains_y(pos.y) {
            return true;
        }
        let (x, y) = self.geometry.local(pos);
        self.chunk_at(pos).is_none_or(|c| c.is_air(x, y))
    }

    /// Whether any 4-neighbor holds a tile. False when the position's own chunk is missing.
    pub fn has_adjacent_tiles(&self, pos: TilePos) -> bool {
        if self.chunk_at(pos).is_none() {
            return false;
        }
        pos.neighbors().into_iter().any(|n| !self.is_air_block(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geo() -> WorldGeometry {
        WorldGeometry { width: 64, height: 32, chunk_size: 16 }
    }

    fn live(map: &mut ChunkMap, coord: ChunkCoord) -> ChunkHandle {
        let origin = map.geometry().chunk_origin(coord);
        map.insert(Chunk::new(coord, origin, 16))
    }

    #[test]
    fn stale_handle_does_not_resolve_after_reuse() {
        let mut m = ChunkMap::new(geo());
        let a = live(&mut m, ChunkCoord::new(0, 0));
        m.remove(ChunkCoord::new(0, 0));
        let b = live(&mut m, ChunkCoord::new(1, 0));
        assert!(m.resolve(a).is_none());
        assert_eq!(m.resolve(b).map(|c| c.coord), Some(ChunkCoord::new(1, 0)));
    }

    #[test]
    fn lookups_wrap_horizontally() {
        let mut m = ChunkMap::new(geo());
        live(&mut m, ChunkCoord::new(0, 0));
        assert!(m.set_tile(TilePos::new(-64 + 3, 2), Layer::Front, TileType::Stone));
        assert_eq!(m.tile_type(TilePos::new(3, 2), Layer::Front), TileType::Stone);
        assert!(m.contains(ChunkCoord::new(4, 0)));
    }

    #[test]
    fn missing_chunks_read_as_air_without_neighbors() {
        let mut m = ChunkMap::new(geo());
        live(&mut m, ChunkCoord::new(0, 0));
        m.set_tile(TilePos::new(15, 5), Layer::Back, TileType::Dirt);
        assert!(m.is_air_block(TilePos::new(20, 5)));
        assert!(!m.has_adjacent_tiles(TilePos::new(16, 5)));
        assert!(m.has_adjacent_tiles(TilePos::new(14, 5)));
        assert_eq!(m.tile_color(TilePos::new(20, 5)), None);
    }
}
