use std::collections::HashMap;

use tessera_chunk::{LightId, Rgb};
use tessera_world::{ChunkCoord, TilePos};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LightKind {
    /// Auto-placed at openings using the world's ambient color.
    Ambient,
    /// Explicit, e.g. a torch.
    Placed,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightSource {
    pub pos: TilePos,
    pub color: Rgb,
    pub strength: f32,
    /// Set once the light has been spread at least once.
    pub initialized: bool,
    pub kind: LightKind,
    /// Chunk whose light list holds this id, if any.
    pub owner: Option<ChunkCoord>,
}

impl LightSource {
    pub fn new(pos: TilePos, color: Rgb, strength: f32, kind: LightKind) -> Self {
        Self { pos, color, strength, initialized: false, kind, owner: None }
    }

    pub fn owned_by(mut self, coord: ChunkCoord) -> Self {
        self.owner = Some(coord);
        self
    }

    #[inline]
    pub fn contribution(&self) -> Rgb {
        self.color.scale(self.strength)
    }
}

/// Global light sources, indexed by id and by tile.
///
/// Positions are stored globalized. More than one light may share a tile.
#[derive(Debug, Default)]
pub struct LightRegistry {
    next_id: u32,
    sources: HashMap<LightId, LightSource>,
    by_pos: HashMap<TilePos, Vec<LightId>>,
}

impl LightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: LightSource) -> LightId {
        let id = LightId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.by_pos.entry(source.pos).or_default().push(id);
        self.sources.insert(id, source);
        id
    }

    pub fn remove(&mut self, id: LightId) -> Option<LightSource> {
        let source = self.sources.remove(&id)?;
        if let Some(ids) = self.by_pos.get_mut(&source.pos) {
            ids.retain(|&i| i != id);
            if ids.is_empty() {
                self.by_pos.remove(&source.pos);
            }
        }
        Some(source)
    }

    #[inline]
    pub fn get(&self, id: LightId) -> Option<&LightSource> {
        self.sources.get(&id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: LightId) -> Option<&mut LightSource> {
        self.sources.get_mut(&id)
    }

    /// First light registered at a globalized position.
    pub fn at(&self, pos: TilePos) -> Option<LightId> {
        self.by_pos.get(&pos).and_then(|ids| ids.first().copied())
    }

    pub fn all_at(&self, pos: TilePos) -> &[LightId] {
        self.by_pos.get(&pos).map_or(&[], Vec::as_slice)
    }

    #[inline]
    pub fn has_light(&self, pos: TilePos) -> bool {
        self.by_pos.contains_key(&pos)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LightId, &LightSource)> {
        self.sources.iter()
    }

    pub fn clear(&mut self) {
        self.sources.clear();
        self.by_pos.clear();
    }
}
