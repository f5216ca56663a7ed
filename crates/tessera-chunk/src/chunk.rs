use tessera_blocks::TileType;
use tessera_world::{ChunkCoord, TilePos};

use crate::color::Rgb;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    Front,
    Back,
}

/// Handle into the light registry. Chunks record the lights they own by id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LightId(pub u32);

/// Square grid of tiles, row-major with `y` growing upward.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    pub size: usize,
    pub tiles: Vec<TileType>,
}

impl TileGrid {
    pub fn new(size: usize) -> Self {
        Self { size, tiles: vec![TileType::Air; size * size] }
    }

    pub fn from_tiles(size: usize, tiles: Vec<TileType>) -> Self {
        debug_assert_eq!(tiles.len(), size * size, "tile count does not match a {size}x{size} grid");
        Self { size, tiles }
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.size + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> TileType {
        self.tiles[self.idx(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, t: TileType) {
        let i = self.idx(x, y);
        self.tiles[i] = t;
    }

    pub fn is_all_air(&self) -> bool {
        self.tiles.iter().all(|t| t.is_air())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkTiles {
    pub front: TileGrid,
    pub back: TileGrid,
}

impl ChunkTiles {
    pub fn new(size: usize) -> Self {
        Self { front: TileGrid::new(size), back: TileGrid::new(size) }
    }

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

/// Lifecycle of a live chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkState {
    /// Waiting on tile generation or restore.
    Generating,
    /// Tiles committed, bootstrap lighting pending.
    Lighting,
    Ready,
}

#[derive(Clone, Debug)]
pub struct Chunk {
    pub coord: ChunkCoord,
    /// World position of the bottom-left tile.
    pub origin: TilePos,
    pub tiles: ChunkTiles,
    colors: Vec<Option<Rgb>>,
    pub state: ChunkState,
    pub ambient_lights: Vec<LightId>,
    pub placed_lights: Vec<LightId>,
}

impl Chunk {
    pub fn new(coord: ChunkCoord, origin: TilePos, size: usize) -> Self {
        Self {
            coord,
            origin,
            tiles: ChunkTiles::new(size),
            colors: vec![None; size * size],
            state: ChunkState::Generating,
            ambient_lights: Vec::new(),
            placed_lights: Vec::new(),
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.tiles.front.size
    }

    #[inline]
    pub fn is_generated(&self) -> bool {
        self.state != ChunkState::Generating
    }

    #[inline]
    pub fn tile(&self, layer: Layer, x: usize, y: usize) -> TileType {
        self.tiles.layer(layer).get(x, y)
    }

    #[inline]
    pub fn set_tile(&mut self, layer: Layer, x: usize, y: usize, t: TileType) {
        self.tiles.layer_mut(layer).set(x, y, t);
    }

    #[inline]
    pub fn is_air(&self, x: usize, y: usize) -> bool {
        self.tile(Layer::Front, x, y).is_air() && self.tile(Layer::Back, x, y).is_air()
    }

    #[inline]
    pub fn color(&self, x: usize, y: usize) -> Option<Rgb> {
        self.colors[self.tiles.front.idx(x, y)]
    }

    #[inline]
    pub fn color_or_black(&self, x: usize, y: usize) -> Rgb {
        self.color(x, y).unwrap_or(Rgb::BLACK)
    }

    #[inline]
    pub fn set_color(&mut self, x: usize, y: usize, c: Rgb) {
        let i = self.tiles.front.idx(x, y);
        self.colors[i] = Some(c);
    }

    /// Fills every unset color with black.
    pub fn settle_colors(&mut self) {
        for c in self.colors.iter_mut().filter(|c| c.is_none()) {
            *c = Some(Rgb::BLACK);
        }
    }

    pub fn reset_colors(&mut self) {
        self.colors.fill(None);
    }

    /// Drops every light id this chunk owns and returns them.
    pub fn take_lights(&mut self) -> Vec<LightId> {
        let mut out = std::mem::take(&mut self.ambient_lights);
        out.append(&mut self.placed_lights);
        out
    }
}
