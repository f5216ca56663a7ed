use serde::{Deserialize, Serialize};

/// Absolute tile position. `x` may lie outside `[0, width)` until it is
/// globalized; `y` never wraps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }

    /// Axis neighbors in propagation order: left, down, right, up.
    #[inline]
    pub fn neighbors(self) -> [TilePos; 4] {
        [self.offset(-1, 0), self.offset(0, -1), self.offset(1, 0), self.offset(0, 1)]
    }
}

impl From<(i32, i32)> for TilePos {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cy: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cy: i32) -> Self {
        Self { cx, cy }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self { cx: self.cx + dx, cy: self.cy + dy }
    }

    #[inline]
    pub fn distance_sq(self, other: ChunkCoord) -> i64 {
        let dx = i64::from(self.cx - other.cx);
        let dy = i64::from(self.cy - other.cy);
        dx * dx + dy * dy
    }
}

impl From<(i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl From<ChunkCoord> for (i32, i32) {
    fn from(value: ChunkCoord) -> Self {
        (value.cx, value.cy)
    }
}

/// World extent and the wrap-aware conversions between tiles and chunks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldGeometry {
    pub width: i32,
    pub height: i32,
    pub chunk_size: i32,
}

impl WorldGeometry {
    #[inline]
    pub const fn new(width: i32, height: i32, chunk_size: i32) -> Self {
        Self { width, height, chunk_size }
    }

    #[inline]
    pub fn chunks_x(&self) -> i32 {
        self.width / self.chunk_size
    }

    #[inline]
    pub fn chunks_y(&self) -> i32 {
        self.height.div_euclid(self.chunk_size)
    }

    #[inline]
    pub fn wrap_x(&self, x: i32) -> i32 {
        x.rem_euclid(self.width)
    }

    #[inline]
    pub fn globalize(&self, p: TilePos) -> TilePos {
        TilePos::new(self.wrap_x(p.x), p.y)
    }

    #[inline]
    pub fn wrap_chunk(&self, c: ChunkCoord) -> ChunkCoord {
        ChunkCoord::new(c.cx.rem_euclid(self.chunks_x()), c.cy)
    }

    /// Owning chunk of a tile, wrapped into `[0, chunks_x)` horizontally.
    #[inline]
    pub fn chunk_of(&self, p: TilePos) -> ChunkCoord {
        ChunkCoord::new(self.wrap_x(p.x) / self.chunk_size, p.y.div_euclid(self.chunk_size))
    }

    /// Lower-left tile of a chunk, after wrapping the coordinate.
    #[inline]
    pub fn chunk_origin(&self, c: ChunkCoord) -> TilePos {
        let c = self.wrap_chunk(c);
        TilePos::new(c.cx * self.chunk_size, c.cy * self.chunk_size)
    }

    /// Local `(x, y)` of a tile inside its owning chunk.
    #[inline]
    pub fn local(&self, p: TilePos) -> (usize, usize) {
        let x = self.wrap_x(p.x).rem_euclid(self.chunk_size);
        let y = p.y.rem_euclid(self.chunk_size);
        (x as usize, y as usize)
    }

    #[inline]
    pub fn contains_y(&self, y: i32) -> bool {
        (0..self.height).contains(&y)
    }

    #[inline]
    pub fn tiles_per_chunk(&self) -> usize {
        (self.chunk_size * self.chunk_size) as usize
    }
}
