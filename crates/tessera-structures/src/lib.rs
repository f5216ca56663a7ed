//! The fixed-layout structure stamped into the world's center chunk.
#![forbid(unsafe_code)]

use tessera_blocks::TileType;

pub const ROWS: usize = 14;
pub const COLS: usize = 29;

/// Code for an air slot that carries an embedded light.
pub const LIGHT_SLOT: u8 = 7;

const CODE_TILES: [TileType; 8] = [
    TileType::Air,
    TileType::Glass,
    TileType::SteelPlate,
    TileType::Hatch,
    TileType::Wing,
    TileType::Engine,
    TileType::LandingGear,
    TileType::Air,
];

/// Row 0 is the top of the hull.
#[rustfmt::skip]
const SHIP: [[u8; COLS]; ROWS] = [
    [0, 0, 7, 7, 7, 7, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 7, 4, 4, 4, 4, 7, 7, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 7, 4, 4, 4, 4, 4, 7, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 7, 4, 4, 4, 4, 4, 7, 7, 7, 7, 7, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 7, 2, 2, 4, 4, 4, 4, 4, 2, 1, 1, 1, 7, 7, 7, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 7, 2, 2, 2, 2, 2, 2, 2, 2, 2, 1, 1, 1, 1, 1, 1, 7, 7, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [7, 5, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 1, 1, 1, 1, 1, 1, 1, 7, 7, 0, 0, 0, 0, 0, 0, 0, 0],
    [7, 5, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 1, 1, 1, 1, 1, 1, 1, 7, 7, 7, 0, 0, 0, 0, 0],
    [0, 7, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 7, 7, 0, 0, 0],
    [7, 5, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 7, 7, 0],
    [7, 5, 2, 2, 2, 2, 4, 4, 4, 4, 4, 4, 4, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 7],
    [0, 7, 2, 2, 2, 4, 4, 4, 4, 4, 4, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2],
    [0, 0, 7, 4, 4, 4, 4, 4, 4, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 7],
    [0, 7, 4, 4, 4, 4, 4, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 7, 7, 7, 7, 7, 0],
];

/// Layout plus the tile mapping for each code.
#[derive(Clone, Copy, Debug)]
pub struct StructurePlan {
    codes: &'static [[u8; COLS]; ROWS],
}

impl Default for StructurePlan {
    fn default() -> Self {
        Self::spaceship()
    }
}

impl StructurePlan {
    pub const fn spaceship() -> Self {
        Self { codes: &SHIP }
    }

    #[inline]
    pub const fn width(&self) -> usize {
        COLS
    }

    #[inline]
    pub const fn height(&self) -> usize {
        ROWS
    }

    #[inline]
    pub fn code(&self, row: usize, col: usize) -> u8 {
        self.codes[row][col]
    }

    #[inline]
    pub fn tile(&self, row: usize, col: usize) -> TileType {
        CODE_TILES[self.code(row, col) as usize]
    }

    #[inline]
    pub fn is_light_slot(&self, row: usize, col: usize) -> bool {
        self.code(row, col) == LIGHT_SLOT
    }

    /// `(row, col)` of every light slot, top row first.
    pub fn light_slots(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..ROWS).flat_map(move |r| (0..COLS).filter(move |&c| self.is_light_slot(r, c)).map(move |c| (r, c)))
    }

    /// Checks the front layer against the layout. `anchor` is the top-left
    /// tile; rows grow downward in world space.
    pub fn is_complete(&self, anchor: (i32, i32), mut front_at: impl FnMut(i32, i32) -> TileType) -> bool {
        for r in 0..ROWS {
            for c in 0..COLS {
                if front_at(anchor.0 + c as i32, anchor.1 - r as i32) != self.tile(r, c) {
                    return false;
                }
            }
        }
        true
    }
}
