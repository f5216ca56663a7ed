//! Pure per-chunk terrain fill. Output grids are row-major: `y * size + x`.

use rand::Rng;
use tessera_blocks::{BlockCatalog, CatalogError, EligibilityRule, TileType};
use tessera_structures::StructurePlan;

use crate::coord::{ChunkCoord, TilePos};
use crate::profile::{WorldProfile, footprint};

/// Tiles and rules the fill looks up by role rather than catalog order.
#[derive(Clone, Debug)]
pub struct Palette {
    pub stone: TileType,
    pub bedrock: TileType,
    pub sand: TileType,
    pub grass: TileType,
    pub log: TileType,
    pub leaf: TileType,
    pub sand_rule: EligibilityRule,
}

impl Palette {
    pub fn resolve(catalog: &BlockCatalog) -> Result<Self, CatalogError> {
        Ok(Self {
            stone: catalog.require(TileType::Stone)?.tile,
            bedrock: catalog.require(TileType::Bedrock)?.tile,
            sand: catalog.require(TileType::Sand)?.tile,
            grass: catalog.require(TileType::DirtGrass)?.tile,
            log: catalog.require(TileType::Log)?.tile,
            leaf: catalog.require(TileType::Leaf)?.tile,
            sand_rule: catalog.require(TileType::Sand)?.rule,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkFill {
    pub coord: ChunkCoord,
    pub front: Vec<TileType>,
    pub back: Vec<TileType>,
    /// Top-left tile of the structure when its top row lies in this chunk.
    pub anchor: Option<TilePos>,
}

/// Everything the fill reads; cheap to share across worker threads.
#[derive(Clone, Copy)]
pub struct FillContext<'a> {
    pub profile: &'a WorldProfile,
    pub catalog: &'a BlockCatalog,
    pub palette: &'a Palette,
    pub plan: &'a StructurePlan,
}

type Scratch = Vec<Option<TileType>>;

impl FillContext<'_> {
    /// Generates a chunk from scratch. `rng` drives only the ore shuffle.
    pub fn fill<R: Rng + ?Sized>(&self, coord: ChunkCoord, rng: &mut R) -> ChunkFill {
        let g = self.profile.geometry();
        let coord = g.wrap_chunk(coord);
        let size = g.chunk_size as usize;
        let mut front: Scratch = vec![None; size * size];
        let mut back: Scratch = vec![None; size * size];

        self.fill_layers(coord, &mut front, &mut back);
        self.shuffle_ores_and_sand(coord, &mut front, &mut back, rng);
        if self.profile.params.trees_enabled {
            self.grow_trees(coord, &mut front, &mut back);
        }
        let anchor = self.stamp_structure(coord, Some((&mut front, &mut back)));

        ChunkFill {
            coord,
            front: front.into_iter().map(Option::unwrap_or_default).collect(),
            back: back.into_iter().map(Option::unwrap_or_default).collect(),
            anchor,
        }
    }

    /// Structure anchor for a chunk restored from the store.
    pub fn detect_anchor(&self, coord: ChunkCoord) -> Option<TilePos> {
        self.stamp_structure(self.profile.geometry().wrap_chunk(coord), None)
    }

    fn fill_layers(&self, coord: ChunkCoord, front: &mut Scratch, back: &mut Scratch) {
        let g = self.profile.geometry();
        let size = g.chunk_size;
        let origin = g.chunk_origin(coord);
        let background = self.catalog.background();
        for v in 0..size {
            for h in 0..size {
                let pos = TilePos::new(g.wrap_x(origin.x + h), origin.y + v);
                if !g.contains_y(pos.y) || pos.y > self.profile.surface_height(pos.x) {
                    continue;
                }
                let mut candidates = self.catalog.entries.iter().filter(|e| e.id != background.id);
                let f = candidates
                    .find(|e| self.profile.is_eligible(&e.rule, pos))
                    .map_or(background.tile, |e| e.tile);
                let b = self.catalog.entries[1.min(self.catalog.len())..]
                    .iter()
                    .filter(|e| e.id != background.id)
                    .find(|e| self.profile.is_eligible(&e.rule, pos))
                    .map_or(background.tile, |e| e.tile);
                let i = (v * size + h) as usize;
                if pos.y < self.profile.params.bedrock_depth {
                    front[i] = Some(self.palette.bedrock);
                    back[i] = Some(self.palette.bedrock);
                } else {
                    front[i] = Some(f);
                    back[i] = Some(b);
                }
            }
        }
    }

    fn shuffle_ores_and_sand<R: Rng + ?Sized>(&self, coord: ChunkCoord, front: &mut Scratch, back: &mut Scratch, rng: &mut R) {
        let g = self.profile.geometry();
        let size = g.chunk_size as usize;
        let origin = g.chunk_origin(coord);
        let p = self.palette;
        // top-down, so a grass tile turned to sand never feeds the row above it
        for h in 0..size {
            for v in (0..size).rev() {
                let i = v * size + h;
                let (Some(mut f), Some(mut b)) = (front[i], back[i]) else { continue };

                if b.is_ore() && f.is_air() && rng.gen_bool(0.5) {
                    b = p.stone;
                }
                if f.is_ore() {
                    let to_back = rng.gen_bool(0.5);
                    if rng.gen_bool(0.5) {
                        if to_back {
                            b = f;
                            f = p.stone;
                        } else {
                            f = b;
                            b = p.stone;
                        }
                    }
                }

                if f == p.grass || b == p.grass {
                    let (sand_back, sand_front) = if v > 0 {
                        (back[i - size] == Some(p.sand), front[i - size] == Some(p.sand))
                    } else {
                        let below = TilePos::new(g.wrap_x(origin.x + h as i32), origin.y - 1);
                        let eligible = self.profile.is_eligible(&p.sand_rule, below);
                        (eligible, eligible)
                    };
                    if sand_back {
                        b = p.sand;
                    }
                    if f == p.grass && (sand_front || sand_back || b == p.sand) {
                        f = p.sand;
                    }
                }
                front[i] = Some(f);
                back[i] = Some(b);
            }
        }
    }

    // Trunks live on the back layer; the upper half of the trunk column and
    // the tree's neighbors carry leaves.
    fn grow_trees(&self, coord: ChunkCoord, front: &mut Scratch, back: &mut Scratch) {
        let g = self.profile.geometry();
        let size = g.chunk_size;
        let origin = g.chunk_origin(coord);
        let (log, leaf) = (self.palette.log, self.palette.leaf);
        let crown = |x: i32| {
            let s = self.profile.surface_height(x);
            let t = self.profile.tree_height(x);
            (s, s + t, s + (t + 1) / 2 + 1)
        };
        for h in 0..size {
            let x = g.wrap_x(origin.x + h);
            let own = self.profile.tree_height(x) > 0;
            let side = [x - 1, x + 1].into_iter().find(|&n| self.profile.tree_height(n) > 0);
            for v in 0..size {
                let y = origin.y + v;
                let i = (v * size + h) as usize;
                if own {
                    let (surface, top, leaves) = crown(x);
                    if surface < y && y < top {
                        back[i] = Some(log);
                        if leaves <= y {
                            front[i] = Some(leaf);
                        }
                    } else if y == top {
                        back[i] = Some(leaf);
                    }
                } else if let Some(n) = side {
                    let (_, top, leaves) = crown(n);
                    if leaves <= y && y < top {
                        back[i] = Some(leaf);
                    }
                }
            }
        }
    }

    /// Writes the structure into `layers` when given, and returns the anchor
    /// if the top row falls inside this chunk.
    fn stamp_structure(&self, coord: ChunkCoord, mut layers: Option<(&mut Scratch, &mut Scratch)>) -> Option<TilePos> {
        if self.profile.structure_home() != Some(coord.cx) {
            return None;
        }
        let ground = self.profile.structure_ground(self.plan)?;
        let g = self.profile.geometry();
        let size = g.chunk_size;
        let origin = g.chunk_origin(coord);
        let (lo, _) = footprint(size, self.plan);
        let rows = self.plan.height() as i32;
        let mut anchor = None;
        for r in 0..rows {
            let v = ground + (rows - r) - origin.y;
            if !(0..size).contains(&v) {
                continue;
            }
            for c in 0..self.plan.width() as i32 {
                let h = lo + c;
                if let Some((front, back)) = layers.as_mut() {
                    let i = (v * size + h) as usize;
                    back[i] = Some(TileType::Air);
                    front[i] = Some(self.plan.tile(r as usize, c as usize));
                }
                if r == 0 && c == 0 {
                    anchor = Some(TilePos::new(origin.x + h, origin.y + v));
                }
            }
        }
        anchor
    }
}
