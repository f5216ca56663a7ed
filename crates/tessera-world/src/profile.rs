use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tessera_blocks::EligibilityRule;
use tessera_structures::StructurePlan;

use crate::coord::{TilePos, WorldGeometry};
use crate::noise::{NoiseField, OFFSET_MAX};
use crate::worldgen::WorldGenParams;

/// Columns blended into the flattened structure pad on each side.
const RAMP: i32 = 5;

/// Immutable world parameters plus the per-column heights computed by the
/// base pass. Every array is indexed by a wrapped x.
#[derive(Clone, Debug)]
pub struct WorldProfile {
    pub params: WorldGenParams,
    pub noise: NoiseField,
    surface: Vec<i32>,
    trees: Vec<i32>,
}

impl WorldProfile {
    /// Runs the base terrain pass: surface heights, tree spawns, seam
    /// smoothing, and the flattened structure pad.
    pub fn generate(params: WorldGenParams, plan: &StructurePlan) -> Self {
        let g = params.geometry;
        let w = g.width as usize;
        let mut rng = StdRng::seed_from_u64(params.seed as u64);
        let offset = (rng.gen_range(0.0..OFFSET_MAX), rng.gen_range(0.0..OFFSET_MAX));
        let noise = NoiseField::new(params.seed, offset);

        let mut surface = vec![0; w];
        let mut trees = vec![0; w];
        let mut average = (g.height as f32 * params.surface_ratio) as i32;
        let mut addition = 0.0f32;
        let mut last_tree = -1i32;
        for x in 0..g.width {
            let nx = offset.0 + addition;
            let ny = offset.1 + addition;
            average += ((noise.sample(nx, ny) - params.surface_bias) * params.average_multiplier) as i32;
            average = average.clamp(params.min_surface, params.max_surface);
            let hill = (noise.sample(-nx, -ny) * params.height_multiplier) as i32;
            surface[x as usize] = (average + hill).clamp(params.min_surface, params.max_surface);
            addition += params.perlin_speed;

            if x - params.tree_gap > last_tree && rng.gen_range(0..params.tree_chance) == 0 {
                trees[x as usize] = rng.gen_range(params.tree_min..=params.tree_max);
                last_tree = x;
            }
        }

        let mut profile = Self { params, noise, surface, trees };
        profile.smooth_seam();
        if profile.params.structure_enabled {
            profile.flatten_structure_pad(plan);
        }
        log::debug!(
            "world base: seed={} width={} surface[0]={} surface[w-1]={}",
            profile.params.seed,
            g.width,
            profile.surface[0],
            profile.surface[w - 1]
        );
        profile
    }

    // The world wraps, so the last and first columns are blended across the seam.
    fn smooth_seam(&mut self) {
        let n = self.params.seam_columns;
        if n == 0 {
            return;
        }
        let w = self.params.geometry.width;
        let half = n / 2;
        let left = self.surface[(w - half - 1) as usize];
        let right = self.surface[half as usize];
        for i in 0..n {
            let x = (w - half + i).rem_euclid(w);
            self.surface[x as usize] = left + (right - left) * i / (n + 1);
        }
    }

    fn flatten_structure_pad(&mut self, plan: &StructurePlan) {
        let Some(home) = self.structure_home() else { return };
        let g = self.params.geometry;
        let base = home * g.chunk_size;
        let (lo, hi) = footprint(g.chunk_size, plan);
        let at = |h: i32| g.wrap_x(base + h) as usize;

        let ground = (lo..hi).map(|h| self.surface[at(h)]).min().unwrap_or(0);
        for h in lo..hi {
            self.surface[at(h)] = ground;
        }
        let clear = self.params.structure_clearance;
        for h in (lo - clear)..(hi + clear) {
            self.trees[at(h)] = 0;
        }
        let (l, r) = (self.surface[at(lo - RAMP - 1)], self.surface[at(lo)]);
        for h in 1..=RAMP {
            self.surface[at(lo - RAMP - 1 + h)] = l + h * (r - l) / (RAMP + 1);
        }
        let (l, r) = (self.surface[at(hi - 1)], self.surface[at(hi + RAMP)]);
        for h in 1..=RAMP {
            self.surface[at(hi - 1 + h)] = l + h * (r - l) / (RAMP + 1);
        }
    }

    #[inline]
    pub fn geometry(&self) -> WorldGeometry {
        self.params.geometry
    }

    #[inline]
    pub fn seed(&self) -> i64 {
        self.params.seed
    }

    #[inline]
    pub fn surface_height(&self, x: i32) -> i32 {
        self.surface[self.params.geometry.wrap_x(x) as usize]
    }

    #[inline]
    pub fn tree_height(&self, x: i32) -> i32 {
        self.trees[self.params.geometry.wrap_x(x) as usize]
    }

    #[inline]
    pub fn stone_depth(&self) -> i32 {
        self.params.stone_depth
    }

    pub fn surface_heights(&self) -> &[i32] {
        &self.surface
    }

    pub fn tree_heights(&self) -> &[i32] {
        &self.trees
    }

    /// Chunk column hosting the structure: the first chunk whose origin lies
    /// in `[width/2, width/2 + chunk)`.
    pub fn structure_home(&self) -> Option<i32> {
        if !self.params.structure_enabled {
            return None;
        }
        let g = self.params.geometry;
        let home = (g.width / 2 + g.chunk_size - 1) / g.chunk_size;
        (home < g.chunks_x()).then_some(home)
    }

    /// Lowest surface under the structure footprint.
    pub fn structure_ground(&self, plan: &StructurePlan) -> Option<i32> {
        let home = self.structure_home()?;
        let g = self.params.geometry;
        let (lo, hi) = footprint(g.chunk_size, plan);
        (lo..hi).map(|h| self.surface_height(home * g.chunk_size + h)).min()
    }

    /// Depth, map, zone, then primary noise gate. A zero pair skips the map
    /// and zone gates but means "never" for the primary one.
    pub fn is_eligible(&self, rule: &EligibilityRule, pos: TilePos) -> bool {
        let pos = self.params.geometry.globalize(pos);
        if let Some((min, max)) = rule.depth {
            let depth = self.surface_height(pos.x) - pos.y;
            if !(min <= depth && depth < max) {
                return false;
            }
        }
        let gate = |g: &tessera_blocks::NoiseGate| g.is_disabled() || self.noise.check_level(pos, g.speed, g.level);
        if !gate(&rule.map) || !gate(&rule.zone) {
            return false;
        }
        rule.spawns() && self.noise.check_level(pos, rule.perlin.speed, rule.perlin.level)
    }
}

/// Local column span `[lo, hi)` the structure covers inside its chunk.
#[inline]
pub fn footprint(chunk_size: i32, plan: &StructurePlan) -> (i32, i32) {
    let sw = plan.width() as i32;
    (chunk_size / 2 - sw / 2, chunk_size / 2 + sw / 2)
}
