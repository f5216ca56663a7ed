use fastnoise_lite::{FastNoiseLite, NoiseType};

use crate::coord::TilePos;

/// Largest value either component of the sampling offset can take.
pub const OFFSET_MAX: f32 = 10_000.0;

/// Seeded gradient noise remapped to `[0, 1]`, shifted by a per-world offset.
pub struct NoiseField {
    perlin: FastNoiseLite,
    seed: i64,
    pub offset: (f32, f32),
}

impl Clone for NoiseField {
    fn clone(&self) -> Self {
        Self::new(self.seed, self.offset)
    }
}

impl std::fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseField").field("offset", &self.offset).finish()
    }
}

impl NoiseField {
    pub fn new(seed: i64, offset: (f32, f32)) -> Self {
        let mut perlin = FastNoiseLite::with_seed(seed as i32);
        perlin.set_noise_type(Some(NoiseType::Perlin));
        perlin.set_frequency(Some(1.0));
        Self { perlin, seed, offset }
    }

    /// Raw sample in `[0, 1]`.
    #[inline]
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        (self.perlin.get_noise_2d(x, y) * 0.5 + 0.5).clamp(0.0, 1.0)
    }

    /// Averages two mirrored samples around the offset and compares against
    /// `level`. The mirrored pair hides lattice-aligned streaks.
    pub fn check_level(&self, pos: TilePos, speed: f32, level: f32) -> bool {
        let (ox, oy) = self.offset;
        let (px, py) = (pos.x as f32 * speed, pos.y as f32 * speed);
        let a = self.sample(ox + px, oy + py);
        let b = self.sample(ox - px, oy - py);
        (a + b) / 2.0 >= level
    }
}
