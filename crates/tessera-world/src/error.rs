#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("world {what} must be positive, got {value}")]
    NonPositive { what: &'static str, value: i32 },
    #[error("world {what} {value} is not a multiple of chunk size {chunk_size}")]
    NotChunkAligned { what: &'static str, value: i32, chunk_size: i32 },
    #[error("world width {0} is too narrow for seam smoothing (need at least 12)")]
    TooNarrow(i32),
    #[error("chunk size {chunk_size} cannot hold a structure {width} tiles wide")]
    StructureTooWide { chunk_size: i32, width: i32 },
    #[error("tree heights must satisfy 0 < min <= max, got [{min}, {max}]")]
    TreeHeights { min: i32, max: i32 },
    #[error("surface ratios must satisfy 0 <= min <= start <= max <= 1")]
    SurfaceRatios,
}
