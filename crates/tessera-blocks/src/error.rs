use crate::types::TileType;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read block catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse block catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("duplicate block name `{0}`")]
    DuplicateName(String),
    #[error("background block `{0}` is not defined")]
    MissingBackground(String),
    #[error("no block defined for tile {0:?}")]
    MissingTile(TileType),
    #[error("block `{name}` has an empty depth range [{min}, {max})")]
    BadDepth { name: String, min: i32, max: i32 },
}
