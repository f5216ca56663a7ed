use tessera_blocks::CatalogError;
use tessera_io::SaveError;
use tessera_lighting::LightingConfigError;
use tessera_world::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    World(#[from] ConfigError),
    #[error(transparent)]
    Lighting(#[from] LightingConfigError),
    #[error(transparent)]
    Save(#[from] SaveError),
    #[error("failed to read session config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse session config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("streaming {what} must not be negative, got {value}")]
    NegativeStreaming { what: &'static str, value: f32 },
    #[error("failed to start generation workers: {0}")]
    Workers(#[from] rayon::ThreadPoolBuildError),
}
