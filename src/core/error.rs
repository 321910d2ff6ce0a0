use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Character not found: {0:?}")]
    CharacterNotFound(crate::core::types::CharacterId),

    #[error("Interior not found: {0:?}")]
    InteriorNotFound(crate::core::types::InteriorId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
