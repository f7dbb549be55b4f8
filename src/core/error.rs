use thiserror::Error;

use crate::core::types::{GridPos, Objective};

#[derive(Error, Debug)]
pub enum ForgeError {
    #[error("No map template available for objective '{0}'")]
    NoTemplateForObjective(Objective),

    #[error("Invalid template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("Unknown terrain: {0}")]
    UnknownTerrain(String),

    #[error("Unknown class: {0}")]
    UnknownClass(String),

    #[error("Invalid game data: {0}")]
    InvalidData(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid weapon range: {0:?}")]
    InvalidRange(String),

    #[error("Position out of bounds: {0}")]
    OutOfBounds(GridPos),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl ForgeError {
    pub(crate) fn template(template: &str, reason: impl Into<String>) -> Self {
        ForgeError::InvalidTemplate {
            template: template.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ForgeError>;
