use thiserror::Error;

use crate::core::types::{ConflictId, ResidentId};

/// Failure reported by an external collaborator (ledger, messenger)
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct ServiceError(pub String);

impl ServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Error, Debug)]
pub enum WarError {
    #[error("{resident} is not enrolled in war {conflict}")]
    NotEnrolled {
        resident: ResidentId,
        conflict: ConflictId,
    },

    #[error("{0} has no town but fights in a faction war")]
    NoTown(ResidentId),

    #[error("{resident} is already fighting in war {conflict}")]
    AlreadyFighting {
        resident: ResidentId,
        conflict: ConflictId,
    },

    #[error("{service} failed: {source}")]
    Collaborator {
        service: &'static str,
        #[source]
        source: ServiceError,
    },

    #[error("Invalid war settings: {0}")]
    InvalidSettings(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl WarError {
    pub fn ledger(source: ServiceError) -> Self {
        WarError::Collaborator { service: "ledger", source }
    }

    pub fn messenger(source: ServiceError) -> Self {
        WarError::Collaborator { service: "messenger", source }
    }
}

pub type Result<T> = std::result::Result<T, WarError>;
