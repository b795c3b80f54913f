use crate::storage::StorageError;
use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum GameError {
    /// Requested entity does not exist
    #[error("{resource} not found with id: {id}")]
    NotFound { resource: &'static str, id: Uuid },

    #[error("Player not found with name: {0}")]
    PlayerNameNotFound(String),

    #[error("Monster not found in player's monster box")]
    MissingFromBox { player_id: Uuid, monster_id: Uuid },

    /// Request failed validation or a business rule
    #[error("{0}")]
    InvalidInput(String),

    /// Body could not be parsed into the expected JSON shape
    #[error("{0}")]
    MalformedBody(String),

    #[error("Player with name '{0}' already exists")]
    NameTaken(String),

    /// Monster is still referenced by a fight
    #[error("Monster {id} is still part of a fight")]
    InUse { id: Uuid },

    /// Stored fight no longer satisfies its own invariants
    #[error("{0}")]
    CorruptFight(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl GameError {
    pub fn not_found(resource: &'static str, id: Uuid) -> Self {
        GameError::NotFound { resource, id }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GameError::NotFound { .. }
            | GameError::PlayerNameNotFound(_)
            | GameError::MissingFromBox { .. } => StatusCode::NOT_FOUND,
            GameError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            GameError::MalformedBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GameError::NameTaken(_) | GameError::InUse { .. } => StatusCode::CONFLICT,
            GameError::CorruptFight(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GameError::Storage(err) => match err {
                StorageError::NotFound => StatusCode::NOT_FOUND,
                StorageError::UniqueViolation { .. } | StorageError::ForeignKeyViolation { .. } => {
                    StatusCode::CONFLICT
                }
                StorageError::CheckViolation { .. } => StatusCode::BAD_REQUEST,
                StorageError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Message safe to hand back to clients.
    pub fn user_message(&self) -> String {
        match self {
            GameError::Storage(StorageError::Other(_)) => "Internal server error".to_string(),
            GameError::CorruptFight(_) => "Fight is in an inconsistent state".to_string(),
            other => other.to_string(),
        }
    }
}
