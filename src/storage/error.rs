use thiserror::Error;

/// Storage failures the services know how to react to.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Entity not found")]
    NotFound,

    #[error("Unique constraint violation")]
    UniqueViolation { constraint: Option<String> },

    /// A row is still referenced elsewhere (or references something missing)
    #[error("Foreign key constraint violation")]
    ForeignKeyViolation { constraint: Option<String> },

    #[error("Check constraint violation")]
    CheckViolation { constraint: Option<String> },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::RowNotFound = err {
            return StorageError::NotFound;
        }
        if let Some(db_err) = err.as_database_error() {
            let constraint = db_err.constraint().map(|s| s.to_string());
            if db_err.is_unique_violation() {
                return StorageError::UniqueViolation { constraint };
            } else if db_err.is_foreign_key_violation() {
                return StorageError::ForeignKeyViolation { constraint };
            } else if db_err.is_check_violation() {
                return StorageError::CheckViolation { constraint };
            }
        }
        StorageError::Other(err.into())
    }
}
