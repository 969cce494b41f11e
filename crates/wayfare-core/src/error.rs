//! Core error types

use thiserror::Error;
use wayfare_auth::AuthError;
use wayfare_db::DbError;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("User is inactive or no longer exists")]
    UserInactive,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(DbError),
}

impl From<DbError> for CoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Duplicate(msg) => CoreError::Duplicate(msg),
            DbError::NotFound(msg) => CoreError::NotFound(msg),
            other => CoreError::Database(other),
        }
    }
}
