//! API error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Core error: {0}")]
    Core(#[from] wayfare_core::CoreError),

    #[error("Database error: {0}")]
    Database(#[from] wayfare_db::DbError),

    #[error("Auth error: {0}")]
    Auth(#[from] wayfare_auth::AuthError),

    #[error("Storage error: {0}")]
    Storage(#[from] wayfare_storage::StorageError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use wayfare_core::CoreError;

        let (status, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Core(e) => match e {
                CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                CoreError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
                }
                CoreError::Duplicate(msg) => (StatusCode::CONFLICT, msg.clone()),
                CoreError::UserInactive => (
                    StatusCode::UNAUTHORIZED,
                    "User is inactive or no longer exists".to_string(),
                ),
                CoreError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
                CoreError::Auth(e) => auth_status(e),
                CoreError::Database(e) => {
                    error!("Database error: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
            ApiError::Database(e) => match e {
                wayfare_db::DbError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
                wayfare_db::DbError::Duplicate(msg) => (StatusCode::CONFLICT, msg.clone()),
                _ => {
                    error!("Database error: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
            ApiError::Auth(e) => auth_status(e),
            ApiError::Storage(e) => {
                error!("Storage error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = axum::Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

fn auth_status(e: &wayfare_auth::AuthError) -> (StatusCode, String) {
    use wayfare_auth::AuthError;

    let status = match e {
        AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
        AuthError::PasswordHash(_) | AuthError::InvalidExpiry(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        _ => StatusCode::UNAUTHORIZED,
    };
    (status, e.to_string())
}
