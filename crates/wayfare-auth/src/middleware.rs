//! Authenticated-user representation and header parsing
//!
//! The role gate itself lives in the API crate as axum extractors; this
//! module holds the pieces it builds on.

use serde::{Deserialize, Serialize};
use wayfare_db::UserRole;

use crate::error::AuthError;
use crate::jwt::Claims;

/// Authenticated user information, decoded from an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub role: UserRole,
}

impl AuthUser {
    /// Create from JWT claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            id: claims.sub.parse().unwrap_or(0),
            email: claims.email.clone(),
            role: claims.role,
        }
    }
}

/// Extract the bearer token from an Authorization header value
pub fn extract_bearer_token(header: &str) -> Result<&str, AuthError> {
    if !header.starts_with("Bearer ") {
        return Err(AuthError::InvalidAuthHeader);
    }
    Ok(&header[7..])
}
