//! User directory and saved-passenger routes

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, put},
};
use std::str::FromStr;
use tracing::info;
use wayfare_db::{Passenger, User, UserRole};

use crate::error::ApiError;
use crate::state::AppState;

use super::auth::{RequireAdmin, RequireAuth};
use super::types::{CustomerPageQuery, Pagination, UsersByRoleResponse, UsersResponse};

/// GET /api/v1/users
async fn list_users(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<CustomerPageQuery>,
) -> Result<Json<UsersResponse>, ApiError> {
    let (users, total) = state.db.list_users(query.page, query.limit).await?;

    Ok(Json(UsersResponse {
        users,
        pagination: Pagination::new(query.page, query.limit, total),
    }))
}

/// GET /api/v1/users/role/{role} (Admin only)
async fn users_by_role(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(role): Path<String>,
) -> Result<Json<UsersByRoleResponse>, ApiError> {
    let role = UserRole::from_str(&role)
        .map_err(|_| ApiError::BadRequest(format!("Invalid role: {}", role)))?;

    let users = state.db.get_users_by_role(role).await?;

    Ok(Json(UsersByRoleResponse { users }))
}

/// PUT /api/v1/users/passengers
///
/// Saved passengers belong to the calling account; any authenticated
/// user manages only their own list.
async fn add_saved_passenger(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(passenger): Json<Passenger>,
) -> Result<Json<User>, ApiError> {
    if passenger.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Passenger name is required".to_string()));
    }
    if passenger.age < 0 {
        return Err(ApiError::BadRequest("Passenger age cannot be negative".to_string()));
    }

    let user = state
        .db
        .add_saved_passenger(user.id, passenger)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User: {}", user.id)))?;

    info!("User {} saved a passenger", user.id);

    Ok(Json(user))
}

/// DELETE /api/v1/users/passengers/{index}
async fn remove_saved_passenger(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(index): Path<String>,
) -> Result<Json<User>, ApiError> {
    let index: usize = index
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid passenger index".to_string()))?;

    let user = state
        .db
        .remove_saved_passenger(user.id, index)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User: {}", user.id)))?;

    Ok(Json(user))
}

/// Create user routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/users", get(list_users))
        .route("/api/v1/users/role/{role}", get(users_by_role))
        .route("/api/v1/users/passengers", put(add_saved_passenger))
        .route("/api/v1/users/passengers/{index}", delete(remove_saved_passenger))
}
