//! Admin dashboard routes

use axum::{Json, Router, extract::State, routing::get};
use wayfare_core::{DashboardStats, dashboard_stats};

use crate::error::ApiError;
use crate::state::AppState;

use super::auth::RequireAdmin;

/// GET /api/v1/admin/dashboard (Admin only)
async fn dashboard(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>, ApiError> {
    let stats = dashboard_stats(&state.db).await?;
    Ok(Json(stats))
}

/// Create dashboard routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/v1/admin/dashboard", get(dashboard))
}
