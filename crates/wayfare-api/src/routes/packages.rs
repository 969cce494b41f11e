//! Tour package routes
//!
//! The public catalog only ever sees active packages; the admin surface
//! under /api/v1/admin sees everything.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use std::str::FromStr;
use tracing::{debug, info};
use wayfare_db::{NewTourPackage, PackageQuery, Region, TourPackage, UpdateTourPackage};

use crate::error::ApiError;
use crate::state::AppState;

use super::auth::RequireAdmin;
use super::types::{
    CatalogQuery, LimitQuery, PackageListResponse, PackagesResponse, PageQuery, Pagination,
};

fn parse_region(s: &str) -> Result<Region, ApiError> {
    Region::from_str(s).map_err(|_| ApiError::BadRequest(format!("Invalid region: {}", s)))
}

// ==================== Public Catalog ====================

/// GET /api/v1/packages
async fn list_packages(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<PackagesResponse>, ApiError> {
    let region = query.region.as_deref().map(parse_region).transpose()?;

    let (packages, total) = state
        .db
        .list_packages(PackageQuery {
            region,
            min_price: query.min_price,
            max_price: query.max_price,
            min_pax: query.min_pax,
            featured: query.featured,
            search: query.search,
            page: query.page,
            limit: query.limit,
        })
        .await?;

    Ok(Json(PackagesResponse {
        packages,
        pagination: Pagination::new(query.page, query.limit, total),
    }))
}

/// GET /api/v1/packages/featured
async fn featured_packages(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<PackageListResponse>, ApiError> {
    let packages = state.db.featured_packages(query.limit.unwrap_or(6)).await?;
    Ok(Json(PackageListResponse { packages }))
}

/// GET /api/v1/packages/region/{region}
async fn packages_by_region(
    State(state): State<AppState>,
    Path(region): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<PackageListResponse>, ApiError> {
    let region = parse_region(&region)?;
    let packages = state
        .db
        .packages_by_region(region, query.limit.unwrap_or(10))
        .await?;
    Ok(Json(PackageListResponse { packages }))
}

/// GET /api/v1/packages/{slug}
async fn get_package_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<TourPackage>, ApiError> {
    let package = state
        .db
        .get_package_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Package: {}", slug)))?;

    // Counting a view is best-effort bookkeeping, not part of the response
    state.db.increment_package_views(package.id).await?;

    Ok(Json(package))
}

// ==================== Admin Routes ====================

/// GET /api/v1/admin/packages (Admin only)
async fn admin_list_packages(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PackagesResponse>, ApiError> {
    let (packages, total) = state.db.list_packages_admin(query.page, query.limit).await?;

    Ok(Json(PackagesResponse {
        packages,
        pagination: Pagination::new(query.page, query.limit, total),
    }))
}

/// POST /api/v1/admin/packages (Admin only)
async fn admin_create_package(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(request): Json<NewTourPackage>,
) -> Result<(StatusCode, Json<TourPackage>), ApiError> {
    if request.min_pax < 1 || request.max_pax < request.min_pax {
        return Err(ApiError::BadRequest(
            "Pax bounds must satisfy 1 <= min_pax <= max_pax".to_string(),
        ));
    }
    if request.base_price_per_pax < 0 {
        return Err(ApiError::BadRequest("Price cannot be negative".to_string()));
    }

    debug!("Creating package: {}", request.slug);

    let package = state.db.insert_package(request).await?;

    info!("Created package: {}", package.slug);

    Ok((StatusCode::CREATED, Json(package)))
}

/// GET /api/v1/admin/packages/{id} (Admin only)
async fn admin_get_package(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TourPackage>, ApiError> {
    let package = state
        .db
        .get_package_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Package: {}", id)))?;

    Ok(Json(package))
}

/// PUT /api/v1/admin/packages/{id} (Admin only)
async fn admin_update_package(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateTourPackage>,
) -> Result<Json<TourPackage>, ApiError> {
    let package = state
        .db
        .update_package(id, request)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Package: {}", id)))?;

    info!("Updated package: {}", package.slug);

    Ok(Json(package))
}

/// DELETE /api/v1/admin/packages/{id} (Admin only)
async fn admin_delete_package(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = state.db.delete_package(id).await?;

    if deleted {
        info!("Deleted package: {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Package: {}", id)))
    }
}

/// Create package routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/packages", get(list_packages))
        .route("/api/v1/packages/featured", get(featured_packages))
        .route("/api/v1/packages/region/{region}", get(packages_by_region))
        .route("/api/v1/packages/{slug}", get(get_package_by_slug))
        .route("/api/v1/admin/packages", get(admin_list_packages))
        .route("/api/v1/admin/packages", post(admin_create_package))
        .route("/api/v1/admin/packages/{id}", get(admin_get_package))
        .route("/api/v1/admin/packages/{id}", put(admin_update_package))
        .route("/api/v1/admin/packages/{id}", delete(admin_delete_package))
}
