//! Booking routes
//!
//! Customers see and create their own bookings; the admin surface under
//! /api/v1/admin manages all of them.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use std::str::FromStr;
use tracing::info;
use wayfare_core::CreateBookingData;
use wayfare_db::{Booking, BookingDetails, BookingQuery, BookingStatus, UpdateBooking};

use crate::error::ApiError;
use crate::state::AppState;

use super::auth::{RequireAdmin, RequireCustomer};
use super::types::{
    AdminCreateBookingRequest, BookingListQuery, BookingsResponse, CustomerPageQuery, Pagination,
};

// ==================== Customer Routes ====================

/// GET /api/v1/bookings (own bookings)
async fn list_own_bookings(
    RequireCustomer(user): RequireCustomer,
    State(state): State<AppState>,
    Query(query): Query<CustomerPageQuery>,
) -> Result<Json<BookingsResponse>, ApiError> {
    let (bookings, total) = state
        .db
        .list_bookings_for_user(user.id, query.page, query.limit)
        .await?;

    Ok(Json(BookingsResponse {
        bookings,
        pagination: Pagination::new(query.page, query.limit, total),
    }))
}

/// POST /api/v1/bookings
async fn create_booking(
    RequireCustomer(user): RequireCustomer,
    State(state): State<AppState>,
    Json(request): Json<CreateBookingData>,
) -> Result<(StatusCode, Json<Booking>), ApiError> {
    let booking = state.bookings.create_booking(user.id, request).await?;

    metrics::counter!("wayfare_bookings_created_total").increment(1);

    Ok((StatusCode::CREATED, Json(booking)))
}

// ==================== Admin Routes ====================

/// GET /api/v1/admin/bookings (Admin only)
async fn admin_list_bookings(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<BookingsResponse>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(|s| {
            BookingStatus::from_str(s)
                .map_err(|_| ApiError::BadRequest(format!("Invalid status: {}", s)))
        })
        .transpose()?;

    let (bookings, total) = state
        .db
        .list_bookings(BookingQuery {
            status,
            page: query.page,
            limit: query.limit,
        })
        .await?;

    Ok(Json(BookingsResponse {
        bookings,
        pagination: Pagination::new(query.page, query.limit, total),
    }))
}

/// POST /api/v1/admin/bookings (Admin only)
///
/// Back-office bookings are placed on behalf of an existing customer.
async fn admin_create_booking(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(request): Json<AdminCreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), ApiError> {
    let user = state
        .db
        .get_user_by_id(request.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User: {}", request.user_id)))?;

    let booking = state.bookings.create_booking(user.id, request.data).await?;

    info!("Admin created booking {} for user {}", booking.id, user.id);

    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /api/v1/admin/bookings/{id} (Admin only)
async fn admin_get_booking(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<BookingDetails>, ApiError> {
    let booking = state
        .db
        .get_booking_details(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Booking: {}", id)))?;

    Ok(Json(booking))
}

/// PUT /api/v1/admin/bookings/{id} (Admin only)
async fn admin_update_booking(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateBooking>,
) -> Result<Json<Booking>, ApiError> {
    let booking = state
        .db
        .update_booking(id, request)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Booking: {}", id)))?;

    info!("Updated booking {} to status {}", booking.id, booking.status.as_str());

    Ok(Json(booking))
}

/// DELETE /api/v1/admin/bookings/{id} (Admin only)
async fn admin_delete_booking(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = state.db.delete_booking(id).await?;

    if deleted {
        info!("Deleted booking: {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Booking: {}", id)))
    }
}

/// Create booking routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/bookings", get(list_own_bookings))
        .route("/api/v1/bookings", post(create_booking))
        .route("/api/v1/admin/bookings", get(admin_list_bookings))
        .route("/api/v1/admin/bookings", post(admin_create_booking))
        .route("/api/v1/admin/bookings/{id}", get(admin_get_booking))
        .route("/api/v1/admin/bookings/{id}", put(admin_update_booking))
        .route("/api/v1/admin/bookings/{id}", delete(admin_delete_booking))
}
