//! Vehicle fleet routes (admin only)

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post, put},
};
use std::str::FromStr;
use tracing::{debug, info};
use wayfare_db::{NewVehicle, UpdateVehicle, Vehicle, VehicleQuery, VehicleType};

use crate::error::ApiError;
use crate::state::AppState;

use super::auth::RequireAdmin;
use super::types::{VehicleListQuery, VehiclesResponse};

/// Latest model year accepted for a vehicle
fn max_vehicle_year() -> i64 {
    use chrono::Datelike;
    chrono::Utc::now().year() as i64 + 1
}

fn validate_vehicle(vehicle: &NewVehicle) -> Result<(), ApiError> {
    let mut errors: Vec<String> = Vec::new();

    if vehicle.year < 1900 || vehicle.year > max_vehicle_year() {
        errors.push("Valid year is required (1900 - current year + 1)".to_string());
    }
    if vehicle.seating_capacity < 1 {
        errors.push("Seating capacity must be at least 1".to_string());
    }
    if vehicle.features.len() > 20 {
        errors.push("Cannot have more than 20 features".to_string());
    }
    if vehicle.images.len() > 10 {
        errors.push("Cannot have more than 10 images".to_string());
    }
    if vehicle.description.len() > 1000 {
        errors.push("Description cannot be longer than 1000 characters".to_string());
    }
    if vehicle.base_price_per_day < 0 {
        errors.push("Price cannot be negative".to_string());
    }
    if vehicle.driver.mobile.len() != 10 || !vehicle.driver.mobile.chars().all(|c| c.is_ascii_digit())
    {
        errors.push("Driver mobile must be a 10-digit number".to_string());
    }
    if vehicle.driver.experience_years < 0 {
        errors.push("Driver experience cannot be negative".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::BadRequest(errors.join("; ")))
    }
}

/// GET /api/v1/vehicles (Admin only)
async fn list_vehicles(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<VehicleListQuery>,
) -> Result<Json<VehiclesResponse>, ApiError> {
    let vehicle_type = query
        .vehicle_type
        .as_deref()
        .map(|s| {
            VehicleType::from_str(s)
                .map_err(|_| ApiError::BadRequest(format!("Invalid vehicle type: {}", s)))
        })
        .transpose()?;

    let vehicles = state
        .db
        .list_vehicles(VehicleQuery {
            vehicle_type,
            min_seats: query.min_seats,
            max_price: query.max_price,
            available: query.available,
            search: query.search,
        })
        .await?;

    Ok(Json(VehiclesResponse {
        count: vehicles.len(),
        vehicles,
    }))
}

/// POST /api/v1/vehicles (Admin only)
async fn create_vehicle(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(request): Json<NewVehicle>,
) -> Result<(StatusCode, Json<Vehicle>), ApiError> {
    validate_vehicle(&request)?;

    // License plates are stored uppercased
    let mut request = request;
    request.driver.license_number = request.driver.license_number.to_uppercase();

    debug!("Creating vehicle: {} {}", request.make, request.model);

    let vehicle = state.db.insert_vehicle(request).await?;

    info!("Created vehicle: {} {} ({})", vehicle.make, vehicle.model, vehicle.id);

    Ok((StatusCode::CREATED, Json(vehicle)))
}

/// GET /api/v1/vehicles/{id} (Admin only)
async fn get_vehicle(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vehicle>, ApiError> {
    let vehicle = state
        .db
        .get_vehicle_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Vehicle: {}", id)))?;

    Ok(Json(vehicle))
}

/// PUT /api/v1/vehicles/{id} (Admin only)
async fn update_vehicle(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateVehicle>,
) -> Result<Json<Vehicle>, ApiError> {
    let mut request = request;
    if let Some(driver) = &mut request.driver {
        driver.license_number = driver.license_number.to_uppercase();
    }

    let vehicle = state
        .db
        .update_vehicle(id, request)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Vehicle: {}", id)))?;

    info!("Updated vehicle: {}", vehicle.id);

    Ok(Json(vehicle))
}

/// PATCH /api/v1/vehicles/{id}/availability (Admin only)
async fn toggle_availability(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vehicle>, ApiError> {
    let vehicle = state
        .db
        .toggle_vehicle_availability(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Vehicle: {}", id)))?;

    info!(
        "Vehicle {} availability toggled to {}",
        vehicle.id, vehicle.is_available
    );

    Ok(Json(vehicle))
}

/// DELETE /api/v1/vehicles/{id} (Admin only)
async fn delete_vehicle(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = state.db.delete_vehicle(id).await?;

    if deleted {
        info!("Deleted vehicle: {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Vehicle: {}", id)))
    }
}

/// Create vehicle routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/vehicles", get(list_vehicles))
        .route("/api/v1/vehicles", post(create_vehicle))
        .route("/api/v1/vehicles/{id}", get(get_vehicle))
        .route("/api/v1/vehicles/{id}", put(update_vehicle))
        .route("/api/v1/vehicles/{id}", delete(delete_vehicle))
        .route("/api/v1/vehicles/{id}/availability", patch(toggle_availability))
}
