//! Vehicle operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{NewVehicle, UpdateVehicle, Vehicle, VehicleType};
use crate::repository::Database;

/// Query parameters for the vehicle fleet listing
#[derive(Debug, Clone, Default)]
pub struct VehicleQuery {
    /// Filter by vehicle type
    pub vehicle_type: Option<VehicleType>,
    /// Minimum seating capacity
    pub min_seats: Option<i64>,
    /// Maximum price per day
    pub max_price: Option<i64>,
    /// Filter by availability
    pub available: Option<bool>,
    /// Free-text search over description and driver name
    pub search: Option<String>,
}

impl Database {
    // ==================== Vehicle Operations ====================

    /// Insert a new vehicle
    pub async fn insert_vehicle(&self, vehicle: NewVehicle) -> Result<Vehicle, DbError> {
        let now = Utc::now();

        let features = serde_json::to_string(&vehicle.features)
            .map_err(|e| DbError::Migration(e.to_string()))?;
        let images = serde_json::to_string(&vehicle.images)
            .map_err(|e| DbError::Migration(e.to_string()))?;
        let driver = serde_json::to_string(&vehicle.driver)
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let result = sqlx::query(
            r#"
            INSERT INTO vehicles (
                make, model, year, vehicle_type, seating_capacity, features,
                description, images, is_available, base_price_per_day, driver,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&vehicle.make)
        .bind(&vehicle.model)
        .bind(vehicle.year)
        .bind(vehicle.vehicle_type.as_str())
        .bind(vehicle.seating_capacity)
        .bind(&features)
        .bind(&vehicle.description)
        .bind(&images)
        .bind(vehicle.is_available)
        .bind(vehicle.base_price_per_day)
        .bind(&driver)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = result.get("id");

        Ok(Vehicle {
            id,
            make: vehicle.make,
            model: vehicle.model,
            year: vehicle.year,
            vehicle_type: vehicle.vehicle_type,
            seating_capacity: vehicle.seating_capacity,
            features: vehicle.features,
            description: vehicle.description,
            images: vehicle.images,
            is_available: vehicle.is_available,
            base_price_per_day: vehicle.base_price_per_day,
            driver: vehicle.driver,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a vehicle by ID
    pub async fn get_vehicle_by_id(&self, id: i64) -> Result<Option<Vehicle>, DbError> {
        let result = sqlx::query("SELECT * FROM vehicles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        result
            .map(|row| Vehicle::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// List vehicles with filtering, newest first
    pub async fn list_vehicles(&self, query: VehicleQuery) -> Result<Vec<Vehicle>, DbError> {
        let mut conditions: Vec<String> = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(vehicle_type) = query.vehicle_type {
            conditions.push("vehicle_type = ?".to_string());
            params.push(vehicle_type.as_str().to_string());
        }
        if let Some(min_seats) = query.min_seats {
            conditions.push("seating_capacity >= ?".to_string());
            params.push(min_seats.to_string());
        }
        if let Some(max_price) = query.max_price {
            conditions.push("base_price_per_day <= ?".to_string());
            params.push(max_price.to_string());
        }
        if let Some(available) = query.available {
            conditions.push("is_available = ?".to_string());
            params.push(if available { "1" } else { "0" }.to_string());
        }
        if let Some(search) = &query.search {
            conditions.push("(description LIKE ? OR driver LIKE ?)".to_string());
            let pattern = format!("%{}%", search);
            params.push(pattern.clone());
            params.push(pattern);
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            "SELECT * FROM vehicles {} ORDER BY created_at DESC",
            where_clause
        );

        let mut rows_query = sqlx::query(&sql);
        for param in &params {
            rows_query = rows_query.bind(param);
        }

        let rows = rows_query.fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| Vehicle::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Apply a partial update to a vehicle
    pub async fn update_vehicle(
        &self,
        id: i64,
        update: UpdateVehicle,
    ) -> Result<Option<Vehicle>, DbError> {
        let Some(mut vehicle) = self.get_vehicle_by_id(id).await? else {
            return Ok(None);
        };

        if let Some(make) = update.make {
            vehicle.make = make;
        }
        if let Some(model) = update.model {
            vehicle.model = model;
        }
        if let Some(year) = update.year {
            vehicle.year = year;
        }
        if let Some(vehicle_type) = update.vehicle_type {
            vehicle.vehicle_type = vehicle_type;
        }
        if let Some(capacity) = update.seating_capacity {
            vehicle.seating_capacity = capacity;
        }
        if let Some(features) = update.features {
            vehicle.features = features;
        }
        if let Some(description) = update.description {
            vehicle.description = description;
        }
        if let Some(images) = update.images {
            vehicle.images = images;
        }
        if let Some(available) = update.is_available {
            vehicle.is_available = available;
        }
        if let Some(price) = update.base_price_per_day {
            vehicle.base_price_per_day = price;
        }
        if let Some(driver) = update.driver {
            vehicle.driver = driver;
        }
        vehicle.updated_at = Utc::now();

        let features = serde_json::to_string(&vehicle.features)
            .map_err(|e| DbError::Migration(e.to_string()))?;
        let images = serde_json::to_string(&vehicle.images)
            .map_err(|e| DbError::Migration(e.to_string()))?;
        let driver = serde_json::to_string(&vehicle.driver)
            .map_err(|e| DbError::Migration(e.to_string()))?;

        sqlx::query(
            r#"
            UPDATE vehicles SET
                make = ?, model = ?, year = ?, vehicle_type = ?, seating_capacity = ?,
                features = ?, description = ?, images = ?, is_available = ?,
                base_price_per_day = ?, driver = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&vehicle.make)
        .bind(&vehicle.model)
        .bind(vehicle.year)
        .bind(vehicle.vehicle_type.as_str())
        .bind(vehicle.seating_capacity)
        .bind(&features)
        .bind(&vehicle.description)
        .bind(&images)
        .bind(vehicle.is_available)
        .bind(vehicle.base_price_per_day)
        .bind(&driver)
        .bind(vehicle.updated_at.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Some(vehicle))
    }

    /// Flip a vehicle's availability flag
    pub async fn toggle_vehicle_availability(&self, id: i64) -> Result<Option<Vehicle>, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE vehicles
            SET is_available = NOT is_available, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_vehicle_by_id(id).await
    }

    /// Delete a vehicle
    pub async fn delete_vehicle(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
