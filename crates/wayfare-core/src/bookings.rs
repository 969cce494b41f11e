//! Booking creation and pricing

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use wayfare_db::{Booking, Database, NewBooking, Passenger};

use crate::error::CoreError;

/// Booking request data
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingData {
    pub package_id: i64,
    pub passengers: Vec<Passenger>,
    pub travel_date: DateTime<Utc>,
    #[serde(default)]
    pub special_requests: Option<String>,
}

/// Booking service
#[derive(Clone)]
pub struct BookingService {
    db: Database,
}

impl BookingService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a booking for a customer
    ///
    /// The total is priced from the live package record
    /// (`passengers × base_price_per_pax`); the group size must fit the
    /// package's pax bounds. The package booking counter is bumped as a
    /// side effect.
    pub async fn create_booking(
        &self,
        user_id: i64,
        data: CreateBookingData,
    ) -> Result<Booking, CoreError> {
        if data.passengers.is_empty() {
            return Err(CoreError::Validation(
                "At least one passenger is required".to_string(),
            ));
        }

        let package = self
            .db
            .get_package_by_id(data.package_id)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| CoreError::NotFound(format!("Package: {}", data.package_id)))?;

        let pax = data.passengers.len() as i64;
        if pax < package.min_pax || pax > package.max_pax {
            return Err(CoreError::Validation(format!(
                "Package '{}' takes groups of {} to {} passengers",
                package.slug, package.min_pax, package.max_pax
            )));
        }

        let total_amount = pax * package.base_price_per_pax;

        let booking = self
            .db
            .insert_booking(NewBooking {
                user_id,
                package_id: package.id,
                passengers: data.passengers,
                total_amount,
                booking_date: Utc::now(),
                travel_date: data.travel_date,
                special_requests: data.special_requests,
            })
            .await?;

        self.db.increment_package_bookings(package.id).await?;

        info!(
            "Booking {} created for user {} on package {}",
            booking.id, user_id, package.slug
        );

        Ok(booking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfare_db::{NewTourPackage, NewUser, Region, UserRole};

    async fn test_db() -> Database {
        Database::new("sqlite::memory:").await.unwrap()
    }

    async fn seed(db: &Database) -> (i64, i64) {
        let user = db
            .insert_user(NewUser {
                name: "Ann".to_string(),
                email: "ann@x.com".to_string(),
                phone: "+1555".to_string(),
                country: "US".to_string(),
                password_hash: "$argon2id$placeholder".to_string(),
                role: UserRole::User,
            })
            .await
            .unwrap();

        let pkg = db
            .insert_package(NewTourPackage {
                title: "Backwaters".to_string(),
                slug: "backwaters".to_string(),
                short_desc: "Short".to_string(),
                long_desc: "Long".to_string(),
                itinerary: vec![],
                min_pax: 2,
                max_pax: 4,
                base_price_per_pax: 1500,
                images: vec![],
                region: Region::Kerala,
                tags: vec![],
                featured: false,
                inclusions: vec![],
                exclusions: vec![],
                cancellation_policy: None,
                terms_and_conditions: None,
                commission_override: None,
                is_active: true,
            })
            .await
            .unwrap();

        (user.id, pkg.id)
    }

    fn passengers(n: usize) -> Vec<Passenger> {
        (0..n)
            .map(|i| Passenger {
                name: format!("P{}", i),
                age: 30,
                passport: None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_booking_priced_from_package() {
        let db = test_db().await;
        let (user_id, package_id) = seed(&db).await;
        let service = BookingService::new(db.clone());

        let booking = service
            .create_booking(
                user_id,
                CreateBookingData {
                    package_id,
                    passengers: passengers(3),
                    travel_date: Utc::now(),
                    special_requests: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(booking.total_amount, 3 * 1500);

        let pkg = db.get_package_by_id(package_id).await.unwrap().unwrap();
        assert_eq!(pkg.booking_count, 1);
    }

    #[tokio::test]
    async fn test_group_size_bounds() {
        let db = test_db().await;
        let (user_id, package_id) = seed(&db).await;
        let service = BookingService::new(db);

        // Below min_pax
        let err = service
            .create_booking(
                user_id,
                CreateBookingData {
                    package_id,
                    passengers: passengers(1),
                    travel_date: Utc::now(),
                    special_requests: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        // Above max_pax
        let err = service
            .create_booking(
                user_id,
                CreateBookingData {
                    package_id,
                    passengers: passengers(5),
                    travel_date: Utc::now(),
                    special_requests: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unknown_package() {
        let db = test_db().await;
        let (user_id, _) = seed(&db).await;
        let service = BookingService::new(db);

        let err = service
            .create_booking(
                user_id,
                CreateBookingData {
                    package_id: 9999,
                    passengers: passengers(2),
                    travel_date: Utc::now(),
                    special_requests: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }
}
