//! Booking operations

use chrono::Utc;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::error::DbError;
use crate::models::{
    Booking, BookingDetails, BookingPackage, BookingStatus, BookingUser, NewBooking,
    PaymentStatus, UpdateBooking,
};
use crate::repository::Database;
use crate::utils::parse_json_or_default;

/// Query parameters for the admin booking listing
#[derive(Debug, Clone, Default)]
pub struct BookingQuery {
    /// Filter by workflow status
    pub status: Option<BookingStatus>,
    /// Page number (1-based)
    pub page: i64,
    /// Page size
    pub limit: i64,
}

/// Columns selected for a booking with its joined user and package summaries
const DETAILS_SELECT: &str = r#"
    SELECT b.*,
           u.id AS joined_user_id, u.name AS user_name,
           u.email AS user_email, u.phone AS user_phone,
           p.id AS joined_package_id, p.title AS package_title,
           p.slug AS package_slug, p.base_price_per_pax AS package_price,
           p.images AS package_images
    FROM bookings b
    LEFT JOIN users u ON u.id = b.user_id
    LEFT JOIN packages p ON p.id = b.package_id
"#;

/// Build a `BookingDetails` from a joined row
fn details_from_row(row: &SqliteRow) -> Result<BookingDetails, DbError> {
    let booking = Booking::try_from(row).map_err(DbError::from)?;

    let user = row
        .try_get::<Option<i64>, _>("joined_user_id")
        .ok()
        .flatten()
        .map(|id| -> Result<BookingUser, sqlx::Error> {
            Ok(BookingUser {
                id,
                name: row.try_get("user_name")?,
                email: row.try_get("user_email")?,
                phone: row.try_get("user_phone")?,
            })
        })
        .transpose()
        .map_err(DbError::from)?;

    let package = row
        .try_get::<Option<i64>, _>("joined_package_id")
        .ok()
        .flatten()
        .map(|id| -> Result<BookingPackage, sqlx::Error> {
            Ok(BookingPackage {
                id,
                title: row.try_get("package_title")?,
                slug: row.try_get("package_slug")?,
                base_price_per_pax: row.try_get("package_price")?,
                images: parse_json_or_default(&row.try_get::<String, _>("package_images")?),
            })
        })
        .transpose()
        .map_err(DbError::from)?;

    Ok(BookingDetails {
        booking,
        user,
        package,
    })
}

impl Database {
    // ==================== Booking Operations ====================

    /// Insert a new booking
    pub async fn insert_booking(&self, booking: NewBooking) -> Result<Booking, DbError> {
        let now = Utc::now();

        let passengers = serde_json::to_string(&booking.passengers)
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let result = sqlx::query(
            r#"
            INSERT INTO bookings (
                user_id, package_id, passengers, total_amount, status,
                payment_status, booking_date, travel_date, special_requests,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, 'pending', 'pending', ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(booking.user_id)
        .bind(booking.package_id)
        .bind(&passengers)
        .bind(booking.total_amount)
        .bind(booking.booking_date.to_rfc3339())
        .bind(booking.travel_date.to_rfc3339())
        .bind(&booking.special_requests)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = result.get("id");

        Ok(Booking {
            id,
            user_id: booking.user_id,
            package_id: booking.package_id,
            passengers: booking.passengers,
            total_amount: booking.total_amount,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            booking_date: booking.booking_date,
            travel_date: booking.travel_date,
            special_requests: booking.special_requests,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a booking by ID (no joins)
    pub async fn get_booking_by_id(&self, id: i64) -> Result<Option<Booking>, DbError> {
        let result = sqlx::query("SELECT * FROM bookings WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        result
            .map(|row| Booking::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// Get a booking with its user and package summaries
    pub async fn get_booking_details(&self, id: i64) -> Result<Option<BookingDetails>, DbError> {
        let sql = format!("{} WHERE b.id = ?", DETAILS_SELECT);
        let result = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;

        result.map(|row| details_from_row(&row)).transpose()
    }

    /// List a user's own bookings, newest first
    pub async fn list_bookings_for_user(
        &self,
        user_id: i64,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<BookingDetails>, i64), DbError> {
        let offset = (page.max(1) - 1) * limit;

        let count_row = sqlx::query("SELECT COUNT(*) as count FROM bookings WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        let total: i64 = count_row.get("count");

        let sql = format!(
            "{} WHERE b.user_id = ? ORDER BY b.created_at DESC LIMIT ? OFFSET ?",
            DETAILS_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let bookings: Result<Vec<BookingDetails>, _> =
            rows.iter().map(details_from_row).collect();

        Ok((bookings?, total))
    }

    /// List all bookings for the admin portal with optional status filter
    pub async fn list_bookings(
        &self,
        query: BookingQuery,
    ) -> Result<(Vec<BookingDetails>, i64), DbError> {
        let offset = (query.page.max(1) - 1) * query.limit;

        let (where_clause, status_param) = match query.status {
            Some(status) => ("WHERE b.status = ?", Some(status.as_str().to_string())),
            None => ("", None),
        };

        let count_sql = format!(
            "SELECT COUNT(*) as count FROM bookings b {}",
            where_clause
        );
        let mut count_query = sqlx::query(&count_sql);
        if let Some(status) = &status_param {
            count_query = count_query.bind(status);
        }
        let count_row = count_query.fetch_one(&self.pool).await?;
        let total: i64 = count_row.get("count");

        let sql = format!(
            "{} {} ORDER BY b.created_at DESC LIMIT ? OFFSET ?",
            DETAILS_SELECT, where_clause
        );
        let mut rows_query = sqlx::query(&sql);
        if let Some(status) = &status_param {
            rows_query = rows_query.bind(status);
        }
        rows_query = rows_query.bind(query.limit).bind(offset);

        let rows = rows_query.fetch_all(&self.pool).await?;
        let bookings: Result<Vec<BookingDetails>, _> =
            rows.iter().map(details_from_row).collect();

        Ok((bookings?, total))
    }

    /// Most recent bookings for the admin dashboard
    pub async fn recent_bookings(&self, limit: i64) -> Result<Vec<BookingDetails>, DbError> {
        let sql = format!("{} ORDER BY b.created_at DESC LIMIT ?", DETAILS_SELECT);
        let rows = sqlx::query(&sql).bind(limit).fetch_all(&self.pool).await?;

        rows.iter().map(details_from_row).collect()
    }

    /// Apply a partial update to a booking
    pub async fn update_booking(
        &self,
        id: i64,
        update: UpdateBooking,
    ) -> Result<Option<Booking>, DbError> {
        let Some(mut booking) = self.get_booking_by_id(id).await? else {
            return Ok(None);
        };

        if let Some(status) = update.status {
            booking.status = status;
        }
        if let Some(payment_status) = update.payment_status {
            booking.payment_status = payment_status;
        }
        if let Some(travel_date) = update.travel_date {
            booking.travel_date = travel_date;
        }
        if let Some(special_requests) = update.special_requests {
            booking.special_requests = Some(special_requests);
        }
        booking.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE bookings SET
                status = ?, payment_status = ?, travel_date = ?,
                special_requests = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(booking.status.as_str())
        .bind(booking.payment_status.as_str())
        .bind(booking.travel_date.to_rfc3339())
        .bind(&booking.special_requests)
        .bind(booking.updated_at.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Some(booking))
    }

    /// Delete a booking
    pub async fn delete_booking(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Total number of bookings
    pub async fn count_bookings(&self) -> Result<i64, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM bookings")
            .fetch_one(&self.pool)
            .await?;
        Ok(result.get("count"))
    }

    /// Number of bookings in a given status
    pub async fn count_bookings_by_status(&self, status: BookingStatus) -> Result<i64, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM bookings WHERE status = ?")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(result.get("count"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewTourPackage, NewUser, Passenger, Region, UserRole};

    async fn test_db() -> Database {
        Database::new("sqlite::memory:").await.unwrap()
    }

    async fn seed_user(db: &Database) -> i64 {
        db.insert_user(NewUser {
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            phone: "+1555".to_string(),
            country: "US".to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
            role: UserRole::User,
        })
        .await
        .unwrap()
        .id
    }

    async fn seed_package(db: &Database) -> i64 {
        db.insert_package(NewTourPackage {
            title: "Backwaters".to_string(),
            slug: "backwaters".to_string(),
            short_desc: "Short".to_string(),
            long_desc: "Long".to_string(),
            itinerary: vec![],
            min_pax: 1,
            max_pax: 10,
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
        .unwrap()
        .id
    }

    fn new_booking(user_id: i64, package_id: i64) -> NewBooking {
        NewBooking {
            user_id,
            package_id,
            passengers: vec![Passenger {
                name: "Ann".to_string(),
                age: 30,
                passport: None,
            }],
            total_amount: 1500,
            booking_date: Utc::now(),
            travel_date: Utc::now(),
            special_requests: None,
        }
    }

    #[tokio::test]
    async fn test_booking_details_join() {
        let db = test_db().await;
        let user_id = seed_user(&db).await;
        let package_id = seed_package(&db).await;

        let booking = db.insert_booking(new_booking(user_id, package_id)).await.unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);

        let details = db.get_booking_details(booking.id).await.unwrap().unwrap();
        assert_eq!(details.user.as_ref().unwrap().email, "ann@x.com");
        assert_eq!(details.package.as_ref().unwrap().slug, "backwaters");
    }

    #[tokio::test]
    async fn test_booking_join_survives_deleted_package() {
        let db = test_db().await;
        let user_id = seed_user(&db).await;
        let package_id = seed_package(&db).await;
        let booking = db.insert_booking(new_booking(user_id, package_id)).await.unwrap();

        db.delete_package(package_id).await.unwrap();

        let details = db.get_booking_details(booking.id).await.unwrap().unwrap();
        assert!(details.package.is_none());
        assert!(details.user.is_some());
    }

    #[tokio::test]
    async fn test_status_filter_and_counts() {
        let db = test_db().await;
        let user_id = seed_user(&db).await;
        let package_id = seed_package(&db).await;

        let first = db.insert_booking(new_booking(user_id, package_id)).await.unwrap();
        db.insert_booking(new_booking(user_id, package_id)).await.unwrap();

        db.update_booking(
            first.id,
            UpdateBooking {
                status: Some(BookingStatus::Approved),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let (approved, total) = db
            .list_bookings(BookingQuery {
                status: Some(BookingStatus::Approved),
                page: 1,
                limit: 10,
            })
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(approved[0].booking.id, first.id);

        assert_eq!(db.count_bookings().await.unwrap(), 2);
        assert_eq!(
            db.count_bookings_by_status(BookingStatus::Pending).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_user_scoped_listing() {
        let db = test_db().await;
        let user_id = seed_user(&db).await;
        let other_id = db
            .insert_user(NewUser {
                name: "Bob".to_string(),
                email: "bob@x.com".to_string(),
                phone: "+1666".to_string(),
                country: "US".to_string(),
                password_hash: "$argon2id$placeholder".to_string(),
                role: UserRole::User,
            })
            .await
            .unwrap()
            .id;
        let package_id = seed_package(&db).await;

        db.insert_booking(new_booking(user_id, package_id)).await.unwrap();
        db.insert_booking(new_booking(other_id, package_id)).await.unwrap();

        let (own, total) = db.list_bookings_for_user(user_id, 1, 10).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(own[0].booking.user_id, user_id);
    }
}
