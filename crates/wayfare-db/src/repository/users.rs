//! User operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{NewUser, Passenger, User, UserRole};
use crate::repository::Database;

impl Database {
    // ==================== User Operations ====================

    /// Insert a new user
    ///
    /// Uniqueness of email and phone is enforced by the table constraints;
    /// a violation surfaces as `DbError::Duplicate`.
    pub async fn insert_user(&self, user: NewUser) -> Result<User, DbError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, phone, country, password_hash, role, saved_passengers, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, '[]', 1, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.country)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::from_sqlx(e, "user with this email or phone already exists"))?;

        let id: i64 = result.get("id");

        Ok(User {
            id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            country: user.country,
            password_hash: user.password_hash,
            role: user.role,
            saved_passengers: vec![],
            is_active: true,
            last_login_at: None,
            email_verified_at: None,
            phone_verified_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a user by email (exact, case-sensitive match)
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT * FROM users WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Get a user by ID
    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT * FROM users WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// List users, newest first
    pub async fn list_users(&self, page: i64, limit: i64) -> Result<(Vec<User>, i64), DbError> {
        let offset = (page.max(1) - 1) * limit;

        let count_row = sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(&self.pool)
            .await?;
        let total: i64 = count_row.get("count");

        let rows = sqlx::query(
            r#"
            SELECT * FROM users
            ORDER BY created_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let users: Result<Vec<User>, _> = rows
            .iter()
            .map(|row| User::try_from(row).map_err(DbError::from))
            .collect();

        Ok((users?, total))
    }

    /// Get all users with a given role
    pub async fn get_users_by_role(&self, role: UserRole) -> Result<Vec<User>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM users WHERE role = ? ORDER BY created_at DESC
            "#,
        )
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| User::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Record a successful login
    pub async fn update_last_login(&self, id: i64) -> Result<(), DbError> {
        let now = Utc::now();
        sqlx::query("UPDATE users SET last_login_at = ?, updated_at = ? WHERE id = ?")
            .bind(now.to_rfc3339())
            .bind(now.to_rfc3339())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Append a saved passenger to a user's profile
    ///
    /// Returns the updated user, or `None` if the user does not exist.
    pub async fn add_saved_passenger(
        &self,
        id: i64,
        passenger: Passenger,
    ) -> Result<Option<User>, DbError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT saved_passengers FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let json: String = row.get("saved_passengers");
        let mut passengers: Vec<Passenger> = serde_json::from_str(&json).unwrap_or_default();
        passengers.push(passenger);

        let encoded = serde_json::to_string(&passengers)
            .map_err(|e| DbError::Migration(e.to_string()))?;
        sqlx::query("UPDATE users SET saved_passengers = ?, updated_at = ? WHERE id = ?")
            .bind(&encoded)
            .bind(Utc::now().to_rfc3339())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_user_by_id(id).await
    }

    /// Remove a saved passenger by position
    ///
    /// An out-of-range index leaves the list unchanged, matching the
    /// behavior of the admin clients that retry on stale indexes.
    pub async fn remove_saved_passenger(
        &self,
        id: i64,
        index: usize,
    ) -> Result<Option<User>, DbError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT saved_passengers FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let json: String = row.get("saved_passengers");
        let mut passengers: Vec<Passenger> = serde_json::from_str(&json).unwrap_or_default();
        if index < passengers.len() {
            passengers.remove(index);
        }

        let encoded = serde_json::to_string(&passengers)
            .map_err(|e| DbError::Migration(e.to_string()))?;
        sqlx::query("UPDATE users SET saved_passengers = ?, updated_at = ? WHERE id = ?")
            .bind(&encoded)
            .bind(Utc::now().to_rfc3339())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_user_by_id(id).await
    }

    /// Check if any users exist
    pub async fn has_users(&self) -> Result<bool, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = result.get("count");
        Ok(count > 0)
    }

    /// Total number of users
    pub async fn count_users(&self) -> Result<i64, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(result.get("count"))
    }

    /// Number of active users
    pub async fn count_active_users(&self) -> Result<i64, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM users WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(result.get("count"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(email: &str, phone: &str) -> NewUser {
        NewUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            country: "IN".to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
            role: UserRole::User,
        }
    }

    async fn test_db() -> Database {
        Database::new("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_fetch_user() {
        let db = test_db().await;

        let user = db.insert_user(sample_user("a@x.com", "111")).await.unwrap();
        assert_eq!(user.role, UserRole::User);
        assert!(user.is_active);

        let by_email = db.get_user_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);

        // Lookup is case-sensitive
        assert!(db.get_user_by_email("A@X.COM").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_or_phone_rejected() {
        let db = test_db().await;
        db.insert_user(sample_user("a@x.com", "111")).await.unwrap();

        // Same email, different phone
        let err = db.insert_user(sample_user("a@x.com", "222")).await.unwrap_err();
        assert!(matches!(err, DbError::Duplicate(_)));

        // Same phone, different email
        let err = db.insert_user(sample_user("b@x.com", "111")).await.unwrap_err();
        assert!(matches!(err, DbError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_saved_passengers_lifecycle() {
        let db = test_db().await;
        let user = db.insert_user(sample_user("a@x.com", "111")).await.unwrap();

        let passenger = Passenger {
            name: "Ravi".to_string(),
            age: 34,
            passport: None,
        };
        let updated = db
            .add_saved_passenger(user.id, passenger.clone())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.saved_passengers, vec![passenger]);

        // Out-of-range removal is a no-op
        let updated = db.remove_saved_passenger(user.id, 5).await.unwrap().unwrap();
        assert_eq!(updated.saved_passengers.len(), 1);

        let updated = db.remove_saved_passenger(user.id, 0).await.unwrap().unwrap();
        assert!(updated.saved_passengers.is_empty());

        // Unknown user
        assert!(db.remove_saved_passenger(9999, 0).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_users_by_role() {
        let db = test_db().await;
        db.insert_user(sample_user("a@x.com", "111")).await.unwrap();
        let mut admin = sample_user("b@x.com", "222");
        admin.role = UserRole::Admin;
        db.insert_user(admin).await.unwrap();

        let admins = db.get_users_by_role(UserRole::Admin).await.unwrap();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].email, "b@x.com");
    }
}
