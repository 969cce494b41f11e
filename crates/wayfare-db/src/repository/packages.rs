//! Tour package operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{NewTourPackage, Region, TourPackage, UpdateTourPackage};
use crate::repository::Database;

/// Query parameters for the public package catalog
#[derive(Debug, Clone, Default)]
pub struct PackageQuery {
    /// Filter by region
    pub region: Option<Region>,
    /// Minimum price per passenger
    pub min_price: Option<i64>,
    /// Maximum price per passenger
    pub max_price: Option<i64>,
    /// Group size the package must accommodate
    pub min_pax: Option<i64>,
    /// Filter by featured flag
    pub featured: Option<bool>,
    /// Free-text search over title and descriptions
    pub search: Option<String>,
    /// Page number (1-based)
    pub page: i64,
    /// Page size
    pub limit: i64,
}

impl Database {
    // ==================== Package Operations ====================

    /// Insert a new package
    ///
    /// The slug is unique; a collision surfaces as `DbError::Duplicate`.
    pub async fn insert_package(&self, pkg: NewTourPackage) -> Result<TourPackage, DbError> {
        let now = Utc::now();

        let itinerary = serde_json::to_string(&pkg.itinerary)
            .map_err(|e| DbError::Migration(e.to_string()))?;
        let images = serde_json::to_string(&pkg.images)
            .map_err(|e| DbError::Migration(e.to_string()))?;
        let tags =
            serde_json::to_string(&pkg.tags).map_err(|e| DbError::Migration(e.to_string()))?;
        let inclusions = serde_json::to_string(&pkg.inclusions)
            .map_err(|e| DbError::Migration(e.to_string()))?;
        let exclusions = serde_json::to_string(&pkg.exclusions)
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let result = sqlx::query(
            r#"
            INSERT INTO packages (
                title, slug, short_desc, long_desc, itinerary, min_pax, max_pax,
                base_price_per_pax, images, region, tags, featured, inclusions,
                exclusions, cancellation_policy, terms_and_conditions,
                commission_override, is_active, view_count, booking_count,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, 0, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&pkg.title)
        .bind(&pkg.slug)
        .bind(&pkg.short_desc)
        .bind(&pkg.long_desc)
        .bind(&itinerary)
        .bind(pkg.min_pax)
        .bind(pkg.max_pax)
        .bind(pkg.base_price_per_pax)
        .bind(&images)
        .bind(pkg.region.as_str())
        .bind(&tags)
        .bind(pkg.featured)
        .bind(&inclusions)
        .bind(&exclusions)
        .bind(&pkg.cancellation_policy)
        .bind(&pkg.terms_and_conditions)
        .bind(pkg.commission_override)
        .bind(pkg.is_active)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::from_sqlx(e, "package with this slug already exists"))?;

        let id: i64 = result.get("id");

        Ok(TourPackage {
            id,
            title: pkg.title,
            slug: pkg.slug,
            short_desc: pkg.short_desc,
            long_desc: pkg.long_desc,
            itinerary: pkg.itinerary,
            min_pax: pkg.min_pax,
            max_pax: pkg.max_pax,
            base_price_per_pax: pkg.base_price_per_pax,
            images: pkg.images,
            region: pkg.region,
            tags: pkg.tags,
            featured: pkg.featured,
            inclusions: pkg.inclusions,
            exclusions: pkg.exclusions,
            cancellation_policy: pkg.cancellation_policy,
            terms_and_conditions: pkg.terms_and_conditions,
            commission_override: pkg.commission_override,
            is_active: pkg.is_active,
            view_count: 0,
            booking_count: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a package by ID (admin view, active or not)
    pub async fn get_package_by_id(&self, id: i64) -> Result<Option<TourPackage>, DbError> {
        let result = sqlx::query("SELECT * FROM packages WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        result
            .map(|row| TourPackage::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// Get an active package by slug
    pub async fn get_package_by_slug(&self, slug: &str) -> Result<Option<TourPackage>, DbError> {
        let result = sqlx::query("SELECT * FROM packages WHERE slug = ? AND is_active = 1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        result
            .map(|row| TourPackage::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// Increment the view counter for a package
    pub async fn increment_package_views(&self, id: i64) -> Result<(), DbError> {
        sqlx::query("UPDATE packages SET view_count = view_count + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Increment the booking counter for a package
    pub async fn increment_package_bookings(&self, id: i64) -> Result<(), DbError> {
        sqlx::query("UPDATE packages SET booking_count = booking_count + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// List active packages with filtering and pagination
    pub async fn list_packages(
        &self,
        query: PackageQuery,
    ) -> Result<(Vec<TourPackage>, i64), DbError> {
        let mut conditions = vec!["is_active = 1".to_string()];
        let mut params: Vec<String> = Vec::new();

        if let Some(region) = query.region {
            conditions.push("region = ?".to_string());
            params.push(region.as_str().to_string());
        }
        if let Some(min_price) = query.min_price {
            conditions.push("base_price_per_pax >= ?".to_string());
            params.push(min_price.to_string());
        }
        if let Some(max_price) = query.max_price {
            conditions.push("base_price_per_pax <= ?".to_string());
            params.push(max_price.to_string());
        }
        if let Some(min_pax) = query.min_pax {
            // Package must accept groups at least this small
            conditions.push("min_pax <= ?".to_string());
            params.push(min_pax.to_string());
        }
        if let Some(featured) = query.featured {
            conditions.push("featured = ?".to_string());
            params.push(if featured { "1" } else { "0" }.to_string());
        }
        if let Some(search) = &query.search {
            conditions.push(
                "(title LIKE ? OR short_desc LIKE ? OR long_desc LIKE ?)".to_string(),
            );
            let pattern = format!("%{}%", search);
            params.push(pattern.clone());
            params.push(pattern.clone());
            params.push(pattern);
        }

        let where_clause = format!("WHERE {}", conditions.join(" AND "));

        let count_sql = format!("SELECT COUNT(*) as count FROM packages {}", where_clause);
        let mut count_query = sqlx::query(&count_sql);
        for param in &params {
            count_query = count_query.bind(param);
        }
        let count_row = count_query.fetch_one(&self.pool).await?;
        let total: i64 = count_row.get("count");

        // Featured listings float featured packages first
        let order = if query.featured == Some(true) {
            "ORDER BY featured DESC, created_at DESC"
        } else {
            "ORDER BY created_at DESC"
        };

        let sql = format!(
            "SELECT * FROM packages {} {} LIMIT ? OFFSET ?",
            where_clause, order
        );
        let offset = (query.page.max(1) - 1) * query.limit;

        let mut rows_query = sqlx::query(&sql);
        for param in &params {
            rows_query = rows_query.bind(param);
        }
        rows_query = rows_query.bind(query.limit).bind(offset);

        let rows = rows_query.fetch_all(&self.pool).await?;
        let packages: Result<Vec<TourPackage>, _> = rows
            .iter()
            .map(|row| TourPackage::try_from(row).map_err(DbError::from))
            .collect();

        Ok((packages?, total))
    }

    /// List all packages for the admin portal, newest first
    pub async fn list_packages_admin(
        &self,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<TourPackage>, i64), DbError> {
        let offset = (page.max(1) - 1) * limit;

        let count_row = sqlx::query("SELECT COUNT(*) as count FROM packages")
            .fetch_one(&self.pool)
            .await?;
        let total: i64 = count_row.get("count");

        let rows = sqlx::query("SELECT * FROM packages ORDER BY created_at DESC LIMIT ? OFFSET ?")
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let packages: Result<Vec<TourPackage>, _> = rows
            .iter()
            .map(|row| TourPackage::try_from(row).map_err(DbError::from))
            .collect();

        Ok((packages?, total))
    }

    /// Featured active packages for the landing page
    pub async fn featured_packages(&self, limit: i64) -> Result<Vec<TourPackage>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM packages
            WHERE featured = 1 AND is_active = 1
            ORDER BY created_at DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| TourPackage::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Active packages for a region
    pub async fn packages_by_region(
        &self,
        region: Region,
        limit: i64,
    ) -> Result<Vec<TourPackage>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM packages
            WHERE region = ? AND is_active = 1
            ORDER BY created_at DESC
            LIMIT ?
            "#,
        )
        .bind(region.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| TourPackage::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Apply a partial update to a package
    ///
    /// Returns the updated package, or `None` if it does not exist.
    pub async fn update_package(
        &self,
        id: i64,
        update: UpdateTourPackage,
    ) -> Result<Option<TourPackage>, DbError> {
        let Some(mut pkg) = self.get_package_by_id(id).await? else {
            return Ok(None);
        };

        if let Some(title) = update.title {
            pkg.title = title;
        }
        if let Some(slug) = update.slug {
            pkg.slug = slug;
        }
        if let Some(short_desc) = update.short_desc {
            pkg.short_desc = short_desc;
        }
        if let Some(long_desc) = update.long_desc {
            pkg.long_desc = long_desc;
        }
        if let Some(itinerary) = update.itinerary {
            pkg.itinerary = itinerary;
        }
        if let Some(min_pax) = update.min_pax {
            pkg.min_pax = min_pax;
        }
        if let Some(max_pax) = update.max_pax {
            pkg.max_pax = max_pax;
        }
        if let Some(price) = update.base_price_per_pax {
            pkg.base_price_per_pax = price;
        }
        if let Some(images) = update.images {
            pkg.images = images;
        }
        if let Some(region) = update.region {
            pkg.region = region;
        }
        if let Some(tags) = update.tags {
            pkg.tags = tags;
        }
        if let Some(featured) = update.featured {
            pkg.featured = featured;
        }
        if let Some(inclusions) = update.inclusions {
            pkg.inclusions = inclusions;
        }
        if let Some(exclusions) = update.exclusions {
            pkg.exclusions = exclusions;
        }
        if let Some(policy) = update.cancellation_policy {
            pkg.cancellation_policy = Some(policy);
        }
        if let Some(terms) = update.terms_and_conditions {
            pkg.terms_and_conditions = Some(terms);
        }
        if let Some(commission) = update.commission_override {
            pkg.commission_override = Some(commission);
        }
        if let Some(is_active) = update.is_active {
            pkg.is_active = is_active;
        }
        pkg.updated_at = Utc::now();

        let itinerary = serde_json::to_string(&pkg.itinerary)
            .map_err(|e| DbError::Migration(e.to_string()))?;
        let images = serde_json::to_string(&pkg.images)
            .map_err(|e| DbError::Migration(e.to_string()))?;
        let tags =
            serde_json::to_string(&pkg.tags).map_err(|e| DbError::Migration(e.to_string()))?;
        let inclusions = serde_json::to_string(&pkg.inclusions)
            .map_err(|e| DbError::Migration(e.to_string()))?;
        let exclusions = serde_json::to_string(&pkg.exclusions)
            .map_err(|e| DbError::Migration(e.to_string()))?;

        sqlx::query(
            r#"
            UPDATE packages SET
                title = ?, slug = ?, short_desc = ?, long_desc = ?, itinerary = ?,
                min_pax = ?, max_pax = ?, base_price_per_pax = ?, images = ?,
                region = ?, tags = ?, featured = ?, inclusions = ?, exclusions = ?,
                cancellation_policy = ?, terms_and_conditions = ?,
                commission_override = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&pkg.title)
        .bind(&pkg.slug)
        .bind(&pkg.short_desc)
        .bind(&pkg.long_desc)
        .bind(&itinerary)
        .bind(pkg.min_pax)
        .bind(pkg.max_pax)
        .bind(pkg.base_price_per_pax)
        .bind(&images)
        .bind(pkg.region.as_str())
        .bind(&tags)
        .bind(pkg.featured)
        .bind(&inclusions)
        .bind(&exclusions)
        .bind(&pkg.cancellation_policy)
        .bind(&pkg.terms_and_conditions)
        .bind(pkg.commission_override)
        .bind(pkg.is_active)
        .bind(pkg.updated_at.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from_sqlx(e, "package with this slug already exists"))?;

        Ok(Some(pkg))
    }

    /// Delete a package
    pub async fn delete_package(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM packages WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Total number of packages
    pub async fn count_packages(&self) -> Result<i64, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM packages")
            .fetch_one(&self.pool)
            .await?;
        Ok(result.get("count"))
    }

    /// Number of featured active packages
    pub async fn count_featured_packages(&self) -> Result<i64, DbError> {
        let result =
            sqlx::query("SELECT COUNT(*) as count FROM packages WHERE featured = 1 AND is_active = 1")
                .fetch_one(&self.pool)
                .await?;
        Ok(result.get("count"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_package(slug: &str, region: Region, price: i64, featured: bool) -> NewTourPackage {
        NewTourPackage {
            title: format!("Tour {}", slug),
            slug: slug.to_string(),
            short_desc: "Short".to_string(),
            long_desc: "A longer description of the tour".to_string(),
            itinerary: vec![],
            min_pax: 2,
            max_pax: 10,
            base_price_per_pax: price,
            images: vec![],
            region,
            tags: vec![],
            featured,
            inclusions: vec![],
            exclusions: vec![],
            cancellation_policy: None,
            terms_and_conditions: None,
            commission_override: None,
            is_active: true,
        }
    }

    async fn test_db() -> Database {
        Database::new("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_slug_lookup_and_uniqueness() {
        let db = test_db().await;
        db.insert_package(sample_package("backwaters", Region::Kerala, 5000, false))
            .await
            .unwrap();

        let found = db.get_package_by_slug("backwaters").await.unwrap().unwrap();
        assert_eq!(found.region, Region::Kerala);

        let err = db
            .insert_package(sample_package("backwaters", Region::Karnataka, 100, false))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_inactive_packages_hidden_from_slug_lookup() {
        let db = test_db().await;
        let pkg = db
            .insert_package(sample_package("hills", Region::TamilNadu, 3000, false))
            .await
            .unwrap();

        db.update_package(
            pkg.id,
            UpdateTourPackage {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(db.get_package_by_slug("hills").await.unwrap().is_none());
        // Admin lookup still sees it
        assert!(db.get_package_by_id(pkg.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_catalog_filters() {
        let db = test_db().await;
        db.insert_package(sample_package("a", Region::Kerala, 2000, true))
            .await
            .unwrap();
        db.insert_package(sample_package("b", Region::Kerala, 8000, false))
            .await
            .unwrap();
        db.insert_package(sample_package("c", Region::Karnataka, 4000, false))
            .await
            .unwrap();

        let (found, total) = db
            .list_packages(PackageQuery {
                region: Some(Region::Kerala),
                max_price: Some(5000),
                page: 1,
                limit: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(found[0].slug, "a");

        let (found, total) = db
            .list_packages(PackageQuery {
                featured: Some(true),
                page: 1,
                limit: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(found[0].slug, "a");

        let (_, total) = db
            .list_packages(PackageQuery {
                search: Some("Tour b".to_string()),
                page: 1,
                limit: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_view_counter() {
        let db = test_db().await;
        let pkg = db
            .insert_package(sample_package("views", Region::Pondicherry, 1000, false))
            .await
            .unwrap();

        db.increment_package_views(pkg.id).await.unwrap();
        db.increment_package_views(pkg.id).await.unwrap();

        let found = db.get_package_by_id(pkg.id).await.unwrap().unwrap();
        assert_eq!(found.view_count, 2);
    }
}
