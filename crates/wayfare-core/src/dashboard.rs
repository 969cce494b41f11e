//! Admin dashboard aggregation

use serde::Serialize;
use wayfare_db::{BookingDetails, BookingStatus, Database};

use crate::error::CoreError;

/// Headline counters for the admin dashboard
#[derive(Debug, Clone, Serialize)]
pub struct DashboardOverview {
    pub total_users: i64,
    pub total_packages: i64,
    pub total_bookings: i64,
    pub pending_bookings: i64,
    pub active_users: i64,
    pub featured_packages: i64,
}

/// Admin dashboard payload
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub overview: DashboardOverview,
    pub recent_bookings: Vec<BookingDetails>,
}

/// Gather the dashboard counters and the latest bookings
pub async fn dashboard_stats(db: &Database) -> Result<DashboardStats, CoreError> {
    let overview = DashboardOverview {
        total_users: db.count_users().await?,
        total_packages: db.count_packages().await?,
        total_bookings: db.count_bookings().await?,
        pending_bookings: db.count_bookings_by_status(BookingStatus::Pending).await?,
        active_users: db.count_active_users().await?,
        featured_packages: db.count_featured_packages().await?,
    };

    let recent_bookings = db.recent_bookings(5).await?;

    Ok(DashboardStats {
        overview,
        recent_bookings,
    })
}
