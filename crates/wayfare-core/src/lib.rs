//! Wayfare Core Services
//!
//! Domain services for the Wayfare booking platform: the
//! authentication/session lifecycle, booking creation and pricing, and
//! the admin dashboard aggregation. The HTTP layer stays thin; the
//! rules live here.

pub mod auth;
pub mod bookings;
pub mod dashboard;
pub mod error;

pub use auth::{AuthService, AuthSession, SignupData};
pub use bookings::{BookingService, CreateBookingData};
pub use dashboard::{DashboardOverview, DashboardStats, dashboard_stats};
pub use error::CoreError;
