//! Wayfare Database Layer
//!
//! This crate provides the database abstraction layer for the Wayfare
//! booking platform, using SQLite via sqlx for persistence.

pub mod error;
pub mod models;
pub mod repository;
pub mod utils;

pub use error::DbError;
pub use models::*;
pub use repository::{BookingQuery, Database, PackageQuery, VehicleQuery};

/// Re-export sqlx types for convenience
pub use sqlx::SqlitePool;
