//! Wayfare REST API
//!
//! This crate provides the Axum-based HTTP API for the Wayfare booking
//! platform: the public catalog, the customer booking surface and the
//! admin portal backend.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
