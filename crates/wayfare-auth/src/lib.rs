//! Wayfare Authentication and Authorization
//!
//! This crate provides JWT-based authentication (separate access and
//! refresh secrets) and role-based access control for the Wayfare
//! booking platform.

pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use error::AuthError;
pub use jwt::{Claims, TokenIssuer, TokenPair, parse_expiry};
pub use middleware::{AuthUser, extract_bearer_token};
pub use password::{hash_password, verify_password};
