//! Request/Response DTOs

use serde::{Deserialize, Serialize};
use wayfare_auth::AuthUser;
use wayfare_core::AuthSession;
use wayfare_db::{BookingDetails, TourPackage, User, Vehicle};
use wayfare_storage::StoredFile;

// ==================== Auth Types ====================

/// Login request
///
/// Fields are optional so missing input maps to a 400 with a message
/// instead of a deserialization rejection.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Signup request
#[derive(Deserialize)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub country: Option<String>,
}

/// Refresh request
#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Login/signup/refresh response: the user plus a fresh token pair
#[derive(Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            user: session.user,
            access_token: session.tokens.access_token,
            refresh_token: session.tokens.refresh_token,
            expires_in: session.tokens.expires_in,
            token_type: session.tokens.token_type,
        }
    }
}

/// Profile response
#[derive(Serialize)]
pub struct ProfileResponse {
    pub user: User,
}

/// Logout response: stateless, echoes the verified claims back
#[derive(Serialize)]
pub struct LogoutResponse {
    pub message: String,
    pub user: AuthUser,
}

// ==================== Pagination ====================

/// Pagination metadata attached to list responses
#[derive(Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        Self {
            page,
            limit,
            total,
            pages: if limit > 0 { (total as u64).div_ceil(limit as u64) as i64 } else { 0 },
        }
    }
}

/// Page/limit query parameters for admin listings
#[derive(Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_admin_limit")]
    pub limit: i64,
}

/// Page/limit query parameters for customer-facing listings
#[derive(Deserialize)]
pub struct CustomerPageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

pub fn default_page() -> i64 {
    1
}

pub fn default_limit() -> i64 {
    10
}

pub fn default_admin_limit() -> i64 {
    20
}

// ==================== Package Types ====================

/// Public catalog query parameters
#[derive(Deserialize, Default)]
pub struct CatalogQuery {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub min_price: Option<i64>,
    #[serde(default)]
    pub max_price: Option<i64>,
    #[serde(default)]
    pub min_pax: Option<i64>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

/// Limit-only query parameter (featured/region listings)
#[derive(Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

/// Paginated package list
#[derive(Serialize)]
pub struct PackagesResponse {
    pub packages: Vec<TourPackage>,
    pub pagination: Pagination,
}

/// Unpaginated package list (featured/region)
#[derive(Serialize)]
pub struct PackageListResponse {
    pub packages: Vec<TourPackage>,
}

// ==================== Vehicle Types ====================

/// Vehicle fleet query parameters
#[derive(Deserialize, Default)]
pub struct VehicleListQuery {
    #[serde(default)]
    pub vehicle_type: Option<String>,
    #[serde(default)]
    pub min_seats: Option<i64>,
    #[serde(default)]
    pub max_price: Option<i64>,
    #[serde(default)]
    pub available: Option<bool>,
    #[serde(default)]
    pub search: Option<String>,
}

/// Vehicle list response
#[derive(Serialize)]
pub struct VehiclesResponse {
    pub count: usize,
    pub vehicles: Vec<Vehicle>,
}

// ==================== Booking Types ====================

/// Admin booking listing query parameters
#[derive(Deserialize)]
pub struct BookingListQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_admin_limit")]
    pub limit: i64,
}

/// Admin-created booking request
#[derive(Deserialize)]
pub struct AdminCreateBookingRequest {
    pub user_id: i64,
    #[serde(flatten)]
    pub data: wayfare_core::CreateBookingData,
}

/// Paginated booking list
#[derive(Serialize)]
pub struct BookingsResponse {
    pub bookings: Vec<BookingDetails>,
    pub pagination: Pagination,
}

// ==================== User Types ====================

/// Paginated user list
#[derive(Serialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
    pub pagination: Pagination,
}

/// Role-filtered user list
#[derive(Serialize)]
pub struct UsersByRoleResponse {
    pub users: Vec<User>,
}

// ==================== Upload Types ====================

/// Upload response
#[derive(Serialize)]
pub struct UploadsResponse {
    pub files: Vec<StoredFile>,
}
