//! Database models

use crate::utils::{parse_datetime_opt, parse_datetime_or_now, parse_json_or_default};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use std::fmt;
use std::str::FromStr;

/// Error type for parsing models from strings
#[derive(Debug, Clone)]
pub enum ParseError {
    InvalidUserRole(String),
    InvalidRegion(String),
    InvalidVehicleType(String),
    InvalidBookingStatus(String),
    InvalidPaymentStatus(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidUserRole(s) => write!(f, "Invalid user role: {}", s),
            ParseError::InvalidRegion(s) => write!(f, "Invalid region: {}", s),
            ParseError::InvalidVehicleType(s) => write!(f, "Invalid vehicle type: {}", s),
            ParseError::InvalidBookingStatus(s) => write!(f, "Invalid booking status: {}", s),
            ParseError::InvalidPaymentStatus(s) => write!(f, "Invalid payment status: {}", s),
        }
    }
}

impl std::error::Error for ParseError {}

/// User role
///
/// Closed set of permission levels gating route access. `SuperAdmin` and
/// `Admin` share the back-office surface; `Driver` exists for the driver
/// app and has no elevated API permissions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    User,
    Admin,
    SuperAdmin,
    Driver,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
            UserRole::SuperAdmin => "super_admin",
            UserRole::Driver => "driver",
        }
    }

    /// Admins and super-admins may use the back-office routes.
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::SuperAdmin)
    }

    pub fn is_customer(&self) -> bool {
        matches!(self, UserRole::User)
    }
}

impl FromStr for UserRole {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            "super_admin" => Ok(UserRole::SuperAdmin),
            "driver" => Ok(UserRole::Driver),
            _ => Err(ParseError::InvalidUserRole(s.to_string())),
        }
    }
}

/// Passenger record, used both for saved passengers on a user profile
/// and for the passenger list attached to a booking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Passenger {
    pub name: String,
    pub age: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passport: Option<String>,
}

/// User model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub country: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub saved_passengers: Vec<Passenger>,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub phone_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New user (for insertion)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub country: String,
    pub password_hash: String,
    pub role: UserRole,
}

/// Tour package region
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    Kerala,
    TamilNadu,
    Karnataka,
    Pondicherry,
    AndhraPradesh,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Kerala => "kerala",
            Region::TamilNadu => "tamil-nadu",
            Region::Karnataka => "karnataka",
            Region::Pondicherry => "pondicherry",
            Region::AndhraPradesh => "andhra-pradesh",
        }
    }
}

impl FromStr for Region {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kerala" => Ok(Region::Kerala),
            "tamil-nadu" => Ok(Region::TamilNadu),
            "karnataka" => Ok(Region::Karnataka),
            "pondicherry" => Ok(Region::Pondicherry),
            "andhra-pradesh" => Ok(Region::AndhraPradesh),
            _ => Err(ParseError::InvalidRegion(s.to_string())),
        }
    }
}

/// Single day of a package itinerary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItineraryDay {
    pub day: i64,
    pub activities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accommodation: Option<String>,
    #[serde(default)]
    pub meals: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Tour package model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TourPackage {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub short_desc: String,
    pub long_desc: String,
    pub itinerary: Vec<ItineraryDay>,
    pub min_pax: i64,
    pub max_pax: i64,
    pub base_price_per_pax: i64,
    pub images: Vec<String>,
    pub region: Region,
    pub tags: Vec<String>,
    pub featured: bool,
    pub inclusions: Vec<String>,
    pub exclusions: Vec<String>,
    pub cancellation_policy: Option<String>,
    pub terms_and_conditions: Option<String>,
    pub commission_override: Option<f64>,
    pub is_active: bool,
    pub view_count: i64,
    pub booking_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New tour package (for insertion)
#[derive(Debug, Clone, Deserialize)]
pub struct NewTourPackage {
    pub title: String,
    pub slug: String,
    pub short_desc: String,
    pub long_desc: String,
    pub itinerary: Vec<ItineraryDay>,
    pub min_pax: i64,
    pub max_pax: i64,
    pub base_price_per_pax: i64,
    #[serde(default)]
    pub images: Vec<String>,
    pub region: Region,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub inclusions: Vec<String>,
    #[serde(default)]
    pub exclusions: Vec<String>,
    #[serde(default)]
    pub cancellation_policy: Option<String>,
    #[serde(default)]
    pub terms_and_conditions: Option<String>,
    #[serde(default)]
    pub commission_override: Option<f64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Tour package update (partial)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTourPackage {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub short_desc: Option<String>,
    pub long_desc: Option<String>,
    pub itinerary: Option<Vec<ItineraryDay>>,
    pub min_pax: Option<i64>,
    pub max_pax: Option<i64>,
    pub base_price_per_pax: Option<i64>,
    pub images: Option<Vec<String>>,
    pub region: Option<Region>,
    pub tags: Option<Vec<String>>,
    pub featured: Option<bool>,
    pub inclusions: Option<Vec<String>>,
    pub exclusions: Option<Vec<String>>,
    pub cancellation_policy: Option<String>,
    pub terms_and_conditions: Option<String>,
    pub commission_override: Option<f64>,
    pub is_active: Option<bool>,
}

/// Vehicle type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    Sedan,
    Suv,
    Van,
    Luxury,
    Bus,
}

impl VehicleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Sedan => "sedan",
            VehicleType::Suv => "suv",
            VehicleType::Van => "van",
            VehicleType::Luxury => "luxury",
            VehicleType::Bus => "bus",
        }
    }
}

impl FromStr for VehicleType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sedan" => Ok(VehicleType::Sedan),
            "suv" => Ok(VehicleType::Suv),
            "van" => Ok(VehicleType::Van),
            "luxury" => Ok(VehicleType::Luxury),
            "bus" => Ok(VehicleType::Bus),
            _ => Err(ParseError::InvalidVehicleType(s.to_string())),
        }
    }
}

/// Assigned driver details, embedded in a vehicle record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Driver {
    pub name: String,
    /// 10-digit mobile number
    pub mobile: String,
    pub experience_years: i64,
    pub license_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Vehicle model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: i64,
    pub make: String,
    pub model: String,
    pub year: i64,
    pub vehicle_type: VehicleType,
    pub seating_capacity: i64,
    pub features: Vec<String>,
    pub description: String,
    pub images: Vec<String>,
    pub is_available: bool,
    pub base_price_per_day: i64,
    pub driver: Driver,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New vehicle (for insertion)
#[derive(Debug, Clone, Deserialize)]
pub struct NewVehicle {
    pub make: String,
    pub model: String,
    pub year: i64,
    pub vehicle_type: VehicleType,
    pub seating_capacity: i64,
    #[serde(default)]
    pub features: Vec<String>,
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
    pub base_price_per_day: i64,
    pub driver: Driver,
}

/// Vehicle update (partial)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateVehicle {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i64>,
    pub vehicle_type: Option<VehicleType>,
    pub seating_capacity: Option<i64>,
    pub features: Option<Vec<String>>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub is_available: Option<bool>,
    pub base_price_per_day: Option<i64>,
    pub driver: Option<Driver>,
}

/// Booking workflow status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Approved => "approved",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }
}

impl FromStr for BookingStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "approved" => Ok(BookingStatus::Approved),
            "rejected" => Ok(BookingStatus::Rejected),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            _ => Err(ParseError::InvalidBookingStatus(s.to_string())),
        }
    }
}

/// Payment status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "refunded" => Ok(PaymentStatus::Refunded),
            _ => Err(ParseError::InvalidPaymentStatus(s.to_string())),
        }
    }
}

/// Booking model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub package_id: i64,
    pub passengers: Vec<Passenger>,
    pub total_amount: i64,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub booking_date: DateTime<Utc>,
    pub travel_date: DateTime<Utc>,
    pub special_requests: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New booking (for insertion)
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: i64,
    pub package_id: i64,
    pub passengers: Vec<Passenger>,
    pub total_amount: i64,
    pub booking_date: DateTime<Utc>,
    pub travel_date: DateTime<Utc>,
    pub special_requests: Option<String>,
}

/// Booking update (partial)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBooking {
    pub status: Option<BookingStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub travel_date: Option<DateTime<Utc>>,
    pub special_requests: Option<String>,
}

/// User summary joined onto admin booking listings
#[derive(Debug, Clone, Serialize)]
pub struct BookingUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Package summary joined onto booking listings
#[derive(Debug, Clone, Serialize)]
pub struct BookingPackage {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub base_price_per_pax: i64,
    pub images: Vec<String>,
}

/// Booking together with its joined user and package summaries
///
/// The summaries are optional: the referenced rows may have been deleted
/// after the booking was made.
#[derive(Debug, Clone, Serialize)]
pub struct BookingDetails {
    #[serde(flatten)]
    pub booking: Booking,
    pub user: Option<BookingUser>,
    pub package: Option<BookingPackage>,
}

fn default_true() -> bool {
    true
}

// ==================== TryFrom Implementations ====================

impl TryFrom<&sqlx::sqlite::SqliteRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        let role_str: String = row.try_get("role")?;
        let passengers_json: String = row.try_get("saved_passengers")?;
        Ok(User {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            country: row.try_get("country")?,
            password_hash: row.try_get("password_hash")?,
            role: UserRole::from_str(&role_str).unwrap_or(UserRole::User),
            saved_passengers: parse_json_or_default(&passengers_json),
            is_active: row.try_get("is_active")?,
            last_login_at: parse_datetime_opt(row.try_get::<Option<String>, _>("last_login_at")?),
            email_verified_at: parse_datetime_opt(
                row.try_get::<Option<String>, _>("email_verified_at")?,
            ),
            phone_verified_at: parse_datetime_opt(
                row.try_get::<Option<String>, _>("phone_verified_at")?,
            ),
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for TourPackage {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        let region_str: String = row.try_get("region")?;
        Ok(TourPackage {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            slug: row.try_get("slug")?,
            short_desc: row.try_get("short_desc")?,
            long_desc: row.try_get("long_desc")?,
            itinerary: parse_json_or_default(&row.try_get::<String, _>("itinerary")?),
            min_pax: row.try_get("min_pax")?,
            max_pax: row.try_get("max_pax")?,
            base_price_per_pax: row.try_get("base_price_per_pax")?,
            images: parse_json_or_default(&row.try_get::<String, _>("images")?),
            region: Region::from_str(&region_str).unwrap_or(Region::Kerala),
            tags: parse_json_or_default(&row.try_get::<String, _>("tags")?),
            featured: row.try_get("featured")?,
            inclusions: parse_json_or_default(&row.try_get::<String, _>("inclusions")?),
            exclusions: parse_json_or_default(&row.try_get::<String, _>("exclusions")?),
            cancellation_policy: row.try_get("cancellation_policy")?,
            terms_and_conditions: row.try_get("terms_and_conditions")?,
            commission_override: row.try_get("commission_override")?,
            is_active: row.try_get("is_active")?,
            view_count: row.try_get("view_count")?,
            booking_count: row.try_get("booking_count")?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Vehicle {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        let type_str: String = row.try_get("vehicle_type")?;
        let driver_json: String = row.try_get("driver")?;
        let driver: Driver = serde_json::from_str(&driver_json)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        Ok(Vehicle {
            id: row.try_get("id")?,
            make: row.try_get("make")?,
            model: row.try_get("model")?,
            year: row.try_get("year")?,
            vehicle_type: VehicleType::from_str(&type_str).unwrap_or(VehicleType::Sedan),
            seating_capacity: row.try_get("seating_capacity")?,
            features: parse_json_or_default(&row.try_get::<String, _>("features")?),
            description: row.try_get("description")?,
            images: parse_json_or_default(&row.try_get::<String, _>("images")?),
            is_available: row.try_get("is_available")?,
            base_price_per_day: row.try_get("base_price_per_day")?,
            driver,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Booking {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        let status_str: String = row.try_get("status")?;
        let payment_str: String = row.try_get("payment_status")?;
        Ok(Booking {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            package_id: row.try_get("package_id")?,
            passengers: parse_json_or_default(&row.try_get::<String, _>("passengers")?),
            total_amount: row.try_get("total_amount")?,
            status: BookingStatus::from_str(&status_str).unwrap_or(BookingStatus::Pending),
            payment_status: PaymentStatus::from_str(&payment_str)
                .unwrap_or(PaymentStatus::Pending),
            booking_date: parse_datetime_or_now(&row.try_get::<String, _>("booking_date")?),
            travel_date: parse_datetime_or_now(&row.try_get::<String, _>("travel_date")?),
            special_requests: row.try_get("special_requests")?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [
            UserRole::User,
            UserRole::Admin,
            UserRole::SuperAdmin,
            UserRole::Driver,
        ] {
            assert_eq!(UserRole::from_str(role.as_str()).unwrap(), role);
        }
        assert!(UserRole::from_str("root").is_err());
    }

    #[test]
    fn test_role_permissions() {
        assert!(UserRole::Admin.is_admin());
        assert!(UserRole::SuperAdmin.is_admin());
        assert!(!UserRole::User.is_admin());
        assert!(!UserRole::Driver.is_admin());
        assert!(UserRole::User.is_customer());
        assert!(!UserRole::Admin.is_customer());
    }

    #[test]
    fn test_region_parsing() {
        assert_eq!(Region::from_str("tamil-nadu").unwrap(), Region::TamilNadu);
        assert!(Region::from_str("goa").is_err());
    }

    #[test]
    fn test_user_serialization_excludes_password_hash() {
        let user = User {
            id: 1,
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            phone: "+1555".to_string(),
            country: "US".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: UserRole::User,
            saved_passengers: vec![],
            is_active: true,
            last_login_at: None,
            email_verified_at: None,
            phone_verified_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2id"));
        assert!(json.contains("\"role\":\"user\""));
    }
}
