//! API routes

mod auth;
mod bookings;
mod dashboard;
mod health;
pub mod metrics;
mod packages;
mod types;
mod uploads;
mod users;
mod vehicles;

use axum::{Router, extract::DefaultBodyLimit};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::state::{AppState, MetricsHandle};

pub use auth::{RequireAdmin, RequireAuth, RequireCustomer};

/// Body limit covering a full upload batch (10 files x 10 MB, plus
/// multipart framing)
const MAX_BODY_SIZE: usize = 110 * 1024 * 1024;

/// Create the main router
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    let uploads_dir = state.uploads_dir.clone();

    let mut router = Router::new()
        // Health check
        .merge(health::routes())
        // Auth + session lifecycle
        .merge(auth::routes())
        // Public catalog + admin package management
        .merge(packages::routes())
        // Vehicle fleet
        .merge(vehicles::routes())
        // Customer and admin bookings
        .merge(bookings::routes())
        // User directory + saved passengers
        .merge(users::routes())
        // Admin uploads
        .merge(uploads::routes())
        // Admin dashboard
        .merge(dashboard::routes())
        .with_state(state)
        // Uploaded media is served statically
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        // The marketing site and admin portal are separate origins
        .layer(CorsLayer::permissive());

    // Add metrics endpoint if handle is provided
    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use std::path::PathBuf;
    use tower::ServiceExt;
    use wayfare_auth::TokenIssuer;
    use wayfare_db::Database;
    use wayfare_storage::LocalStorage;

    async fn test_app() -> (Router, Database) {
        let db = Database::new("sqlite::memory:").await.unwrap();
        let tokens = Arc::new(
            TokenIssuer::new(
                "access-secret-key-for-testing-minimum-32",
                "refresh-secret-key-for-testing-minimum-32",
                "15m",
                "7d",
            )
            .unwrap(),
        );
        let uploads_dir: PathBuf = std::env::temp_dir()
            .join("wayfare-api-test")
            .join(uuid::Uuid::new_v4().to_string());
        let storage = Arc::new(
            LocalStorage::new(&uploads_dir, "/uploads").await.unwrap(),
        );

        let state = AppState::new(db.clone(), tokens, storage, uploads_dir);
        (create_router(state, None), db)
    }

    async fn send_json(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    fn signup_body(email: &str, phone: &str) -> Value {
        json!({
            "name": "Ann",
            "email": email,
            "phone": phone,
            "password": "secret123",
            "country": "US",
        })
    }

    #[tokio::test]
    async fn test_signup_login_profile_flow() {
        let (app, _db) = test_app().await;

        let (status, body) = send_json(
            &app,
            "POST",
            "/api/v1/auth/signup",
            None,
            Some(signup_body("ann@x.com", "+1555")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user"]["role"], "user");
        assert!(body["user"]["password_hash"].is_null());

        let (status, body) = send_json(
            &app,
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "ann@x.com", "password": "secret123"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let access = body["access_token"].as_str().unwrap().to_string();

        let (status, body) =
            send_json(&app, "POST", "/api/v1/auth/profile", Some(&access), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["email"], "ann@x.com");

        // Wrong password
        let (status, _) = send_json(
            &app,
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "ann@x.com", "password": "wrong-password"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_missing_fields_are_400() {
        let (app, _db) = test_app().await;

        let (status, _) = send_json(
            &app,
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "ann@x.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // Short password
        let mut body = signup_body("ann@x.com", "+1555");
        body["password"] = json!("short");
        let (status, _) = send_json(&app, "POST", "/api/v1/auth/signup", None, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) =
            send_json(&app, "POST", "/api/v1/auth/refresh", None, Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_duplicate_signup_is_409() {
        let (app, _db) = test_app().await;

        send_json(
            &app,
            "POST",
            "/api/v1/auth/signup",
            None,
            Some(signup_body("ann@x.com", "+1555")),
        )
        .await;

        // Same phone, different email
        let (status, _) = send_json(
            &app,
            "POST",
            "/api/v1/auth/signup",
            None,
            Some(signup_body("other@x.com", "+1555")),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_role_gate() {
        let (app, db) = test_app().await;

        // No token
        let (status, _) = send_json(&app, "GET", "/api/v1/admin/dashboard", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // Garbage token
        let (status, _) =
            send_json(&app, "GET", "/api/v1/admin/dashboard", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // Customer token on an admin route
        let (_, body) = send_json(
            &app,
            "POST",
            "/api/v1/auth/signup",
            None,
            Some(signup_body("ann@x.com", "+1555")),
        )
        .await;
        let customer = body["access_token"].as_str().unwrap().to_string();

        let (status, _) =
            send_json(&app, "GET", "/api/v1/admin/dashboard", Some(&customer), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        // The customer still reaches self-service routes
        let (status, _) = send_json(&app, "GET", "/api/v1/bookings", Some(&customer), None).await;
        assert_eq!(status, StatusCode::OK);

        // An admin is admitted to admin routes but not customer routes
        db.insert_user(wayfare_db::NewUser {
            name: "Ops".to_string(),
            email: "ops@x.com".to_string(),
            phone: "+1999".to_string(),
            country: "IN".to_string(),
            password_hash: wayfare_auth::hash_password("secret123").unwrap(),
            role: wayfare_db::UserRole::Admin,
        })
        .await
        .unwrap();

        let (status, body) = send_json(
            &app,
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "ops@x.com", "password": "secret123"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let admin = body["access_token"].as_str().unwrap().to_string();

        let (status, _) =
            send_json(&app, "GET", "/api/v1/admin/dashboard", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send_json(&app, "GET", "/api/v1/bookings", Some(&admin), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_refresh_rotation_and_cross_kind() {
        let (app, _db) = test_app().await;

        let (_, body) = send_json(
            &app,
            "POST",
            "/api/v1/auth/signup",
            None,
            Some(signup_body("ann@x.com", "+1555")),
        )
        .await;
        let access = body["access_token"].as_str().unwrap().to_string();
        let refresh = body["refresh_token"].as_str().unwrap().to_string();

        // Access token is not accepted as a refresh token
        let (status, _) = send_json(
            &app,
            "POST",
            "/api/v1/auth/refresh",
            None,
            Some(json!({"refresh_token": access})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send_json(
            &app,
            "POST",
            "/api/v1/auth/refresh",
            None,
            Some(json!({"refresh_token": refresh})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_ne!(body["refresh_token"].as_str().unwrap(), refresh);
    }

    #[tokio::test]
    async fn test_public_catalog_is_open() {
        let (app, _db) = test_app().await;

        let (status, body) = send_json(&app, "GET", "/api/v1/packages", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pagination"]["total"], 0);

        let (status, _) =
            send_json(&app, "GET", "/api/v1/packages/region/mars", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send_json(&app, "GET", "/api/v1/packages/no-such-slug", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _db) = test_app().await;
        let (status, body) = send_json(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }
}
