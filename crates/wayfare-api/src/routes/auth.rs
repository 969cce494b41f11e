//! Authentication extractors and routes

use axum::{
    Json, Router,
    extract::{FromRef, FromRequestParts, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    routing::post,
};
use tracing::debug;
use wayfare_auth::{AuthUser, extract_bearer_token};
use wayfare_core::SignupData;

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{
    AuthResponse, LoginRequest, LogoutResponse, ProfileResponse, RefreshRequest, SignupRequest,
};

// ==================== Auth Extractors ====================
//
// The role gate is a linear pipeline: extract the bearer token, verify
// it against the access secret, then check the caller's role against
// the route's allowed set. Any failure short-circuits before the
// handler body runs.

/// Extractor for authenticated callers (any role)
pub struct RequireAuth(pub AuthUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let token = extract_bearer_token(auth_header).map_err(|_| ApiError::Unauthorized)?;
        let claims = app_state
            .tokens
            .verify_access(token)
            .map_err(|_| ApiError::Unauthorized)?;
        let user = AuthUser::from_claims(&claims);

        debug!("Authenticated user: {} ({})", user.email, user.role.as_str());
        Ok(RequireAuth(user))
    }
}

/// Extractor for back-office callers (admin or super_admin)
pub struct RequireAdmin(pub AuthUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;

        if !user.role.is_admin() {
            return Err(ApiError::Forbidden);
        }

        Ok(RequireAdmin(user))
    }
}

/// Extractor for customer self-service routes (role `user`)
pub struct RequireCustomer(pub AuthUser);

impl<S> FromRequestParts<S> for RequireCustomer
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;

        if !user.role.is_customer() {
            return Err(ApiError::Forbidden);
        }

        Ok(RequireCustomer(user))
    }
}

// ==================== Input Validation ====================

/// Minimum allowed password length
const MIN_PASSWORD_LENGTH: usize = 8;
/// Maximum allowed password length (prevent DoS with very large passwords)
const MAX_PASSWORD_LENGTH: usize = 256;

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        )));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

// ==================== Auth Routes ====================

/// POST /api/v1/auth/login
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (Some(email), Some(password)) = (request.email, request.password) else {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    };
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }

    let session = state.auth.login(&email, &password).await?;

    metrics::counter!("wayfare_logins_total").increment(1);

    Ok(Json(session.into()))
}

/// POST /api/v1/auth/signup
async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let (Some(name), Some(email), Some(phone), Some(password), Some(country)) = (
        request.name,
        request.email,
        request.phone,
        request.password,
        request.country,
    ) else {
        return Err(ApiError::BadRequest("All fields are required".to_string()));
    };
    validate_password(&password)?;

    let session = state
        .auth
        .signup(SignupData {
            name,
            email,
            phone,
            password,
            country,
        })
        .await?;

    metrics::counter!("wayfare_signups_total").increment(1);

    Ok((StatusCode::CREATED, Json(session.into())))
}

/// POST /api/v1/auth/refresh
async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Some(refresh_token) = request.refresh_token else {
        return Err(ApiError::BadRequest(
            "Refresh token is required".to_string(),
        ));
    };

    let session = state.auth.refresh(&refresh_token).await?;

    Ok(Json(session.into()))
}

/// POST /api/v1/auth/profile
async fn profile(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = state.auth.profile(user.id).await?;
    Ok(Json(ProfileResponse { user }))
}

/// POST /api/v1/auth/logout
///
/// Tokens are stateless, so there is nothing to revoke server-side;
/// the endpoint confirms the token was valid and the client drops it.
async fn logout(RequireAuth(user): RequireAuth) -> Json<LogoutResponse> {
    Json(LogoutResponse {
        message: "Logout successful".to_string(),
        user,
    })
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/signup", post(signup))
        .route("/api/v1/auth/refresh", post(refresh))
        .route("/api/v1/auth/profile", post(profile))
        .route("/api/v1/auth/logout", post(logout))
}
