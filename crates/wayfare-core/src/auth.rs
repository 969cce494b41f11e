//! Authentication and session lifecycle
//!
//! Login, signup and refresh all end the same way: a freshly minted
//! access/refresh token pair. Refresh rotates both tokens; the old
//! refresh token is simply abandoned by well-behaved clients and ages
//! out at its natural expiry.

use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};
use wayfare_auth::{TokenIssuer, TokenPair, hash_password, verify_password};
use wayfare_db::{Database, NewUser, User, UserRole};

use crate::error::CoreError;

/// Signup form data
///
/// Password length is validated at the HTTP boundary before this
/// service is invoked.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupData {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub country: String,
}

/// Result of a successful login, signup or refresh
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub tokens: TokenPair,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: Database,
    tokens: Arc<TokenIssuer>,
}

impl AuthService {
    pub fn new(db: Database, tokens: Arc<TokenIssuer>) -> Self {
        Self { db, tokens }
    }

    /// Log a user in with email and password
    ///
    /// The email lookup is an exact, case-sensitive match. A missing
    /// user, a wrong password and an inactive account all collapse to
    /// `InvalidCredentials` so the response leaks nothing.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, CoreError> {
        debug!("Login attempt for user: {}", email);

        let user_result = self.db.get_user_by_email(email).await?;

        // Always run a verification so a missing user costs the same as a
        // wrong password. This dummy hash is a valid Argon2 hash that never
        // matches.
        const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$dGltaW5nX2F0dGFja19wcmV2ZW50aW9u$K8rI5T7VdQ8xkO0GqK5K2w";

        let (hash_to_verify, user) = match user_result {
            Some(u) => (u.password_hash.clone(), Some(u)),
            None => (DUMMY_HASH.to_string(), None),
        };

        let password_valid = verify_password(password, &hash_to_verify)?;

        let user = match (user, password_valid) {
            (Some(u), true) if u.is_active => u,
            _ => return Err(CoreError::InvalidCredentials),
        };

        self.db.update_last_login(user.id).await?;

        let tokens = self.tokens.issue_pair(user.id, &user.email, user.role)?;

        info!("User {} logged in", user.email);

        Ok(AuthSession { user, tokens })
    }

    /// Register a new customer account
    ///
    /// The role is always `user`; elevated roles are granted by an
    /// administrator after the fact. Email/phone uniqueness rides on
    /// the database constraints, so a concurrent duplicate signup gets
    /// a deterministic `Duplicate` instead of a second account.
    pub async fn signup(&self, data: SignupData) -> Result<AuthSession, CoreError> {
        let password_hash = hash_password(&data.password)?;

        let user = self
            .db
            .insert_user(NewUser {
                name: data.name,
                email: data.email,
                phone: data.phone,
                country: data.country,
                password_hash,
                role: UserRole::User,
            })
            .await?;

        let tokens = self.tokens.issue_pair(user.id, &user.email, user.role)?;

        info!("New user signed up: {}", user.email);

        Ok(AuthSession { user, tokens })
    }

    /// Exchange a refresh token for a new token pair
    ///
    /// The user is re-fetched so a deactivated or deleted account is
    /// cut off even while its refresh token is still formally valid.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, CoreError> {
        let claims = self.tokens.verify_refresh(refresh_token)?;

        let user_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| CoreError::from(wayfare_auth::AuthError::InvalidToken))?;

        let user = match self.db.get_user_by_id(user_id).await? {
            Some(u) if u.is_active => u,
            _ => return Err(CoreError::UserInactive),
        };

        let tokens = self.tokens.issue_pair(user.id, &user.email, user.role)?;

        debug!("Refreshed session for user: {}", user.email);

        Ok(AuthSession { user, tokens })
    }

    /// Fetch the account behind a set of verified claims
    pub async fn profile(&self, user_id: i64) -> Result<User, CoreError> {
        self.db
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("User: {}", user_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_issuer() -> Arc<TokenIssuer> {
        Arc::new(
            TokenIssuer::new(
                "access-secret-key-for-testing-minimum-32",
                "refresh-secret-key-for-testing-minimum-32",
                "15m",
                "7d",
            )
            .unwrap(),
        )
    }

    async fn test_service() -> AuthService {
        let db = Database::new("sqlite::memory:").await.unwrap();
        AuthService::new(db, test_issuer())
    }

    fn ann() -> SignupData {
        SignupData {
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            phone: "+1555".to_string(),
            password: "secret123".to_string(),
            country: "US".to_string(),
        }
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let service = test_service().await;

        let session = service.signup(ann()).await.unwrap();
        assert_eq!(session.user.role, UserRole::User);
        assert!(!session.tokens.access_token.is_empty());

        let session = service.login("ann@x.com", "secret123").await.unwrap();
        assert_eq!(session.user.email, "ann@x.com");
        assert!(session.user.last_login_at.is_none());

        // last_login_at lands on the stored record
        let stored = service.profile(session.user.id).await.unwrap();
        assert!(stored.last_login_at.is_some());
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let service = test_service().await;
        service.signup(ann()).await.unwrap();

        let err = service.login("ann@x.com", "wrong").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidCredentials));

        // Unknown user gets the same error
        let err = service.login("nobody@x.com", "secret123").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_duplicate_signup() {
        let service = test_service().await;
        service.signup(ann()).await.unwrap();

        // Same email, new phone
        let mut dup = ann();
        dup.phone = "+1777".to_string();
        assert!(matches!(
            service.signup(dup).await.unwrap_err(),
            CoreError::Duplicate(_)
        ));

        // Same phone, new email
        let mut dup = ann();
        dup.email = "other@x.com".to_string();
        assert!(matches!(
            service.signup(dup).await.unwrap_err(),
            CoreError::Duplicate(_)
        ));
    }

    #[tokio::test]
    async fn test_refresh_rotates_tokens() {
        let service = test_service().await;
        let session = service.signup(ann()).await.unwrap();

        let refreshed = service.refresh(&session.tokens.refresh_token).await.unwrap();
        assert_eq!(refreshed.user.email, "ann@x.com");
        assert_ne!(refreshed.tokens.refresh_token, session.tokens.refresh_token);
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let service = test_service().await;
        let session = service.signup(ann()).await.unwrap();

        let err = service.refresh(&session.tokens.access_token).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Auth(wayfare_auth::AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_refresh_for_inactive_user() {
        let service = test_service().await;
        let session = service.signup(ann()).await.unwrap();

        sqlx::query("UPDATE users SET is_active = 0 WHERE id = ?")
            .bind(session.user.id)
            .execute(service.db.pool())
            .await
            .unwrap();

        let err = service.refresh(&session.tokens.refresh_token).await.unwrap_err();
        assert!(matches!(err, CoreError::UserInactive));

        // Inactive users cannot log in either
        let err = service.login("ann@x.com", "secret123").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidCredentials));
    }
}
