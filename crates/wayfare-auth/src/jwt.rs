//! JWT token management
//!
//! Access and refresh tokens share a claim shape but are signed with
//! independent secrets, so a leaked access token can never be replayed
//! against the refresh endpoint (and vice versa). Tokens are
//! self-contained; revocation is only possible by rotating a secret.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use wayfare_db::UserRole;

use crate::error::AuthError;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Email the token was issued for
    pub email: String,
    /// User role
    pub role: UserRole,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Access token + refresh token pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    /// Always "Bearer"
    pub token_type: String,
}

/// Parse an expiry string like `"15m"`, `"7d"`, `"24h"` or `"90s"`
pub fn parse_expiry(s: &str) -> Result<Duration, AuthError> {
    let s = s.trim();
    let (value, unit) = s.split_at(s.len().saturating_sub(1));
    let amount: i64 = value
        .parse()
        .map_err(|_| AuthError::InvalidExpiry(s.to_string()))?;
    if amount <= 0 {
        return Err(AuthError::InvalidExpiry(s.to_string()));
    }

    match unit {
        "s" => Ok(Duration::seconds(amount)),
        "m" => Ok(Duration::minutes(amount)),
        "h" => Ok(Duration::hours(amount)),
        "d" => Ok(Duration::days(amount)),
        _ => Err(AuthError::InvalidExpiry(s.to_string())),
    }
}

/// Token issuer and verifier
///
/// Holds the encoding/decoding keys for both token kinds together with
/// their lifetimes. Built once at startup and shared via the app state.
#[derive(Clone)]
pub struct TokenIssuer {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    /// Create a new token issuer
    ///
    /// `access_expiry` and `refresh_expiry` are duration strings
    /// (e.g. `"15m"`, `"7d"`).
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_expiry: &str,
        refresh_expiry: &str,
    ) -> Result<Self, AuthError> {
        if access_secret == refresh_secret {
            warn!("Access and refresh secrets are identical; token kinds are not isolated");
        }

        Ok(Self {
            access_encoding: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.as_bytes()),
            access_ttl: parse_expiry(access_expiry)?,
            refresh_ttl: parse_expiry(refresh_expiry)?,
        })
    }

    fn claims(&self, user_id: i64, email: &str, role: UserRole, ttl: Duration) -> Claims {
        let now = Utc::now();
        Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// Issue a short-lived access token
    pub fn issue_access(
        &self,
        user_id: i64,
        email: &str,
        role: UserRole,
    ) -> Result<String, AuthError> {
        let claims = self.claims(user_id, email, role, self.access_ttl);
        encode(&Header::default(), &claims, &self.access_encoding).map_err(AuthError::Jwt)
    }

    /// Issue a longer-lived refresh token
    pub fn issue_refresh(
        &self,
        user_id: i64,
        email: &str,
        role: UserRole,
    ) -> Result<String, AuthError> {
        let claims = self.claims(user_id, email, role, self.refresh_ttl);
        encode(&Header::default(), &claims, &self.refresh_encoding).map_err(AuthError::Jwt)
    }

    /// Issue a fresh access/refresh token pair
    pub fn issue_pair(
        &self,
        user_id: i64,
        email: &str,
        role: UserRole,
    ) -> Result<TokenPair, AuthError> {
        debug!("Issuing token pair for user: {}", email);

        Ok(TokenPair {
            access_token: self.issue_access(user_id, email, role)?,
            refresh_token: self.issue_refresh(user_id, email, role)?,
            expires_in: self.access_ttl.num_seconds(),
            token_type: "Bearer".to_string(),
        })
    }

    fn verify(&self, token: &str, decoding: &DecodingKey) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        // No leeway: a token is invalid the second its expiry passes
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, decoding, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            }
        })?;

        Ok(token_data.claims)
    }

    /// Validate an access token and return its claims
    pub fn verify_access(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify(token, &self.access_decoding)
    }

    /// Validate a refresh token and return its claims
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify(token, &self.refresh_decoding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCESS_SECRET: &str = "access-secret-key-for-testing-minimum-32-chars";
    const REFRESH_SECRET: &str = "refresh-secret-key-for-testing-minimum-32-chars";

    fn test_issuer() -> TokenIssuer {
        TokenIssuer::new(ACCESS_SECRET, REFRESH_SECRET, "15m", "7d").unwrap()
    }

    #[test]
    fn test_issue_and_verify_pair() {
        let issuer = test_issuer();
        let pair = issuer.issue_pair(42, "ann@x.com", UserRole::User).unwrap();

        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.expires_in, 15 * 60);

        let access = issuer.verify_access(&pair.access_token).unwrap();
        assert_eq!(access.sub, "42");
        assert_eq!(access.email, "ann@x.com");
        assert_eq!(access.role, UserRole::User);

        let refresh = issuer.verify_refresh(&pair.refresh_token).unwrap();
        assert_eq!(refresh.sub, "42");
    }

    #[test]
    fn test_cross_kind_rejection() {
        let issuer = test_issuer();
        let pair = issuer.issue_pair(1, "a@x.com", UserRole::Admin).unwrap();

        // An access token must not verify as a refresh token, and vice versa
        assert!(matches!(
            issuer.verify_refresh(&pair.access_token),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            issuer.verify_access(&pair.refresh_token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = test_issuer();

        let now = Utc::now();
        let expired = Claims {
            sub: "1".to_string(),
            email: "a@x.com".to_string(),
            role: UserRole::User,
            iat: (now - Duration::minutes(30)).timestamp(),
            exp: (now - Duration::minutes(15)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &expired,
            &EncodingKey::from_secret(ACCESS_SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            issuer.verify_access(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_token_valid_just_before_expiry() {
        let issuer = test_issuer();

        let now = Utc::now();
        let claims = Claims {
            sub: "1".to_string(),
            email: "a@x.com".to_string(),
            role: UserRole::User,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(30)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(ACCESS_SECRET.as_bytes()),
        )
        .unwrap();

        assert!(issuer.verify_access(&token).is_ok());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let issuer = test_issuer();
        assert!(matches!(
            issuer.verify_access("not.a.token"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = test_issuer();
        let other = TokenIssuer::new("other-secret-a", "other-secret-b", "15m", "7d").unwrap();

        let token = other.issue_access(1, "a@x.com", UserRole::User).unwrap();
        assert!(matches!(
            issuer.verify_access(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_parse_expiry() {
        assert_eq!(parse_expiry("15m").unwrap(), Duration::minutes(15));
        assert_eq!(parse_expiry("7d").unwrap(), Duration::days(7));
        assert_eq!(parse_expiry("24h").unwrap(), Duration::hours(24));
        assert_eq!(parse_expiry("90s").unwrap(), Duration::seconds(90));

        assert!(parse_expiry("").is_err());
        assert!(parse_expiry("15").is_err());
        assert!(parse_expiry("-5m").is_err());
        assert!(parse_expiry("fifteen minutes").is_err());
    }
}
