//! JWT issuance and verification.
//!
//! Tokens are HS256, signed with the configured API secret. Claims carry the
//! user id, email, and role so request extractors can authorize without a
//! store round-trip.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use zinoshop_core::{UserId, UserRole};

use super::error::AuthError;

/// Claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User document id.
    pub sub: String,
    pub email: String,
    pub role: UserRole,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

impl Claims {
    /// The user id these claims were issued for.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        UserId::new(self.sub.clone())
    }
}

/// Issue a signed token for the given user.
///
/// # Errors
///
/// Returns `AuthError::Hash` if signing fails (malformed secret).
pub fn issue(
    secret: &SecretString,
    ttl_hours: i64,
    user_id: &UserId,
    email: &str,
    role: UserRole,
) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.as_str().to_owned(),
        email: email.to_owned(),
        role,
        iat: now,
        exp: now + ttl_hours * 3600,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Verify a token's signature and expiry, returning its claims.
///
/// # Errors
///
/// Returns `AuthError::TokenExpired` for expired tokens and
/// `AuthError::InvalidToken` for anything else that fails validation.
pub fn verify(secret: &SecretString, token: &str) -> Result<Claims, AuthError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(data.claims)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_secret() -> SecretString {
        SecretString::from("qN7#fK2$wX9!dR4@zT6^bM1*vC8&hJ3%")
    }

    #[test]
    fn test_issue_then_verify_roundtrip() {
        let secret = test_secret();
        let user_id = UserId::new("user123");
        let token = issue(&secret, 24, &user_id, "a@b.com", UserRole::Customer).unwrap();

        let claims = verify(&secret, &token).unwrap();
        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.email, "a@b.com");
        assert_eq!(claims.role, UserRole::Customer);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let user_id = UserId::new("user123");
        let token = issue(&test_secret(), 24, &user_id, "a@b.com", UserRole::Admin).unwrap();

        let other = SecretString::from("xW3@pL8#qM5$vN2!cF7^gH4&jK1*sD6%");
        let err = verify(&other, &token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let secret = test_secret();
        let user_id = UserId::new("user123");
        // Negative TTL makes the token already expired
        let token = issue(&secret, -2, &user_id, "a@b.com", UserRole::Customer).unwrap();

        let err = verify(&secret, &token).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let err = verify(&test_secret(), "not.a.jwt").unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }
}
