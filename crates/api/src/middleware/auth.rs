//! Authentication extractors.
//!
//! Handlers opt into authentication by taking one of these extractors as an
//! argument. The bearer token is verified against the JWT secret; no store
//! round-trip happens per request, the claims carry everything the
//! authorization checks need.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use zinoshop_core::{UserId, UserRole};

use crate::error::ApiError;
use crate::services::auth::{AuthError, Claims};
use crate::state::AppState;

/// The authenticated caller, decoded from a verified token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
    pub role: UserRole,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: UserId::new(claims.sub),
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Extractor that rejects unauthenticated requests with 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn me(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub AuthUser);

/// Extractor that additionally requires the admin role, rejecting
/// non-admins with 403.
pub struct RequireAdmin(pub AuthUser);

/// Extractor that yields `None` for unauthenticated requests instead of
/// rejecting them. An invalid or expired token is still a 401: a client
/// that sends credentials should learn when they are bad.
pub struct OptionalAuth(pub Option<AuthUser>);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthError::MissingToken)?;
        let claims = state.auth().verify_token(token)?;
        Ok(Self(claims.into()))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;
        if !user.role.is_admin() {
            return Err(ApiError::Forbidden);
        }
        Ok(Self(user))
    }
}

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            return Ok(Self(None));
        };
        let claims = state.auth().verify_token(token)?;
        Ok(Self(Some(claims.into())))
    }
}
