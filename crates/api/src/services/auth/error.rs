//! Authentication error types.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors from registration, login, and token verification.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account with this email already exists")]
    EmailTaken,

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Password too weak: {0}")]
    WeakPassword(String),

    #[error("Missing authentication token")]
    MissingToken,

    #[error("Invalid authentication token")]
    InvalidToken,

    #[error("Authentication token expired")]
    TokenExpired,

    #[error("Password hashing failed: {0}")]
    Hash(String),
}

impl AuthError {
    /// HTTP status this error maps to.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials
            | Self::MissingToken
            | Self::InvalidToken
            | Self::TokenExpired => StatusCode::UNAUTHORIZED,
            Self::EmailTaken => StatusCode::CONFLICT,
            Self::InvalidEmail(_) | Self::WeakPassword(_) => StatusCode::BAD_REQUEST,
            Self::Hash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
