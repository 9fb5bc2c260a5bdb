//! API error types and HTTP response conversion.
//!
//! Every handler returns [`Result<T>`]; the [`IntoResponse`] impl maps each
//! variant to a status code and a JSON body of the shape
//! `{"error": "message"}`. Server-side failures are captured to Sentry with
//! full detail and answered with a generic message so internals never leak
//! to clients.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::db::StoreError;
use crate::services::auth::AuthError;
use crate::services::email::EmailError;
use crate::services::payments::PaymentError;

/// Convenient result alias for handlers and services.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Top-level API error.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Email error: {0}")]
    Email(#[from] EmailError),

    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Too many requests")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Status code and client-facing message for this error.
    ///
    /// Store and internal failures collapse to a generic 500 message; the
    /// detail goes to Sentry and the logs instead.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Store(StoreError::NotFound) => {
                (StatusCode::NOT_FOUND, "Resource not found".to_owned())
            }
            Self::Store(StoreError::Conflict(_)) => {
                (StatusCode::CONFLICT, "Resource already exists".to_owned())
            }
            Self::Store(_) | Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_owned(),
            ),
            Self::Email(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to send email".to_owned(),
            ),
            Self::Payment(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            Self::Auth(e) => (e.status_code(), e.to_string()),
            Self::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_owned()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests, please slow down".to_owned(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            sentry::capture_error(&self);
        } else {
            tracing::debug!(error = %self, status = %status, "request rejected");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
