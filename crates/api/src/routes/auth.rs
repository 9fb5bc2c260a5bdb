//! Registration, login, and profile routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use zinoshop_core::UserRole;

use crate::db::{Stored, collections};
use crate::error::{ApiError, Result};
use crate::middleware::RequireAuth;
use crate::models::User;
use crate::services::auth::Session;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me).put(update_me))
}

/// User profile as returned by the API. Never exposes the password hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl From<Stored<User>> for UserResponse {
    fn from(user: Stored<User>) -> Self {
        Self {
            id: user.id,
            email: user.record.email.into_inner(),
            name: user.record.name,
            role: user.record.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct SessionResponse {
    token: String,
    user: UserResponse,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            token: session.token,
            user: session.user.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    email: String,
    password: String,
    name: String,
}

async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>)> {
    if body.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name is required".to_owned()));
    }

    let session = state
        .auth()
        .register(&body.email, &body.password, &body.name)
        .await?;

    // Best effort; registration already succeeded
    if let Some(email) = state.email()
        && let Err(e) = email
            .send_welcome(&session.user.record.email, &session.user.record.name)
            .await
    {
        tracing::warn!(error = %e, user_id = %session.user.id, "welcome email failed");
    }

    Ok((StatusCode::CREATED, Json(session.into())))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<SessionResponse>> {
    let session = state.auth().login(&body.email, &body.password).await?;
    Ok(Json(session.into()))
}

async fn me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<UserResponse>> {
    let doc = state
        .store()
        .get(collections::USERS, user.id.as_str())
        .await?
        .ok_or_else(|| ApiError::NotFound("User".to_owned()))?;
    let user: Stored<User> = doc.into_typed()?;
    Ok(Json(user.into()))
}

#[derive(Debug, Deserialize)]
struct UpdateProfileRequest {
    name: String,
}

async fn update_me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Name is required".to_owned()));
    }

    let doc = state
        .store()
        .update(
            collections::USERS,
            user.id.as_str(),
            json!({ "name": name }),
        )
        .await?;
    let user: Stored<User> = doc.into_typed()?;
    Ok(Json(user.into()))
}
