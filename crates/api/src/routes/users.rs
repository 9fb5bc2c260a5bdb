//! Admin user management routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use zinoshop_core::UserRole;

use crate::db::{ListQuery, Stored, collections};
use crate::error::{ApiError, Result};
use crate::middleware::RequireAdmin;
use crate::models::User;
use crate::routes::{PagedResponse, Pagination};
use crate::routes::auth::UserResponse;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/{id}", get(get_user).delete(delete_user))
        .route("/{id}/role", axum::routing::put(update_role))
}

async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Query(pagination): Query<Pagination>,
) -> Result<Json<PagedResponse<UserResponse>>> {
    let page = state
        .store()
        .query(collections::USERS, pagination.apply(ListQuery::new()))
        .await?;

    let has_more = page.has_more;
    let items = page
        .into_typed::<User>()?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(PagedResponse::new(items, &pagination, has_more)))
}

async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>> {
    let doc = state
        .store()
        .get(collections::USERS, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User".to_owned()))?;
    let user: Stored<User> = doc.into_typed()?;
    Ok(Json(user.into()))
}

#[derive(Debug, Deserialize)]
struct UpdateRoleRequest {
    role: UserRole,
}

async fn update_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    Json(body): Json<UpdateRoleRequest>,
) -> Result<Json<UserResponse>> {
    // An admin dropping their own role would lock the back office
    if admin.id.as_str() == id && body.role != UserRole::Admin {
        return Err(ApiError::BadRequest(
            "Cannot remove your own admin role".to_owned(),
        ));
    }

    let doc = state
        .store()
        .update(collections::USERS, &id, json!({ "role": body.role }))
        .await?;
    let user: Stored<User> = doc.into_typed()?;

    tracing::info!(user_id = %id, role = %body.role, "user role updated");
    Ok(Json(user.into()))
}

async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    if admin.id.as_str() == id {
        return Err(ApiError::BadRequest(
            "Cannot delete your own account".to_owned(),
        ));
    }

    if state.store().delete(collections::USERS, &id).await? {
        tracing::info!(user_id = %id, "user deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("User".to_owned()))
    }
}
