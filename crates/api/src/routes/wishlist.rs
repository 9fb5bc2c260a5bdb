//! Wishlist routes. All endpoints require authentication.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use zinoshop_core::ProductId;

use crate::db::{ListQuery, Stored, collections, to_fields};
use crate::error::{ApiError, Result};
use crate::middleware::{AuthUser, RequireAuth};
use crate::models::{Product, WishlistItem};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_wishlist))
        .route("/items", post(add_item))
        .route("/items/{id}", axum::routing::delete(remove_item))
}

async fn load_wishlist(state: &AppState, user: &AuthUser) -> Result<Vec<Stored<WishlistItem>>> {
    let page = state
        .store()
        .query(
            collections::WISHLIST_ITEMS,
            ListQuery::new()
                .filter_eq("user_id", user.id.as_str())
                .limit(200),
        )
        .await?;
    Ok(page.into_typed()?)
}

async fn list_wishlist(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Stored<WishlistItem>>>> {
    Ok(Json(load_wishlist(&state, &user).await?))
}

#[derive(Debug, Deserialize)]
struct AddItemRequest {
    product_id: ProductId,
}

async fn add_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<Stored<WishlistItem>>)> {
    let doc = state
        .store()
        .get(collections::PRODUCTS, body.product_id.as_str())
        .await?
        .ok_or_else(|| ApiError::NotFound("Product".to_owned()))?;
    let product: Stored<Product> = doc.into_typed()?;
    if !product.record.active {
        return Err(ApiError::NotFound("Product".to_owned()));
    }

    // Already saved: adding again is a no-op, not a duplicate
    if let Some(existing) = load_wishlist(&state, &user)
        .await?
        .into_iter()
        .find(|item| item.record.product_id == body.product_id)
    {
        return Ok((StatusCode::OK, Json(existing)));
    }

    let item = WishlistItem {
        user_id: user.id.clone(),
        product_id: body.product_id,
    };
    let doc = state
        .store()
        .create(collections::WISHLIST_ITEMS, None, to_fields(&item)?)
        .await?;

    Ok((StatusCode::CREATED, Json(doc.into_typed()?)))
}

async fn remove_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let doc = state
        .store()
        .get(collections::WISHLIST_ITEMS, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Wishlist item".to_owned()))?;
    let item: Stored<WishlistItem> = doc.into_typed()?;

    if item.record.user_id.as_str() != user.id.as_str() {
        return Err(ApiError::NotFound("Wishlist item".to_owned()));
    }

    state
        .store()
        .delete(collections::WISHLIST_ITEMS, &item.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
