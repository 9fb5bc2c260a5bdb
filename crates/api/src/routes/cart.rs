//! Shopping cart routes. All endpoints require authentication.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use zinoshop_core::ProductId;

use crate::db::{ListQuery, Stored, collections, to_fields};
use crate::error::{ApiError, Result};
use crate::middleware::{AuthUser, RequireAuth};
use crate::models::{CartItem, Product};
use crate::state::AppState;

/// Per-line quantity cap; orders beyond this go through support.
const MAX_QUANTITY: u32 = 99;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_cart).delete(clear_cart))
        .route("/items", axum::routing::post(add_item))
        .route("/items/{id}", put(update_item).delete(remove_item))
}

async fn load_cart(state: &AppState, user: &AuthUser) -> Result<Vec<Stored<CartItem>>> {
    let page = state
        .store()
        .query(
            collections::CART_ITEMS,
            ListQuery::new()
                .filter_eq("user_id", user.id.as_str())
                .limit(100),
        )
        .await?;
    Ok(page.into_typed()?)
}

/// Load a cart line and verify the caller owns it. Foreign lines read as
/// 404 so the endpoint does not leak other users' cart contents.
async fn load_owned_item(state: &AppState, user: &AuthUser, id: &str) -> Result<Stored<CartItem>> {
    let doc = state
        .store()
        .get(collections::CART_ITEMS, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Cart item".to_owned()))?;
    let item: Stored<CartItem> = doc.into_typed()?;

    if item.record.user_id.as_str() != user.id.as_str() {
        return Err(ApiError::NotFound("Cart item".to_owned()));
    }
    Ok(item)
}

async fn list_cart(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Stored<CartItem>>>> {
    Ok(Json(load_cart(&state, &user).await?))
}

#[derive(Debug, Deserialize)]
struct AddItemRequest {
    product_id: ProductId,
    variant: Option<String>,
    #[serde(default = "default_quantity")]
    quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

async fn add_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<Stored<CartItem>>)> {
    if body.quantity == 0 || body.quantity > MAX_QUANTITY {
        return Err(ApiError::BadRequest(format!(
            "Quantity must be between 1 and {MAX_QUANTITY}"
        )));
    }

    let doc = state
        .store()
        .get(collections::PRODUCTS, body.product_id.as_str())
        .await?
        .ok_or_else(|| ApiError::NotFound("Product".to_owned()))?;
    let product: Stored<Product> = doc.into_typed()?;

    if !product.record.active {
        return Err(ApiError::NotFound("Product".to_owned()));
    }
    if !product.record.accepts_variant(body.variant.as_deref()) {
        return Err(ApiError::BadRequest(format!(
            "Unknown variant for {}",
            product.record.name
        )));
    }

    // Same product + variant already in the cart: bump the quantity instead
    // of adding a duplicate line
    let existing = load_cart(&state, &user)
        .await?
        .into_iter()
        .find(|item| item.record.matches(&body.product_id, body.variant.as_deref()));

    if let Some(existing) = existing {
        let quantity = (existing.record.quantity + body.quantity).min(MAX_QUANTITY);
        let doc = state
            .store()
            .update(
                collections::CART_ITEMS,
                &existing.id,
                json!({ "quantity": quantity }),
            )
            .await?;
        return Ok((StatusCode::OK, Json(doc.into_typed()?)));
    }

    let item = CartItem {
        user_id: user.id.clone(),
        product_id: body.product_id,
        variant: body.variant,
        quantity: body.quantity,
    };
    let doc = state
        .store()
        .create(collections::CART_ITEMS, None, to_fields(&item)?)
        .await?;

    Ok((StatusCode::CREATED, Json(doc.into_typed()?)))
}

#[derive(Debug, Deserialize)]
struct UpdateItemRequest {
    quantity: u32,
}

async fn update_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<Stored<CartItem>>> {
    if body.quantity == 0 || body.quantity > MAX_QUANTITY {
        return Err(ApiError::BadRequest(format!(
            "Quantity must be between 1 and {MAX_QUANTITY}"
        )));
    }

    let item = load_owned_item(&state, &user, &id).await?;
    let doc = state
        .store()
        .update(
            collections::CART_ITEMS,
            &item.id,
            json!({ "quantity": body.quantity }),
        )
        .await?;
    Ok(Json(doc.into_typed()?))
}

async fn remove_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let item = load_owned_item(&state, &user, &id).await?;
    state.store().delete(collections::CART_ITEMS, &item.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn clear_cart(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<StatusCode> {
    for item in load_cart(&state, &user).await? {
        state.store().delete(collections::CART_ITEMS, &item.id).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}
