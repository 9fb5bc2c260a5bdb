//! Checkout and order routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use zinoshop_core::{OrderStatus, PaymentMethod};

use crate::db::{ListQuery, Stored, collections};
use crate::error::Result;
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::{Address, Order, OrderItem};
use crate::routes::{PagedResponse, Pagination};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_my_orders))
        .route("/checkout", post(checkout))
        .route("/all", get(list_all_orders))
        .route("/{id}", get(get_order))
        .route("/{id}/status", put(update_status))
}

#[derive(Debug, Deserialize)]
struct CheckoutRequest {
    payment_method: PaymentMethod,
    shipping_address: Address,
}

#[derive(Debug, Serialize)]
struct CheckoutResponse {
    order: Stored<Order>,
    items: Vec<Stored<OrderItem>>,
    /// Present for card orders; the storefront confirms the payment with it.
    #[serde(skip_serializing_if = "Option::is_none")]
    client_secret: Option<String>,
}

async fn checkout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>)> {
    let profile = state
        .store()
        .get(collections::USERS, user.id.as_str())
        .await?
        .ok_or_else(|| crate::error::ApiError::NotFound("User".to_owned()))?
        .into_typed::<crate::models::User>()?;

    let outcome = state
        .orders()
        .checkout(&profile, body.payment_method, body.shipping_address)
        .await?;

    // Best effort; the order is already placed
    if let Some(email) = state.email()
        && let Err(e) = email
            .send_order_confirmation(
                &profile.record.email,
                &profile.record.name,
                &outcome.order,
                &outcome.items,
            )
            .await
    {
        tracing::warn!(error = %e, order_id = %outcome.order.id, "confirmation email failed");
    }

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            order: outcome.order,
            items: outcome.items,
            client_secret: outcome.client_secret,
        }),
    ))
}

async fn list_my_orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(pagination): Query<Pagination>,
) -> Result<Json<PagedResponse<Stored<Order>>>> {
    let page = state
        .store()
        .query(
            collections::ORDERS,
            pagination.apply(ListQuery::new().filter_eq("user_id", user.id.as_str())),
        )
        .await?;

    let has_more = page.has_more;
    Ok(Json(PagedResponse::new(
        page.into_typed()?,
        &pagination,
        has_more,
    )))
}

#[derive(Debug, Deserialize)]
struct AdminOrderParams {
    status: Option<OrderStatus>,
    page: Option<usize>,
    per_page: Option<usize>,
}

async fn list_all_orders(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Query(params): Query<AdminOrderParams>,
) -> Result<Json<PagedResponse<Stored<Order>>>> {
    let default = Pagination::default();
    let pagination = Pagination {
        page: params.page.unwrap_or(default.page),
        per_page: params.per_page.unwrap_or(default.per_page),
    };

    let mut query = ListQuery::new();
    if let Some(status) = params.status {
        query = query.filter_eq("status", status.to_string());
    }

    let page = state
        .store()
        .query(collections::ORDERS, pagination.apply(query))
        .await?;

    let has_more = page.has_more;
    Ok(Json(PagedResponse::new(
        page.into_typed()?,
        &pagination,
        has_more,
    )))
}

#[derive(Debug, Serialize)]
struct OrderDetailResponse {
    order: Stored<Order>,
    items: Vec<Stored<OrderItem>>,
}

async fn get_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<OrderDetailResponse>> {
    // Admins can open any order; customers only their own
    let owner = if user.role.is_admin() {
        None
    } else {
        Some(&user.id)
    };

    let order = state.orders().get_order(&id, owner).await?;
    let items = state.orders().get_order_items(&id).await?;

    Ok(Json(OrderDetailResponse { order, items }))
}

#[derive(Debug, Deserialize)]
struct UpdateStatusRequest {
    status: OrderStatus,
}

async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<Stored<Order>>> {
    let order = state.orders().update_status(&id, body.status).await?;
    Ok(Json(order))
}
