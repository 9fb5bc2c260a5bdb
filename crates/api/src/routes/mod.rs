//! HTTP route handlers and router composition.

pub mod auth;
pub mod blog;
pub mod cart;
pub mod orders;
pub mod payments;
pub mod products;
pub mod users;
pub mod wishlist;

use axum::http::{HeaderValue, Method, header};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::db::ListQuery;
use crate::middleware::{rate_limit, request_id};
use crate::state::AppState;

/// Hard cap on page size, whatever the client asks for.
pub const MAX_PER_PAGE: usize = 100;

/// Standard pagination query parameters (`?page=2&per_page=20`).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

const fn default_page() -> usize {
    1
}

const fn default_per_page() -> usize {
    20
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl Pagination {
    /// Clamped page size.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.per_page.clamp(1, MAX_PER_PAGE)
    }

    /// Offset of the first item on this page.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.limit())
    }

    /// Apply this pagination to a store query.
    #[must_use]
    pub fn apply(&self, query: ListQuery) -> ListQuery {
        query.limit(self.limit()).offset(self.offset())
    }
}

/// Standard paged response envelope.
#[derive(Debug, Serialize)]
pub struct PagedResponse<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub has_more: bool,
}

impl<T> PagedResponse<T> {
    #[must_use]
    pub fn new(items: Vec<T>, pagination: &Pagination, has_more: bool) -> Self {
        Self {
            items,
            page: pagination.page.max(1),
            per_page: pagination.limit(),
            has_more,
        }
    }
}

/// Build the full application router.
#[must_use]
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/auth", auth::router().layer(rate_limit::auth_rate_limiter()))
        .nest("/products", products::router())
        .nest("/orders", orders::router())
        .nest("/cart", cart::router())
        .nest("/wishlist", wishlist::router())
        .nest("/blog", blog::router())
        .nest("/users", users::router())
        .nest("/payments", payments::router())
        .layer(rate_limit::api_rate_limiter());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(ready))
        .nest("/api", api)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(cors_layer(state.config().cors_origin.as_deref()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origin: Option<&str>) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    match allowed_origin.and_then(|o| o.parse::<HeaderValue>().ok()) {
        Some(origin) => cors.allow_origin(origin),
        None => cors.allow_origin(Any),
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Readiness probe: verifies the store answers a trivial query.
async fn ready(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> crate::error::Result<Json<serde_json::Value>> {
    state
        .store()
        .query(crate::db::collections::PRODUCTS, ListQuery::new().limit(1))
        .await?;
    Ok(Json(json!({ "status": "ready" })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_clamps_per_page() {
        let p = Pagination {
            page: 1,
            per_page: 5000,
        };
        assert_eq!(p.limit(), MAX_PER_PAGE);

        let p = Pagination {
            page: 1,
            per_page: 0,
        };
        assert_eq!(p.limit(), 1);
    }

    #[test]
    fn test_pagination_offset() {
        let p = Pagination {
            page: 3,
            per_page: 20,
        };
        assert_eq!(p.offset(), 40);

        // page 0 behaves like page 1
        let p = Pagination {
            page: 0,
            per_page: 20,
        };
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_pagination_offset_saturates_on_huge_page() {
        // Client-supplied page numbers are unbounded; the offset must not
        // overflow for ?page=18446744073709551615
        let p = Pagination {
            page: usize::MAX,
            per_page: MAX_PER_PAGE,
        };
        assert_eq!(p.offset(), usize::MAX);

        let p = Pagination {
            page: usize::MAX / 10,
            per_page: MAX_PER_PAGE,
        };
        assert_eq!(p.offset(), usize::MAX);
    }
}
