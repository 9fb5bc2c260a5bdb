//! Product catalog routes.
//!
//! Public listing supports category/material/price-range filters, sorting,
//! and pagination. Admin CRUD soft-deletes by flipping `active` so order
//! history keeps resolving product references.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use zinoshop_core::ProductCategory;

use crate::db::{FilterOp, ListQuery, Stored, collections, to_fields};
use crate::error::{ApiError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Product;
use crate::routes::{PagedResponse, Pagination};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/featured", get(featured))
        .route("/{id}", get(get_product).put(update_product).delete(delete_product))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ProductSort {
    PriceAsc,
    PriceDesc,
    Rating,
}

#[derive(Debug, Deserialize)]
struct ProductListParams {
    category: Option<ProductCategory>,
    material: Option<String>,
    min_price: Option<f64>,
    max_price: Option<f64>,
    sort: Option<ProductSort>,
    page: Option<usize>,
    per_page: Option<usize>,
}

impl ProductListParams {
    fn pagination(&self) -> Pagination {
        let default = Pagination::default();
        Pagination {
            page: self.page.unwrap_or(default.page),
            per_page: self.per_page.unwrap_or(default.per_page),
        }
    }

    fn to_query(&self) -> ListQuery {
        let mut query = ListQuery::new().filter_eq("active", true);

        if let Some(category) = self.category {
            query = query.filter_eq("category", category.to_string());
        }
        if let Some(material) = &self.material {
            query = query.filter_eq("material", material.as_str());
        }
        if let Some(min) = self.min_price {
            query = query.filter("price", FilterOp::Ge, json!(min));
        }
        if let Some(max) = self.max_price {
            query = query.filter("price", FilterOp::Le, json!(max));
        }

        match self.sort {
            Some(ProductSort::PriceAsc) => query = query.order_asc("price"),
            Some(ProductSort::PriceDesc) => query = query.order_desc("price"),
            Some(ProductSort::Rating) => query = query.order_desc("rating"),
            None => {}
        }

        self.pagination().apply(query)
    }
}

async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ProductListParams>,
) -> Result<Json<PagedResponse<Stored<Product>>>> {
    let page = state
        .store()
        .query(collections::PRODUCTS, params.to_query())
        .await?;

    let has_more = page.has_more;
    let items = page.into_typed::<Product>()?;
    Ok(Json(PagedResponse::new(
        items,
        &params.pagination(),
        has_more,
    )))
}

async fn featured(State(state): State<AppState>) -> Result<Json<Vec<Stored<Product>>>> {
    let products = state.catalog().featured().await?;
    Ok(Json(products.as_ref().clone()))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Stored<Product>>> {
    let doc = state
        .store()
        .get(collections::PRODUCTS, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product".to_owned()))?;
    let product: Stored<Product> = doc.into_typed()?;

    if !product.record.active {
        return Err(ApiError::NotFound("Product".to_owned()));
    }

    Ok(Json(product))
}

fn validate_product(product: &Product) -> Result<()> {
    if product.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Product name is required".to_owned()));
    }
    if product.price.is_sign_negative() {
        return Err(ApiError::BadRequest("Price cannot be negative".to_owned()));
    }
    if let Some(compare_at) = product.compare_at_price
        && compare_at < product.price
    {
        return Err(ApiError::BadRequest(
            "Compare-at price must be at least the price".to_owned(),
        ));
    }
    Ok(())
}

async fn create_product(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Json(product): Json<Product>,
) -> Result<(StatusCode, Json<Stored<Product>>)> {
    validate_product(&product)?;

    let doc = state
        .store()
        .create(collections::PRODUCTS, None, to_fields(&product)?)
        .await?;
    state.catalog().invalidate_featured().await;

    let product: Stored<Product> = doc.into_typed()?;
    tracing::info!(product_id = %product.id, name = %product.record.name, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<String>,
    Json(product): Json<Product>,
) -> Result<Json<Stored<Product>>> {
    validate_product(&product)?;

    let doc = state
        .store()
        .update(collections::PRODUCTS, &id, to_fields(&product)?)
        .await?;
    state.catalog().invalidate_featured().await;

    Ok(Json(doc.into_typed()?))
}

/// Soft delete: the product disappears from the storefront but existing
/// orders keep resolving it.
async fn delete_product(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state
        .store()
        .update(collections::PRODUCTS, &id, json!({ "active": false }))
        .await?;
    state.catalog().invalidate_featured().await;

    tracing::info!(product_id = %id, "product deactivated");
    Ok(StatusCode::NO_CONTENT)
}
