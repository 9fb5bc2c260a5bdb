//! Catalog queries with a short-lived featured-products cache.
//!
//! The featured list is the storefront landing page's hottest read, so it is
//! served from an in-process TTL cache. `moka`'s `try_get_with` coalesces
//! concurrent misses into a single store query; every other caller awaits
//! the in-flight load instead of stampeding the database.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::db::{DocumentStore, ListQuery, Stored, collections};
use crate::error::{ApiError, Result};
use crate::models::Product;

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn DocumentStore>,
    featured: Cache<(), Arc<Vec<Stored<Product>>>>,
    featured_count: usize,
}

impl CatalogService {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, ttl_secs: u64, featured_count: usize) -> Self {
        let featured = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            store,
            featured,
            featured_count,
        }
    }

    /// The current featured products: highest-rated active products, served
    /// from cache within the TTL.
    ///
    /// # Errors
    ///
    /// Surfaces the underlying store failure when a cache miss's load fails.
    /// Failed loads are not cached; the next call retries.
    pub async fn featured(&self) -> Result<Arc<Vec<Stored<Product>>>> {
        let store = Arc::clone(&self.store);
        let count = self.featured_count;

        self.featured
            .try_get_with((), async move {
                let page = store
                    .query(
                        collections::PRODUCTS,
                        ListQuery::new()
                            .filter_eq("active", true)
                            .order_desc("rating")
                            .limit(count),
                    )
                    .await?;
                Ok(Arc::new(page.into_typed::<Product>()?))
            })
            .await
            .map_err(|e: Arc<crate::db::StoreError>| {
                ApiError::Internal(format!("featured products load failed: {e}"))
            })
    }

    /// Drop the cached featured list. Called after admin catalog writes so
    /// edits show up without waiting out the TTL.
    pub async fn invalidate_featured(&self) {
        self.featured.invalidate(&()).await;
    }
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("featured_count", &self.featured_count)
            .finish_non_exhaustive()
    }
}
