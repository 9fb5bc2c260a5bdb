//! Catalog seeding from YAML fixtures.
//!
//! The fixture is a YAML list of products in the same shape the API
//! serves; see `fixtures/products.yaml`.

use std::path::Path;

use tracing::info;

use zinoshop_api::db::{DocumentStore, collections, to_fields};
use zinoshop_api::models::Product;

use super::CliError;

/// Insert every product from the fixture file.
///
/// # Errors
///
/// Returns `CliError` when the file is missing, fails to parse, or a
/// store write fails.
pub async fn products(file_path: &str) -> Result<(), CliError> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(CliError::FileNotFound(file_path.to_owned()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    let products: Vec<Product> = serde_yaml::from_str(&content)?;
    info!(path = %file_path, count = products.len(), "parsed product fixture");

    let store = super::store_from_env()?;

    for product in &products {
        let doc = store
            .create(collections::PRODUCTS, None, to_fields(product)?)
            .await?;
        info!(product_id = %doc.id, name = %product.name, "product created");
    }

    info!(count = products.len(), "seeding complete");
    Ok(())
}
