//! Product catalog record.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use zinoshop_core::ProductCategory;

/// A catalog product.
///
/// `rating` is the running average of review scores and drives the featured
/// selection; `active` is the soft-delete flag - inactive products stay in
/// the store but disappear from public listings and fail checkout
/// validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub description: String,
    pub category: ProductCategory,
    /// Primary material, e.g. "18k gold" or "sterling silver".
    pub material: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Strike-through price when the product is on sale.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub compare_at_price: Option<Decimal>,
    pub stock: u32,
    #[serde(default)]
    pub images: Vec<String>,
    /// Variant options the customer picks from, e.g. ring sizes.
    #[serde(default)]
    pub variants: Vec<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub rating_count: u32,
    pub active: bool,
}

impl Product {
    /// Whether the given variant selection is valid for this product.
    ///
    /// Products without variants accept only `None`.
    #[must_use]
    pub fn accepts_variant(&self, variant: Option<&str>) -> bool {
        match variant {
            None => self.variants.is_empty(),
            Some(v) => self.variants.iter().any(|known| known == v),
        }
    }
}
