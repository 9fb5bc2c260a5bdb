//! Cart item record.

use serde::{Deserialize, Serialize};

use zinoshop_core::{ProductId, UserId};

/// One line in a user's cart.
///
/// Unique per user + product + variant: adding the same combination again
/// increments `quantity` on the existing document instead of creating a
/// duplicate. Prices are not stored here - checkout always reprices from
/// the live product documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub user_id: UserId,
    pub product_id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    pub quantity: u32,
}

impl CartItem {
    /// Whether this line is for the given product + variant combination.
    #[must_use]
    pub fn matches(&self, product_id: &ProductId, variant: Option<&str>) -> bool {
        &self.product_id == product_id && self.variant.as_deref() == variant
    }
}
