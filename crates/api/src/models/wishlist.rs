//! Wishlist item record.

use serde::{Deserialize, Serialize};

use zinoshop_core::{ProductId, UserId};

/// A product saved to a user's wishlist. Unique per user + product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistItem {
    pub user_id: UserId,
    pub product_id: ProductId,
}
