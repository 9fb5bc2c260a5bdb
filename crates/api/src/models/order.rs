//! Order and order line item records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use zinoshop_core::{
    CurrencyCode, OrderStatus, PaymentMethod, PaymentStatus, ProductId, UserId,
};

/// Shipping address captured at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub name: String,
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// An order document.
///
/// Line items live in the `orders/{id}/items` subcollection; `item_count`
/// is denormalized so order lists don't fan out into subcollection reads.
/// Invariant: `subtotal` equals the sum of item `price * quantity`, and
/// `total = subtotal + shipping`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub user_id: UserId,
    #[serde(default)]
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    /// Provider payment intent backing a card order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_intent_id: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub shipping: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub currency: CurrencyCode,
    pub shipping_address: Address,
    pub item_count: u32,
}

/// A purchased line item, snapshotted at checkout time.
///
/// `name` and `price` are copied from the product document so later catalog
/// edits don't rewrite order history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub line_total: Decimal,
}
