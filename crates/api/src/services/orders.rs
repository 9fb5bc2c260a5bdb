//! Checkout and order lifecycle.
//!
//! Checkout never trusts client prices: the cart stores only product
//! references and quantities, and every line is repriced from the live
//! product document at the moment the order is placed. Purchased lines are
//! snapshotted into the `orders/{id}/items` subcollection so later catalog
//! edits cannot rewrite order history.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::json;

use zinoshop_core::{CurrencyCode, Money, OrderStatus, PaymentMethod, PaymentStatus, UserId};

use crate::db::{DocumentStore, ListQuery, Stored, collections, to_fields};
use crate::error::{ApiError, Result};
use crate::models::{Address, CartItem, Order, OrderItem, Product, User};
use crate::services::payments::StripeClient;

/// Safety bound on how many cart lines one checkout will load.
const MAX_CART_LINES: usize = 100;

/// A placed order with its snapshotted lines and, for card orders, the
/// secret the storefront needs to confirm the payment.
#[derive(Debug)]
pub struct CheckoutOutcome {
    pub order: Stored<Order>,
    pub items: Vec<Stored<OrderItem>>,
    pub client_secret: Option<String>,
}

#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn DocumentStore>,
    payments: Option<StripeClient>,
    currency: CurrencyCode,
    shipping_flat_rate: Decimal,
    free_shipping_threshold: Decimal,
}

impl OrderService {
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        payments: Option<StripeClient>,
        currency: CurrencyCode,
        shipping_flat_rate: Decimal,
        free_shipping_threshold: Decimal,
    ) -> Self {
        Self {
            store,
            payments,
            currency,
            shipping_flat_rate,
            free_shipping_threshold,
        }
    }

    /// Place an order from the user's cart.
    ///
    /// Validates every line against the live product (exists, active, known
    /// variant, sufficient stock), reprices, computes totals, writes the
    /// order and its line items, decrements stock, and clears the cart. For
    /// card orders a payment intent is created and its id stored on the
    /// order.
    ///
    /// # Errors
    ///
    /// - `ApiError::BadRequest` - empty cart, inactive product, unknown
    ///   variant, or card payment requested while card payments are disabled
    /// - `ApiError::Conflict` - insufficient stock
    /// - `ApiError::Payment` - the payment provider rejected the intent
    pub async fn checkout(
        &self,
        user: &Stored<User>,
        payment_method: PaymentMethod,
        shipping_address: Address,
    ) -> Result<CheckoutOutcome> {
        if payment_method == PaymentMethod::Card && self.payments.is_none() {
            return Err(ApiError::BadRequest(
                "Card payments are not enabled".to_owned(),
            ));
        }

        let user_id = UserId::new(user.id.clone());
        let cart = self.load_cart(&user_id).await?;
        if cart.is_empty() {
            return Err(ApiError::BadRequest("Cart is empty".to_owned()));
        }

        // Reprice every line against the live product
        let mut lines: Vec<OrderItem> = Vec::with_capacity(cart.len());
        let mut restock: Vec<(String, u32)> = Vec::with_capacity(cart.len());
        let mut subtotal = Money::zero(self.currency);

        for item in &cart {
            let (product_id, product) = self.load_product_for_sale(item).await?;

            if product.record.stock < item.record.quantity {
                return Err(ApiError::Conflict(format!(
                    "Insufficient stock for {}",
                    product.record.name
                )));
            }

            let price = Money::new(product.record.price, self.currency);
            let line_total = price.times(item.record.quantity);
            subtotal = subtotal
                .checked_add(&line_total)
                .ok_or_else(|| ApiError::Internal("currency mismatch in cart".to_owned()))?;

            restock.push((
                product_id,
                product.record.stock - item.record.quantity,
            ));
            lines.push(OrderItem {
                product_id: item.record.product_id.clone(),
                name: product.record.name,
                variant: item.record.variant.clone(),
                price: price.amount,
                quantity: item.record.quantity,
                line_total: line_total.amount,
            });
        }

        let shipping = if subtotal.amount >= self.free_shipping_threshold {
            Decimal::ZERO
        } else {
            self.shipping_flat_rate
        };
        let total = subtotal.amount + shipping;

        let item_count = lines.iter().map(|l| l.quantity).sum::<u32>();

        let order = Order {
            user_id: user_id.clone(),
            status: OrderStatus::Pending,
            payment_method,
            payment_status: PaymentStatus::Pending,
            payment_intent_id: None,
            subtotal: subtotal.amount,
            shipping,
            total,
            currency: self.currency,
            shipping_address,
            item_count,
        };

        let order_doc = self
            .store
            .create(collections::ORDERS, None, to_fields(&order)?)
            .await?;
        let mut order: Stored<Order> = order_doc.into_typed()?;

        let items_path = collections::order_items(&order.id);
        let mut items: Vec<Stored<OrderItem>> = Vec::with_capacity(lines.len());
        for line in &lines {
            let doc = self.store.create(&items_path, None, to_fields(line)?).await?;
            items.push(doc.into_typed()?);
        }

        for (product_id, remaining) in restock {
            self.store
                .update(
                    collections::PRODUCTS,
                    &product_id,
                    json!({ "stock": remaining }),
                )
                .await?;
        }

        for item in &cart {
            self.store.delete(collections::CART_ITEMS, &item.id).await?;
        }

        let mut client_secret = None;
        if payment_method == PaymentMethod::Card
            && let Some(payments) = &self.payments
        {
            let amount = Money::new(order.record.total, self.currency);
            let intent = payments
                .create_payment_intent(&amount, &order.id, Some(user.record.email.as_str()))
                .await?;

            let doc = self
                .store
                .update(
                    collections::ORDERS,
                    &order.id,
                    json!({ "payment_intent_id": intent.id }),
                )
                .await?;
            order = doc.into_typed()?;
            client_secret = Some(intent.client_secret);
        }

        tracing::info!(
            order_id = %order.id,
            user_id = %user_id,
            total = %order.record.total,
            lines = items.len(),
            "order placed"
        );

        Ok(CheckoutOutcome {
            order,
            items,
            client_secret,
        })
    }

    /// Fetch an order, enforcing ownership unless `owner` is `None` (admin).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for missing orders and for orders owned
    /// by someone else, so the endpoint does not leak order existence.
    pub async fn get_order(
        &self,
        order_id: &str,
        owner: Option<&UserId>,
    ) -> Result<Stored<Order>> {
        let doc = self
            .store
            .get(collections::ORDERS, order_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Order".to_owned()))?;
        let order: Stored<Order> = doc.into_typed()?;

        if let Some(owner) = owner
            && &order.record.user_id != owner
        {
            return Err(ApiError::NotFound("Order".to_owned()));
        }

        Ok(order)
    }

    /// Load an order's snapshotted line items.
    ///
    /// # Errors
    ///
    /// Surfaces store failures.
    pub async fn get_order_items(&self, order_id: &str) -> Result<Vec<Stored<OrderItem>>> {
        let page = self
            .store
            .query(
                collections::order_items(order_id).as_str(),
                ListQuery::new().limit(MAX_CART_LINES),
            )
            .await?;
        Ok(page.into_typed()?)
    }

    /// Admin status transition.
    ///
    /// Only forward transitions are allowed; cancellation is possible until
    /// the order ships and restores product stock. Delivered
    /// cash-on-delivery orders are marked paid.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::BadRequest` for an illegal transition.
    pub async fn update_status(&self, order_id: &str, next: OrderStatus) -> Result<Stored<Order>> {
        let order = self.get_order(order_id, None).await?;

        if !order.record.status.can_transition_to(next) {
            return Err(ApiError::BadRequest(format!(
                "Cannot move order from {} to {}",
                order.record.status, next
            )));
        }

        let mut patch = json!({ "status": next });
        if next == OrderStatus::Delivered
            && order.record.payment_method == PaymentMethod::CashOnDelivery
        {
            patch["payment_status"] = json!(PaymentStatus::Paid);
        }

        let doc = self
            .store
            .update(collections::ORDERS, order_id, patch)
            .await?;

        if next == OrderStatus::Cancelled {
            self.restock(order_id).await?;
        }

        tracing::info!(order_id, status = %next, "order status updated");
        Ok(doc.into_typed()?)
    }

    /// Create (or re-create) a payment intent for an existing pending card
    /// order. Used when the storefront lost the client secret from checkout.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::BadRequest` when the order is not a pending,
    /// unpaid card order, or card payments are disabled.
    pub async fn payment_intent(&self, order_id: &str, owner: &UserId) -> Result<String> {
        let Some(payments) = &self.payments else {
            return Err(ApiError::BadRequest(
                "Card payments are not enabled".to_owned(),
            ));
        };

        let order = self.get_order(order_id, Some(owner)).await?;
        if order.record.payment_method != PaymentMethod::Card
            || order.record.status != OrderStatus::Pending
            || order.record.payment_status != PaymentStatus::Pending
        {
            return Err(ApiError::BadRequest(
                "Order is not awaiting card payment".to_owned(),
            ));
        }

        let amount = Money::new(order.record.total, order.record.currency);
        let intent = payments
            .create_payment_intent(&amount, &order.id, None)
            .await?;

        self.store
            .update(
                collections::ORDERS,
                &order.id,
                json!({ "payment_intent_id": intent.id }),
            )
            .await?;

        Ok(intent.client_secret)
    }

    async fn load_cart(&self, user_id: &UserId) -> Result<Vec<Stored<CartItem>>> {
        let page = self
            .store
            .query(
                collections::CART_ITEMS,
                ListQuery::new()
                    .filter_eq("user_id", user_id.as_str())
                    .limit(MAX_CART_LINES),
            )
            .await?;
        Ok(page.into_typed()?)
    }

    async fn load_product_for_sale(
        &self,
        item: &Stored<CartItem>,
    ) -> Result<(String, Stored<Product>)> {
        let product_id = item.record.product_id.as_str().to_owned();
        let product: Stored<Product> = self
            .store
            .get(collections::PRODUCTS, &product_id)
            .await?
            .ok_or_else(|| {
                ApiError::BadRequest("A product in your cart no longer exists".to_owned())
            })?
            .into_typed()?;

        if !product.record.active {
            return Err(ApiError::BadRequest(format!(
                "{} is no longer available",
                product.record.name
            )));
        }
        if !product.record.accepts_variant(item.record.variant.as_deref()) {
            return Err(ApiError::BadRequest(format!(
                "Unknown variant for {}",
                product.record.name
            )));
        }

        Ok((product_id, product))
    }

    /// Return every line's quantity to product stock after a cancellation.
    async fn restock(&self, order_id: &str) -> Result<()> {
        for item in self.get_order_items(order_id).await? {
            let Some(doc) = self
                .store
                .get(collections::PRODUCTS, item.record.product_id.as_str())
                .await?
            else {
                continue; // product deleted since purchase
            };
            let product: Stored<Product> = doc.into_typed()?;
            self.store
                .update(
                    collections::PRODUCTS,
                    item.record.product_id.as_str(),
                    json!({ "stock": product.record.stock + item.record.quantity }),
                )
                .await?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for OrderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderService")
            .field("currency", &self.currency)
            .field("shipping_flat_rate", &self.shipping_flat_rate)
            .field("free_shipping_threshold", &self.free_shipping_threshold)
            .finish_non_exhaustive()
    }
}
