//! Domain records persisted in the document store.
//!
//! These are the plain documents the storefront works with: users,
//! products, orders and their line items, cart items, wishlist items, and
//! blog posts. Each struct holds only the persisted fields; the document ID
//! and lifecycle timestamps come from [`crate::db::Stored`].
//!
//! Monetary fields serialize as JSON numbers (`rust_decimal::serde::float`)
//! so Firestore can filter and order on them; arithmetic always happens on
//! `Decimal`, never on floats.

mod blog;
mod cart;
mod order;
mod product;
mod user;
mod wishlist;

pub use blog::BlogPost;
pub use cart::CartItem;
pub use order::{Address, Order, OrderItem};
pub use product::Product;
pub use user::User;
pub use wishlist::WishlistItem;
