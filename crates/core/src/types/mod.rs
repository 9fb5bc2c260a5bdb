//! Shared type definitions.

mod email;
mod id;
mod price;
mod status;

pub use email::{Email, EmailError};
pub use id::{BlogPostId, CartItemId, OrderId, OrderItemId, ProductId, UserId, WishlistItemId};
pub use price::{CurrencyCode, Money, MoneyError};
pub use status::{OrderStatus, PaymentMethod, PaymentStatus, ProductCategory, UserRole};
