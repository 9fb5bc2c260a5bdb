//! Request middleware: authentication extractors, rate limiting, request IDs.

pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::{AuthUser, OptionalAuth, RequireAdmin, RequireAuth};
