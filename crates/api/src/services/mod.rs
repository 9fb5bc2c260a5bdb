//! Business logic services, composed into [`crate::state::AppState`].

pub mod auth;
pub mod catalog;
pub mod email;
pub mod orders;
pub mod payments;
