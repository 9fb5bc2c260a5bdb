//! ZinoShop API server library.
//!
//! A jewelry storefront backend: REST resources for auth, users, products,
//! orders, cart, wishlist, and blog over a document store, with JWT
//! authentication, transactional email, and optional card payments.
//!
//! The binary in `main.rs` wires configuration, Sentry, and tracing around
//! [`routes::router`]; integration tests drive the same router over the
//! in-memory store.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, Result};
pub use state::AppState;
