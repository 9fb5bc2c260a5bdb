//! ZinoShop Core - Shared types library.
//!
//! This crate provides common types used across all ZinoShop components:
//! - `api` - REST API server backed by the document store
//! - `cli` - Command-line tools for seeding and admin management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no document store access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
