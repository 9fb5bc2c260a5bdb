//! User account record.

use serde::{Deserialize, Serialize};

use zinoshop_core::{Email, UserRole};

/// A registered user.
///
/// `password_hash` is an argon2id PHC string. It is part of the persisted
/// document, so route handlers must respond with a profile DTO rather than
/// the raw record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub email: Email,
    pub name: String,
    #[serde(default)]
    pub role: UserRole,
    pub password_hash: String,
}
