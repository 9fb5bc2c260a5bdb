//! Admin account management.
//!
//! ```bash
//! zs-cli admin create -e admin@zinoshop.example -p 'S3cure-pass' -n "Store Admin"
//! ```

use serde_json::json;

use zinoshop_api::db::{DocumentStore, ListQuery, collections, to_fields};
use zinoshop_api::models::User;
use zinoshop_api::services::auth::hash_password;
use zinoshop_core::{Email, UserRole};

use super::CliError;

const MIN_PASSWORD_LENGTH: usize = 8;

/// Create a new admin account, or promote an existing user to admin.
///
/// # Errors
///
/// Returns `CliError` on invalid input or store failure.
pub async fn create(email: &str, password: &str, name: &str) -> Result<(), CliError> {
    let email = Email::parse(email).map_err(|e| CliError::InvalidEmail(e.to_string()))?;
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(CliError::WeakPassword(format!(
            "must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let store = super::store_from_env()?;

    let existing = store
        .query(
            collections::USERS,
            ListQuery::new().filter_eq("email", email.as_str()).limit(1),
        )
        .await?;

    if let Some(doc) = existing.documents.into_iter().next() {
        store
            .update(
                collections::USERS,
                &doc.id,
                json!({ "role": UserRole::Admin }),
            )
            .await?;
        tracing::info!(user_id = %doc.id, email = %email, "existing user promoted to admin");
        return Ok(());
    }

    let user = User {
        email: email.clone(),
        name: name.to_owned(),
        role: UserRole::Admin,
        password_hash: hash_password(password).map_err(|e| CliError::Hash(e.to_string()))?,
    };

    let doc = store
        .create(collections::USERS, None, to_fields(&user)?)
        .await?;
    tracing::info!(user_id = %doc.id, email = %email, "admin account created");

    Ok(())
}
