//! CLI subcommands.

pub mod admin;
pub mod seed;

use secrecy::SecretString;
use thiserror::Error;

use zinoshop_api::config::{FirestoreConfig, ServiceAccountConfig};
use zinoshop_api::db::StoreError;
use zinoshop_api::db::firestore::FirestoreStore;

/// Errors shared by the CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Password too weak: {0}")]
    WeakPassword(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid fixture: {0}")]
    InvalidFixture(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Build a Firestore store from the same `FIRESTORE_*` environment
/// variables the API server uses.
pub fn store_from_env() -> Result<FirestoreStore, CliError> {
    dotenvy::dotenv().ok();

    let project_id = std::env::var("FIRESTORE_PROJECT_ID")
        .map_err(|_| CliError::MissingEnvVar("FIRESTORE_PROJECT_ID"))?;
    let emulator_host = std::env::var("FIRESTORE_EMULATOR_HOST").ok();

    let service_account = match (
        std::env::var("FIRESTORE_CLIENT_EMAIL").ok(),
        std::env::var("FIRESTORE_PRIVATE_KEY").ok(),
    ) {
        (Some(client_email), Some(private_key)) => Some(ServiceAccountConfig {
            client_email,
            private_key: SecretString::from(private_key.replace("\\n", "\n")),
        }),
        _ => None,
    };

    let config = FirestoreConfig {
        project_id,
        emulator_host,
        service_account,
    };

    Ok(FirestoreStore::new(&config)?)
}
