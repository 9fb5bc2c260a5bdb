//! Registration, login, and token verification.
//!
//! Passwords are hashed with Argon2id using per-password random salts. The
//! PHC-format hash string (which embeds the salt and parameters) is stored
//! on the user document.

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use secrecy::SecretString;

use zinoshop_core::{Email, UserRole};

use crate::db::{DocumentStore, ListQuery, StoreError, Stored, collections, to_fields};
use crate::models::User;

pub mod error;
pub mod token;

pub use error::AuthError;
pub use token::Claims;

const MIN_PASSWORD_LENGTH: usize = 8;

/// A dummy PHC hash verified against when the email is unknown, so login
/// latency does not reveal whether an account exists.
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$zt5d1h9N8BmXyvYJBhlXUg$S5cvsDdDHb65vgJOXnQZmYbQvuW1Yc9sjFLX4hhBpU0";

/// Outcome of a successful register or login.
#[derive(Debug)]
pub struct Session {
    pub user: Stored<User>,
    pub token: String,
}

/// Authentication service over the user collection.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn DocumentStore>,
    jwt_secret: SecretString,
    jwt_ttl_hours: i64,
}

impl AuthService {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, jwt_secret: SecretString, jwt_ttl_hours: i64) -> Self {
        Self {
            store,
            jwt_secret,
            jwt_ttl_hours,
        }
    }

    /// Register a new customer account and return a signed session token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::EmailTaken` when an account already exists for
    /// the normalized email and `AuthError::WeakPassword` when the password
    /// fails the policy. Store failures bubble up as `StoreError`.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Session, crate::error::ApiError> {
        let email = Email::parse(email).map_err(|e| AuthError::InvalidEmail(e.to_string()))?;
        validate_password(password)?;

        if self.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken.into());
        }

        let user = User {
            email,
            name: name.trim().to_owned(),
            role: UserRole::Customer,
            password_hash: hash_password(password)?,
        };

        let doc = self
            .store
            .create(collections::USERS, None, to_fields(&user)?)
            .await?;
        let user: Stored<User> = doc.into_typed()?;

        let token = token::issue(
            &self.jwt_secret,
            self.jwt_ttl_hours,
            &zinoshop_core::UserId::new(user.id.clone()),
            user.record.email.as_str(),
            user.record.role,
        )?;

        Ok(Session { user, token })
    }

    /// Verify credentials and return a signed session token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown email or a
    /// wrong password; the two cases are indistinguishable to the caller.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, crate::error::ApiError> {
        let Ok(email) = Email::parse(email) else {
            return Err(AuthError::InvalidCredentials.into());
        };

        let Some(user) = self.find_by_email(&email).await? else {
            // Burn comparable time before rejecting
            let _ = verify_password(DUMMY_HASH, password);
            return Err(AuthError::InvalidCredentials.into());
        };

        if !verify_password(&user.record.password_hash, password) {
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = token::issue(
            &self.jwt_secret,
            self.jwt_ttl_hours,
            &zinoshop_core::UserId::new(user.id.clone()),
            user.record.email.as_str(),
            user.record.role,
        )?;

        Ok(Session { user, token })
    }

    /// Decode and validate a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenExpired` or `AuthError::InvalidToken`.
    pub fn verify_token(&self, bearer: &str) -> Result<Claims, AuthError> {
        token::verify(&self.jwt_secret, bearer)
    }

    /// Look up a user document by normalized email.
    ///
    /// # Errors
    ///
    /// Surfaces store failures.
    pub async fn find_by_email(&self, email: &Email) -> Result<Option<Stored<User>>, StoreError> {
        let page = self
            .store
            .query(
                collections::USERS,
                ListQuery::new().filter_eq("email", email.as_str()).limit(1),
            )
            .await?;

        Ok(page.into_typed::<User>()?.into_iter().next())
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("jwt_ttl_hours", &self.jwt_ttl_hours)
            .finish_non_exhaustive()
    }
}

/// Enforce the password policy: minimum length, at least one letter and one
/// digit.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(AuthError::WeakPassword(
            "must contain at least one letter".to_owned(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AuthError::WeakPassword(
            "must contain at least one digit".to_owned(),
        ));
    }
    Ok(())
}

/// Hash a password with Argon2id and a fresh random salt.
///
/// # Errors
///
/// Returns `AuthError::Hash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Verify a password against a stored PHC hash. Malformed hashes fail closed.
#[must_use]
pub fn verify_password(stored_hash: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
