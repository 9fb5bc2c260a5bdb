//! Service-account authentication for the Firestore REST API.
//!
//! Signs an RS256 JWT assertion with the service account's private key and
//! exchanges it for an OAuth access token. Tokens are cached and refreshed
//! shortly before expiry; against the emulator no token is used at all.

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::ServiceAccountConfig;
use crate::db::StoreError;

/// Google OAuth token endpoint.
const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// OAuth scope covering Firestore.
const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

/// Assertion and access-token lifetime in seconds.
const TOKEN_LIFETIME_SECS: i64 = 3600;

/// Refresh this many seconds before the token actually expires.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Claims of the signed service-account assertion.
#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Response from the OAuth token endpoint.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Token lifetime in seconds.
    expires_in: i64,
}

struct CachedToken {
    access_token: SecretString,
    expires_at: i64,
}

/// Access-token provider for a Firestore service account.
pub struct TokenProvider {
    client_email: String,
    signing_key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    /// Build a provider from service-account credentials.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Backend` when the private key PEM is invalid.
    pub fn new(config: &ServiceAccountConfig) -> Result<Self, StoreError> {
        let signing_key = EncodingKey::from_rsa_pem(config.private_key.expose_secret().as_bytes())
            .map_err(|e| StoreError::Backend(format!("invalid service account key: {e}")))?;

        Ok(Self {
            client_email: config.client_email.clone(),
            signing_key,
            cached: Mutex::new(None),
        })
    }

    /// Get a valid access token, refreshing it if needed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Http` on transport failures and
    /// `StoreError::Backend` when the token endpoint rejects the assertion.
    pub async fn access_token(&self, client: &reqwest::Client) -> Result<SecretString, StoreError> {
        let mut cached = self.cached.lock().await;
        let now = chrono::Utc::now().timestamp();

        if let Some(token) = cached.as_ref()
            && token.expires_at - EXPIRY_MARGIN_SECS > now
        {
            return Ok(token.access_token.clone());
        }

        let assertion = self.sign_assertion(now)?;
        let response = client
            .post(TOKEN_URI)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Backend(format!(
                "token exchange failed with HTTP {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let token: TokenResponse = response.json().await?;
        let access_token = SecretString::from(token.access_token);
        *cached = Some(CachedToken {
            access_token: access_token.clone(),
            expires_at: now + token.expires_in,
        });

        tracing::debug!(client_email = %self.client_email, "Firestore access token refreshed");
        Ok(access_token)
    }

    fn sign_assertion(&self, now: i64) -> Result<String, StoreError> {
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: DATASTORE_SCOPE,
            aud: TOKEN_URI,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map_err(|e| StoreError::Backend(format!("failed to sign assertion: {e}")))
    }
}
