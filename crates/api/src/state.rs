//! Shared application state.
//!
//! `AppState` is a cheap-to-clone handle (`Arc` inside) passed to every
//! handler via axum's `State` extractor.

use std::sync::Arc;

use crate::config::{ApiConfig, StoreBackend};
use crate::db::firestore::FirestoreStore;
use crate::db::memory::MemoryStore;
use crate::db::DocumentStore;
use crate::error::ApiError;
use crate::services::auth::AuthService;
use crate::services::catalog::CatalogService;
use crate::services::email::EmailService;
use crate::services::orders::OrderService;
use crate::services::payments::StripeClient;

/// Shared application state, cloned per request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    config: ApiConfig,
    store: Arc<dyn DocumentStore>,
    auth: AuthService,
    catalog: CatalogService,
    orders: OrderService,
    email: Option<EmailService>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("backend", &self.inner.config.backend)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Build the state from configuration, wiring the selected store
    /// backend into every service.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` when the Firestore credentials or SMTP
    /// configuration are invalid.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let store: Arc<dyn DocumentStore> = match config.backend {
            StoreBackend::Firestore => Arc::new(FirestoreStore::new(&config.firestore)?),
            StoreBackend::Memory => {
                tracing::warn!("using in-memory store; data will not survive a restart");
                Arc::new(MemoryStore::new())
            }
        };

        Self::with_store(config, store)
    }

    /// Build the state over an explicit store. Used by tests to run the
    /// full stack against [`MemoryStore`].
    ///
    /// # Errors
    ///
    /// Returns `ApiError` when the SMTP configuration is invalid.
    pub fn with_store(config: ApiConfig, store: Arc<dyn DocumentStore>) -> Result<Self, ApiError> {
        let payments = config.stripe.as_ref().map(StripeClient::new);

        let email = config
            .email
            .as_ref()
            .map(|email_config| EmailService::new(email_config, &config.public_url))
            .transpose()?;

        let auth = AuthService::new(
            Arc::clone(&store),
            config.jwt_secret.clone(),
            config.jwt_ttl_hours,
        );
        let catalog = CatalogService::new(
            Arc::clone(&store),
            config.featured_ttl_secs,
            config.featured_count,
        );
        let orders = OrderService::new(
            Arc::clone(&store),
            payments,
            config.currency,
            config.shipping_flat_rate,
            config.free_shipping_threshold,
        );

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                store,
                auth,
                catalog,
                orders,
                email,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.inner.store
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    #[must_use]
    pub fn orders(&self) -> &OrderService {
        &self.inner.orders
    }

    /// Email service, when SMTP is configured.
    #[must_use]
    pub fn email(&self) -> Option<&EmailService> {
        self.inner.email.as_ref()
    }
}
