//! Integration test harness for ZinoShop.
//!
//! Drives the full axum router in-process over the in-memory store; no
//! external services are needed. Each [`TestApp`] is a fresh, isolated
//! store.
//!
//! ```bash
//! cargo test -p zinoshop-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode, header};
use rust_decimal::{Decimal, dec};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

use zinoshop_api::config::{ApiConfig, FirestoreConfig, StoreBackend};
use zinoshop_api::db::memory::MemoryStore;
use zinoshop_api::db::{DocumentStore, collections, to_fields};
use zinoshop_api::models::Product;
use zinoshop_api::state::AppState;
use zinoshop_core::{CurrencyCode, ProductCategory};

/// Configuration for the in-process test server: memory backend, no email,
/// no payments.
#[must_use]
pub fn test_config() -> ApiConfig {
    ApiConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        public_url: "http://localhost".to_owned(),
        jwt_secret: SecretString::from("qN7#fK2$wX9!dR4@zT6^bM1*vC8&hJ3%"),
        jwt_ttl_hours: 24,
        backend: StoreBackend::Memory,
        currency: CurrencyCode::USD,
        shipping_flat_rate: dec!(12),
        free_shipping_threshold: dec!(150),
        featured_ttl_secs: 300,
        featured_count: 8,
        firestore: FirestoreConfig {
            project_id: "zinoshop-test".to_owned(),
            emulator_host: None,
            service_account: None,
        },
        email: None,
        stripe: None,
        cors_origin: None,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// An in-process instance of the API over a fresh memory store.
pub struct TestApp {
    router: Router,
    store: Arc<MemoryStore>,
    /// Gives every request a distinct client IP so the per-IP rate
    /// limiters never interfere with tests.
    ip_counter: AtomicU32,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::with_store(
            test_config(),
            Arc::clone(&store) as Arc<dyn DocumentStore>,
        )
        .unwrap();

        Self {
            router: zinoshop_api::routes::router(state),
            store,
            ip_counter: AtomicU32::new(1),
        }
    }

    /// Direct handle on the underlying store, for seeding and assertions.
    #[must_use]
    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    /// Send a request and return its status plus parsed JSON body (or
    /// `Value::Null` for empty bodies).
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let n = self.ip_counter.fetch_add(1, Ordering::Relaxed);
        let client_ip = format!("10.1.{}.{}", n / 256, n % 256);

        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-for", client_ip);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let mut request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        request.extensions_mut().insert(ConnectInfo(SocketAddr::new(
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            40000,
        )));

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, value)
    }

    /// Register a customer account; returns (token, `user_id`).
    pub async fn register(&self, email: &str, password: &str, name: &str) -> (String, String) {
        let (status, body) = self
            .request(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({ "email": email, "password": password, "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");

        (
            body["token"].as_str().unwrap().to_owned(),
            body["user"]["id"].as_str().unwrap().to_owned(),
        )
    }

    /// Register a customer, promote it to admin directly in the store,
    /// and log in again so the token carries the admin role.
    pub async fn register_admin(&self, email: &str, password: &str) -> (String, String) {
        let (_, user_id) = self.register(email, password, "Admin").await;

        self.store
            .update(collections::USERS, &user_id, json!({ "role": "admin" }))
            .await
            .unwrap();

        let (status, body) = self
            .request(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "admin login failed: {body}");

        (body["token"].as_str().unwrap().to_owned(), user_id)
    }

    /// Seed a product directly in the store; returns its id.
    pub async fn seed_product(&self, name: &str, price: Decimal, stock: u32) -> String {
        self.seed_product_full(name, price, stock, 4.0, true, vec![])
            .await
    }

    /// Seed a product with full control over rating, active flag, and
    /// variants.
    pub async fn seed_product_full(
        &self,
        name: &str,
        price: Decimal,
        stock: u32,
        rating: f64,
        active: bool,
        variants: Vec<String>,
    ) -> String {
        let product = Product {
            name: name.to_owned(),
            description: format!("{name} description"),
            category: ProductCategory::Rings,
            material: "18k gold".to_owned(),
            price,
            compare_at_price: None,
            stock,
            images: vec![],
            variants,
            rating,
            rating_count: 10,
            active,
        };

        self.store
            .create(collections::PRODUCTS, None, to_fields(&product).unwrap())
            .await
            .unwrap()
            .id
    }

    /// Standard shipping address payload for checkout requests.
    #[must_use]
    pub fn shipping_address() -> Value {
        json!({
            "name": "Ada Lovelace",
            "line1": "1 Jewel St",
            "city": "London",
            "postal_code": "EC1",
            "country": "GB"
        })
    }
}
