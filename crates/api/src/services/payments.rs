//! Stripe payment intent client.
//!
//! Talks to the Stripe REST API directly: one form-encoded `POST
//! /v1/payment_intents` per card checkout. The returned `client_secret` is
//! handed to the storefront, which completes the payment with Stripe.js;
//! the server never sees card numbers.

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

use zinoshop_core::{Money, MoneyError};

use crate::config::StripeConfig;

const STRIPE_API_URL: &str = "https://api.stripe.com/v1";

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Payment provider unreachable: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Payment provider rejected the request: {0}")]
    Api(String),

    #[error("Invalid payment amount: {0}")]
    Amount(#[from] MoneyError),
}

/// A created payment intent, as returned to the storefront.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    /// Secret the browser uses with Stripe.js to confirm the payment.
    pub client_secret: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: String,
}

#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    secret_key: SecretString,
}

impl StripeClient {
    #[must_use]
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            client: Client::new(),
            secret_key: config.secret_key.clone(),
        }
    }

    /// Create a payment intent for an order.
    ///
    /// Amounts are sent in the currency's minor units (cents for USD), per
    /// the Stripe API. The order id rides along as metadata so webhook
    /// consumers and the dashboard can tie the intent back to the order.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Amount` when the total does not convert to
    /// minor units, `PaymentError::Api` when Stripe rejects the request.
    pub async fn create_payment_intent(
        &self,
        amount: &Money,
        order_id: &str,
        receipt_email: Option<&str>,
    ) -> Result<PaymentIntent, PaymentError> {
        let minor_units = amount.to_minor_units()?;

        let mut form: Vec<(&str, String)> = vec![
            ("amount", minor_units.to_string()),
            ("currency", amount.currency.lower().to_owned()),
            ("metadata[order_id]", order_id.to_owned()),
            ("automatic_payment_methods[enabled]", "true".to_owned()),
        ];
        if let Some(email) = receipt_email {
            form.push(("receipt_email", email.to_owned()));
        }

        let response = self
            .client
            .post(format!("{STRIPE_API_URL}/payment_intents"))
            .bearer_auth(self.secret_key.expose_secret())
            .form(&form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<StripeErrorBody>()
                .await
                .map_or_else(|_| format!("HTTP {status}"), |body| body.error.message);
            return Err(PaymentError::Api(message));
        }

        Ok(response.json().await?)
    }
}

impl std::fmt::Debug for StripeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeClient").finish_non_exhaustive()
    }
}
