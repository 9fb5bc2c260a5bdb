//! Transactional email over SMTP.
//!
//! Templates are compiled in with `askama`; every message is sent as
//! multipart text + HTML. Sending is best-effort from the caller's point of
//! view: checkout and registration log failures instead of failing the
//! request.

use askama::Template;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;
use thiserror::Error;

use zinoshop_core::Email;

use crate::config::EmailConfig;
use crate::db::Stored;
use crate::models::{Order, OrderItem};

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Template rendering failed: {0}")]
    Template(#[from] askama::Error),

    #[error("Invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

#[derive(Template)]
#[template(path = "email/welcome.html")]
struct WelcomeHtml<'a> {
    name: &'a str,
    store_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/welcome.txt")]
struct WelcomeText<'a> {
    name: &'a str,
    store_url: &'a str,
}

/// One order line prepared for rendering, amounts already formatted.
struct LineView {
    name: String,
    variant: Option<String>,
    quantity: u32,
    line_total: String,
}

#[derive(Template)]
#[template(path = "email/order_confirmation.html")]
struct OrderConfirmationHtml<'a> {
    name: &'a str,
    order_id: &'a str,
    lines: &'a [LineView],
    subtotal: &'a str,
    shipping: &'a str,
    total: &'a str,
    store_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/order_confirmation.txt")]
struct OrderConfirmationText<'a> {
    name: &'a str,
    order_id: &'a str,
    lines: &'a [LineView],
    subtotal: &'a str,
    shipping: &'a str,
    total: &'a str,
    store_url: &'a str,
}

#[derive(Clone)]
pub struct EmailService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    store_url: String,
}

impl EmailService {
    /// Build the SMTP transport from configuration.
    ///
    /// # Errors
    ///
    /// Returns `EmailError` when the relay host or from-address is invalid.
    pub fn new(config: &EmailConfig, store_url: &str) -> Result<Self, EmailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.expose_secret().to_owned(),
            ))
            .build();

        Ok(Self {
            transport,
            from: config.from_address.parse()?,
            store_url: store_url.to_owned(),
        })
    }

    /// Send the post-registration welcome email.
    ///
    /// # Errors
    ///
    /// Returns `EmailError` on render, build, or transport failure.
    pub async fn send_welcome(&self, to: &Email, name: &str) -> Result<(), EmailError> {
        let html = WelcomeHtml {
            name,
            store_url: &self.store_url,
        }
        .render()?;
        let text = WelcomeText {
            name,
            store_url: &self.store_url,
        }
        .render()?;

        self.send(to, "Welcome to ZinoShop", text, html).await
    }

    /// Send the order confirmation email.
    ///
    /// # Errors
    ///
    /// Returns `EmailError` on render, build, or transport failure.
    pub async fn send_order_confirmation(
        &self,
        to: &Email,
        name: &str,
        order: &Stored<Order>,
        items: &[Stored<OrderItem>],
    ) -> Result<(), EmailError> {
        let currency = order.record.currency.code();
        let lines: Vec<LineView> = items
            .iter()
            .map(|item| LineView {
                name: item.record.name.clone(),
                variant: item.record.variant.clone(),
                quantity: item.record.quantity,
                line_total: format!("{:.2} {currency}", item.record.line_total),
            })
            .collect();

        let subtotal = format!("{:.2} {currency}", order.record.subtotal);
        let shipping = format!("{:.2} {currency}", order.record.shipping);
        let total = format!("{:.2} {currency}", order.record.total);

        let html = OrderConfirmationHtml {
            name,
            order_id: &order.id,
            lines: &lines,
            subtotal: &subtotal,
            shipping: &shipping,
            total: &total,
            store_url: &self.store_url,
        }
        .render()?;
        let text = OrderConfirmationText {
            name,
            order_id: &order.id,
            lines: &lines,
            subtotal: &subtotal,
            shipping: &shipping,
            total: &total,
            store_url: &self.store_url,
        }
        .render()?;

        self.send(to, &format!("Order confirmation #{}", order.id), text, html)
            .await
    }

    async fn send(
        &self,
        to: &Email,
        subject: &str,
        text: String,
        html: String,
    ) -> Result<(), EmailError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.as_str().parse()?)
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(text, html))?;

        self.transport.send(message).await?;
        tracing::info!(to = %to, subject, "email sent");
        Ok(())
    }
}

impl std::fmt::Debug for EmailService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailService")
            .field("from", &self.from.to_string())
            .finish_non_exhaustive()
    }
}
