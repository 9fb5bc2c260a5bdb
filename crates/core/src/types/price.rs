//! Monetary amounts using decimal arithmetic.
//!
//! All prices and order totals use [`rust_decimal::Decimal`] - never floats -
//! so that `subtotal == sum(price * quantity)` holds exactly.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Errors that can occur when working with [`Money`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum MoneyError {
    /// Amount is negative where a non-negative amount is required.
    #[error("amount cannot be negative: {0}")]
    Negative(Decimal),
    /// Amount does not fit the payment provider's minor-unit integer.
    #[error("amount out of range for minor units: {0}")]
    OutOfRange(Decimal),
}

/// A monetary amount with its currency.
///
/// Amounts are in the currency's standard unit (e.g. dollars, not cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in the currency's standard unit.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency: CurrencyCode,
}

impl Money {
    /// Create a new amount.
    #[must_use]
    pub const fn new(amount: Decimal, currency: CurrencyCode) -> Self {
        Self { amount, currency }
    }

    /// Zero in the given currency.
    #[must_use]
    pub const fn zero(currency: CurrencyCode) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    /// Line total for a quantity of this amount.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self {
            amount: self.amount * Decimal::from(quantity),
            currency: self.currency,
        }
    }

    /// Add another amount in the same currency.
    ///
    /// Returns `None` when currencies differ; the caller decides whether
    /// that is a data-corruption error or a bad request.
    #[must_use]
    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        if self.currency != other.currency {
            return None;
        }
        Some(Self {
            amount: self.amount + other.amount,
            currency: self.currency,
        })
    }

    /// Convert to the payment provider's minor units (e.g. cents for USD).
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Negative` for negative amounts and
    /// `MoneyError::OutOfRange` when the scaled value does not fit in `i64`.
    pub fn to_minor_units(&self) -> Result<i64, MoneyError> {
        if self.amount.is_sign_negative() {
            return Err(MoneyError::Negative(self.amount));
        }
        let scaled = (self.amount * Decimal::from(100_u32)).round();
        scaled.to_i64().ok_or(MoneyError::OutOfRange(self.amount))
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} {}", self.amount, self.currency.code())
    }
}

/// ISO 4217 currency codes supported by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// The ISO 4217 code as a string.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }

    /// Lowercase code as expected by the payment provider.
    #[must_use]
    pub fn lower(&self) -> String {
        self.code().to_lowercase()
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            other => Err(format!("unsupported currency: {other}")),
        }
    }
}
