//! Fixed-point decimal price type
//!
//! Uses rust_decimal for deterministic arithmetic (no floating-point
//! errors). Prices are non-negative by construction.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use thiserror::Error;

/// Errors constructing a [`Price`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),

    #[error("unparseable decimal: {0}")]
    Unparseable(String),
}

/// A non-negative monetary amount
///
/// Wraps `rust_decimal::Decimal` so every price in the system shares
/// the same arithmetic and serialization behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a price, rejecting negative values
    pub fn try_new(value: Decimal) -> Result<Self, MoneyError> {
        if value.is_sign_negative() && !value.is_zero() {
            Err(MoneyError::Negative(value))
        } else {
            Ok(Self(value))
        }
    }

    /// Create from a whole number of currency units
    pub fn from_u64(value: u64) -> Self {
        Self(Decimal::from(value))
    }

    /// Parse from a decimal string (e.g., "99.99")
    pub fn from_str(s: &str) -> Result<Self, MoneyError> {
        let value = s
            .parse::<Decimal>()
            .map_err(|_| MoneyError::Unparseable(s.to_string()))?;
        Self::try_new(value)
    }

    /// Zero price
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Get the inner decimal value
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Check if the price is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checked addition, None on decimal overflow
    pub fn checked_add(&self, other: Price) -> Option<Price> {
        self.0.checked_add(other.0).map(Price)
    }
}

/// Sum of two non-negative prices is non-negative
impl Add for Price {
    type Output = Price;

    fn add(self, other: Price) -> Price {
        Price(self.0 + other.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
