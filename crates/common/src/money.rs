//! Money amounts in integer cents.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest decimal amount accepted from the wire.
const MAX_DECIMAL: f64 = 1e13;

/// Money amount represented in cents to avoid floating point drift.
///
/// On the wire it is a decimal number of currency units (`10.99`), rounded
/// to the nearest cent on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Money {
    cents: i64,
}

/// A decimal amount that cannot be represented as money.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("invalid money amount: {0}")]
pub struct InvalidAmount(pub f64);

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Converts a decimal amount, rounding to the nearest cent.
    pub fn from_decimal(amount: f64) -> Result<Self, InvalidAmount> {
        if !amount.is_finite() || amount.abs() > MAX_DECIMAL {
            return Err(InvalidAmount(amount));
        }
        Ok(Self {
            cents: (amount * 100.0).round() as i64,
        })
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the amount as a decimal number of currency units.
    pub fn as_decimal(&self) -> f64 {
        self.cents as f64 / 100.0
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.cents < 0
    }

    /// Multiplies by a quantity, saturating on overflow.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            cents: self.cents.saturating_mul(i64::from(quantity)),
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.cents < 0 { "-" } else { "" };
        let abs = self.cents.unsigned_abs();
        write!(f, "{sign}${}.{:02}", abs / 100, abs % 100)
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents.saturating_add(rhs.cents),
        }
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl TryFrom<f64> for Money {
    type Error = InvalidAmount;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Money::from_decimal(value)
    }
}

impl From<Money> for f64 {
    fn from(money: Money) -> Self {
        money.as_decimal()
    }
}
