//! Coins type
//!
//! Domain primitive for coin amounts moved by transfers and purchases.
//! Amounts are validated at construction time, so a zero or negative
//! transfer can never reach the stores.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coins represents a validated, strictly positive number of coins.
///
/// # Invariants
/// - Value is always positive (> 0)
///
/// # Example
/// ```
/// use merch_store::domain::Coins;
///
/// let amount = Coins::new(100).unwrap();
/// assert_eq!(amount.value(), 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Coins(i64);

/// Errors that can occur when creating a Coins value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoinsError {
    #[error("Amount must be positive (got {0})")]
    NotPositive(i64),
}

impl Coins {
    /// Create a new Coins value with validation.
    ///
    /// # Errors
    /// - `CoinsError::NotPositive` if value <= 0
    pub fn new(value: i64) -> Result<Self, CoinsError> {
        if value <= 0 {
            return Err(CoinsError::NotPositive(value));
        }
        Ok(Self(value))
    }

    /// Get the underlying integer value.
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Check if a balance covers this amount.
    pub fn is_covered_by(&self, balance: i64) -> bool {
        balance >= self.0
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Coins {
    type Error = CoinsError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Coins::new(value)
    }
}

impl From<Coins> for i64 {
    fn from(coins: Coins) -> Self {
        coins.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coins_positive() {
        let coins = Coins::new(100);
        assert!(coins.is_ok());
        assert_eq!(coins.unwrap().value(), 100);
    }

    #[test]
    fn test_coins_zero_rejected() {
        assert_eq!(Coins::new(0), Err(CoinsError::NotPositive(0)));
    }

    #[test]
    fn test_coins_negative_rejected() {
        assert!(matches!(Coins::new(-5), Err(CoinsError::NotPositive(-5))));
    }

    #[test]
    fn test_coins_is_covered_by() {
        let price = Coins::new(60).unwrap();
        assert!(price.is_covered_by(60));
        assert!(price.is_covered_by(100));
        assert!(!price.is_covered_by(40));
    }

    #[test]
    fn test_coins_deserialize_rejects_zero() {
        let parsed: Result<Coins, _> = serde_json::from_str("0");
        assert!(parsed.is_err());

        let parsed: Coins = serde_json::from_str("30").unwrap();
        assert_eq!(parsed.value(), 30);
    }
}
