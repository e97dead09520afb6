//! Value Objects for the storefront

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Decimal places kept for every monetary amount.
pub const MONEY_DP: u32 = 2;

/// Largest price a product can carry (`NUMERIC(10, 2)`).
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Round a monetary amount to two decimals, half away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Price between zero and [`MAX_PRICE`], always held at two decimals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Price = Price(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        let amount = round_money(amount);
        if amount > MAX_PRICE {
            return Err(PriceError::TooLarge(amount));
        }
        Ok(Self(amount))
    }

    pub fn amount(&self) -> Decimal { self.0 }
    pub fn is_zero(&self) -> bool { self.0.is_zero() }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;
    fn try_from(value: Decimal) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self { price.0 }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:.2}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
    #[error("price cannot exceed {max} (got {0})", max = MAX_PRICE)]
    TooLarge(Decimal),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(Decimal::new(12345, 3)), Decimal::new(1235, 2));
        assert_eq!(round_money(Decimal::new(-12345, 3)), Decimal::new(-1235, 2));
    }

    #[test]
    fn test_price_rejects_negative() {
        assert_eq!(Price::new(Decimal::new(-1, 2)), Err(PriceError::Negative(Decimal::new(-1, 2))));
        assert!(Price::new(Decimal::ZERO).unwrap().is_zero());
    }

    #[test]
    fn test_price_upper_bound() {
        assert_eq!(MAX_PRICE, "99999999.99".parse::<Decimal>().unwrap());
        assert_eq!(Price::new(MAX_PRICE).unwrap().amount(), MAX_PRICE);
        let too_much = Decimal::new(1_000_000_000_000, 0);
        assert_eq!(Price::new(too_much), Err(PriceError::TooLarge(too_much)));
        assert!(serde_json::from_str::<Price>("5e28").is_err());
    }

    #[test]
    fn test_price_rounds_and_displays() {
        let p = Price::new(Decimal::new(29999, 4)).unwrap();
        assert_eq!(p.amount(), Decimal::new(300, 2));
        assert_eq!(p.to_string(), "3.00");
    }

    #[test]
    fn test_price_deserialize_rejects_negative() {
        assert!(serde_json::from_str::<Price>("-5").is_err());
        let p: Price = serde_json::from_str("2.5").unwrap();
        assert_eq!(p.amount(), Decimal::new(25, 1));
    }
}
