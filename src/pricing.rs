//! Pricing engine
//!
//! Turns a bag configuration (base price, size multiplier, fabric, print, quantity)
//! into a [`Quote`]. The same arithmetic backs the storefront configurator, the
//! server-side order intake, and the admin price-change operations.
//!
//! Every monetary output is rounded to two decimals (half away from zero). The unit
//! price is rounded before it is multiplied out, so `subtotal == unit_price * quantity`
//! holds for the figures shown to the customer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::value_objects::{round_money, MAX_PRICE};

/// Premium fabric costs 30% more.
pub const PREMIUM_FABRIC_FACTOR: Decimal = Decimal::from_parts(13, 0, 0, false, 1);
/// Custom print adds a flat amount per bag.
pub const CUSTOM_PRINT_SURCHARGE: Decimal = Decimal::ONE;
/// Orders of at least this many bags get the bulk discount.
pub const BULK_DISCOUNT_THRESHOLD: u32 = 500;
/// Bulk discount rate (10%).
pub const BULK_DISCOUNT_RATE: Decimal = Decimal::from_parts(1, 0, 0, false, 1);
/// Quantity step used by the +/- buttons.
pub const QUANTITY_STEP: u32 = 100;
/// Floor for stepping down when no size is selected yet.
pub const DEFAULT_MIN_QUANTITY: u32 = 1000;
/// Lowest accepted bulk percentage; anything below would drive prices negative.
pub const MIN_BULK_PERCENTAGE: Decimal = Decimal::from_parts(100, 0, 0, true, 0);
/// Highest accepted bulk percentage.
pub const MAX_BULK_PERCENTAGE: Decimal = Decimal::from_parts(99999, 0, 0, false, 2);

/// Largest order total the orders table holds (`NUMERIC(12, 2)`).
pub const MAX_ORDER_TOTAL: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fabric {
    #[default]
    Standard,
    Premium,
}

impl Fabric {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Standard => "Standard fabric",
            Self::Premium => "Premium fabric",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintOption {
    #[default]
    None,
    Custom,
}

impl PrintOption {
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "Unprinted",
            Self::Custom => "Custom print",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub base_price: Decimal,
    #[serde(default = "default_multiplier")]
    pub size_multiplier: Decimal,
    #[serde(default)]
    pub fabric: Fabric,
    #[serde(default)]
    pub print: PrintOption,
    pub quantity: u32,
}

fn default_multiplier() -> Decimal { Decimal::ONE }

impl QuoteRequest {
    pub fn new(base_price: Decimal, quantity: u32) -> Self {
        Self { base_price, size_multiplier: Decimal::ONE, fabric: Fabric::Standard, print: PrintOption::None, quantity }
    }

    pub fn with_multiplier(mut self, multiplier: Decimal) -> Self { self.size_multiplier = multiplier; self }
    pub fn with_fabric(mut self, fabric: Fabric) -> Self { self.fabric = fabric; self }
    pub fn with_print(mut self, print: PrintOption) -> Self { self.print = print; self }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub unit_price: Decimal,
    pub quantity: u32,
    pub subtotal: Decimal,
    /// Fraction, e.g. `0.1` for 10%.
    pub discount_rate: Decimal,
    pub discount_amount: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("base price cannot be negative")]
    NegativeBasePrice,
    #[error("size multiplier must be positive")]
    NonPositiveMultiplier,
    #[error("quantity must be at least 1")]
    ZeroQuantity,
    #[error("percentage change must be between {min} and {max} (got {got})")]
    PercentageOutOfRange { min: Decimal, max: Decimal, got: Decimal },
    #[error("price cannot exceed {max} (got {0})", max = MAX_PRICE)]
    PriceTooLarge(Decimal),
    #[error("order total cannot exceed {max} (got {0})", max = MAX_ORDER_TOTAL)]
    TotalTooLarge(Decimal),
    #[error("amount is out of range")]
    Overflow,
}

/// Unit price before discount, rounded to two decimals.
pub fn unit_price(req: &QuoteRequest) -> Result<Decimal, PricingError> {
    let mut price = req.base_price.checked_mul(req.size_multiplier).ok_or(PricingError::Overflow)?;
    if req.fabric == Fabric::Premium {
        price = price.checked_mul(PREMIUM_FABRIC_FACTOR).ok_or(PricingError::Overflow)?;
    }
    if req.print == PrintOption::Custom {
        price = price.checked_add(CUSTOM_PRINT_SURCHARGE).ok_or(PricingError::Overflow)?;
    }
    let price = round_money(price);
    if price > MAX_PRICE {
        return Err(PricingError::PriceTooLarge(price));
    }
    Ok(price)
}

pub fn discount_rate(quantity: u32) -> Decimal {
    if quantity >= BULK_DISCOUNT_THRESHOLD { BULK_DISCOUNT_RATE } else { Decimal::ZERO }
}

pub fn quote(req: &QuoteRequest) -> Result<Quote, PricingError> {
    if req.base_price.is_sign_negative() && !req.base_price.is_zero() {
        return Err(PricingError::NegativeBasePrice);
    }
    if req.size_multiplier <= Decimal::ZERO {
        return Err(PricingError::NonPositiveMultiplier);
    }
    if req.quantity == 0 {
        return Err(PricingError::ZeroQuantity);
    }

    let unit_price = unit_price(req)?;
    let subtotal = unit_price.checked_mul(Decimal::from(req.quantity)).map(round_money).ok_or(PricingError::Overflow)?;
    let discount_rate = discount_rate(req.quantity);
    let discount_amount = subtotal.checked_mul(discount_rate).map(round_money).ok_or(PricingError::Overflow)?;
    let total = subtotal - discount_amount;
    if total > MAX_ORDER_TOTAL {
        return Err(PricingError::TotalTooLarge(total));
    }
    Ok(Quote { unit_price, quantity: req.quantity, subtotal, discount_rate, discount_amount, total })
}

// =============================================================================
// Admin price changes
// =============================================================================

/// `round(price * (1 + percentage / 100), 2)`, refused when it leaves the price range.
pub fn apply_percentage(price: Decimal, percentage: Decimal) -> Result<Decimal, PricingError> {
    let factor = percentage.checked_div(HUNDRED).and_then(|p| p.checked_add(Decimal::ONE)).ok_or(PricingError::Overflow)?;
    let repriced = price.checked_mul(factor).map(round_money).ok_or(PricingError::Overflow)?;
    if repriced > MAX_PRICE {
        return Err(PricingError::PriceTooLarge(repriced));
    }
    Ok(repriced)
}

/// Percentage change from `old` to `new`, rounded to two decimals.
///
/// A zero old price has no meaningful ratio: a move to a positive price counts as
/// +100%, staying at zero as 0%. For prices within [`MAX_PRICE`] the result stays
/// below 10^12, which `price_history.percentage_change` holds.
pub fn percentage_delta(old: Decimal, new: Decimal) -> Decimal {
    if old.is_zero() {
        return if new.is_zero() { Decimal::ZERO } else { HUNDRED };
    }
    round_money((new - old) / old * HUNDRED)
}

pub fn validate_bulk_percentage(percentage: Decimal) -> Result<Decimal, PricingError> {
    if percentage < MIN_BULK_PERCENTAGE || percentage > MAX_BULK_PERCENTAGE {
        return Err(PricingError::PercentageOutOfRange { min: MIN_BULK_PERCENTAGE, max: MAX_BULK_PERCENTAGE, got: percentage });
    }
    Ok(round_money(percentage))
}

// =============================================================================
// Quantity helpers
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Up,
    Down,
}

pub fn meets_minimum(quantity: u32, minimum: u32) -> bool { quantity >= minimum }

/// Preset buttons offered for a size: the minimum, 1.5x, 2x and 3x.
pub fn quantity_presets(minimum: u32) -> [u32; 4] {
    [minimum, minimum + minimum.div_ceil(2), minimum * 2, minimum * 3]
}

/// Step the quantity by [`QUANTITY_STEP`]; stepping down never goes below the minimum.
pub fn step_quantity(current: u32, step: Step, minimum: Option<u32>) -> u32 {
    match step {
        Step::Up => current.saturating_add(QUANTITY_STEP),
        Step::Down => current.saturating_sub(QUANTITY_STEP).max(minimum.unwrap_or(DEFAULT_MIN_QUANTITY)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal { s.parse().unwrap() }

    #[test]
    fn test_reference_quote() {
        let q = quote(&QuoteRequest::new(dec("2.5"), 600)).unwrap();
        assert_eq!(q.unit_price, dec("2.50"));
        assert_eq!(q.subtotal, dec("1500.00"));
        assert_eq!(q.discount_rate, dec("0.1"));
        assert_eq!(q.discount_amount, dec("150.00"));
        assert_eq!(q.total, dec("1350.00"));
    }

    #[test]
    fn test_discount_threshold() {
        assert_eq!(discount_rate(499), Decimal::ZERO);
        assert_eq!(discount_rate(500), dec("0.1"));
        assert_eq!(discount_rate(10_000), dec("0.1"));
        assert_eq!(discount_rate(1), Decimal::ZERO);
    }

    #[test]
    fn test_premium_and_print_adjustments() {
        let req = QuoteRequest::new(dec("3.00"), 100).with_fabric(Fabric::Premium);
        assert_eq!(unit_price(&req).unwrap(), dec("3.90"));
        let req = req.with_print(PrintOption::Custom);
        assert_eq!(unit_price(&req).unwrap(), dec("4.90"));
        let q = quote(&req).unwrap();
        assert_eq!(q.subtotal, dec("490.00"));
        assert_eq!(q.total, dec("490.00"));
    }

    #[test]
    fn test_size_multiplier_and_unit_rounding() {
        let req = QuoteRequest::new(dec("2.5"), 3).with_multiplier(dec("1.15"));
        // 2.875 rounds half away from zero
        assert_eq!(unit_price(&req).unwrap(), dec("2.88"));
        assert_eq!(quote(&req).unwrap().subtotal, dec("8.64"));
    }

    #[test]
    fn test_quote_rejects_bad_input() {
        assert_eq!(quote(&QuoteRequest::new(dec("-1"), 10)), Err(PricingError::NegativeBasePrice));
        assert_eq!(quote(&QuoteRequest::new(dec("1"), 0)), Err(PricingError::ZeroQuantity));
        let req = QuoteRequest::new(dec("1"), 1).with_multiplier(Decimal::ZERO);
        assert_eq!(quote(&req), Err(PricingError::NonPositiveMultiplier));
    }

    #[test]
    fn test_quote_rejects_out_of_range_amounts() {
        let huge = Decimal::MAX;
        let req = QuoteRequest::new(huge, 10).with_multiplier(dec("2"));
        assert_eq!(quote(&req), Err(PricingError::Overflow));
        let req = QuoteRequest::new(huge, 1).with_multiplier(dec("0.5"));
        assert!(matches!(quote(&req), Err(PricingError::PriceTooLarge(_))));

        let req = QuoteRequest::new(MAX_PRICE, 1).with_fabric(Fabric::Premium);
        assert!(matches!(quote(&req), Err(PricingError::PriceTooLarge(_))));

        let req = QuoteRequest::new(MAX_PRICE, 1000);
        assert!(matches!(quote(&req), Err(PricingError::TotalTooLarge(_))));
        assert!(quote(&QuoteRequest::new(MAX_PRICE, 100)).is_ok());
    }

    #[test]
    fn test_apply_percentage() {
        assert_eq!(apply_percentage(dec("2.50"), dec("10")).unwrap(), dec("2.75"));
        assert_eq!(apply_percentage(dec("3.33"), dec("-5")).unwrap(), dec("3.16"));
        assert_eq!(apply_percentage(dec("4.00"), dec("-100")).unwrap(), Decimal::ZERO);
        assert_eq!(apply_percentage(dec("1.05"), dec("50")).unwrap(), dec("1.58"));
        assert!(matches!(apply_percentage(MAX_PRICE, dec("1")), Err(PricingError::PriceTooLarge(_))));
    }

    #[test]
    fn test_percentage_delta() {
        assert_eq!(percentage_delta(dec("2.00"), dec("2.50")), dec("25.00"));
        assert_eq!(percentage_delta(dec("3.00"), dec("2.00")), dec("-33.33"));
        assert_eq!(percentage_delta(dec("2.00"), dec("2.00")), Decimal::ZERO);
        assert_eq!(percentage_delta(Decimal::ZERO, dec("1")), dec("100"));
        assert_eq!(percentage_delta(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
        // widest swing a bounded price allows
        assert_eq!(percentage_delta(dec("0.01"), MAX_PRICE), dec("999999999800"));
    }

    #[test]
    fn test_bulk_percentage_bounds() {
        assert!(validate_bulk_percentage(dec("-100")).is_ok());
        assert!(validate_bulk_percentage(dec("-100.01")).is_err());
        assert!(validate_bulk_percentage(dec("1000")).is_err());
        assert_eq!(validate_bulk_percentage(dec("7.125")).unwrap(), dec("7.13"));
    }

    #[test]
    fn test_quantity_helpers() {
        assert_eq!(quantity_presets(2500), [2500, 3750, 5000, 7500]);
        assert_eq!(quantity_presets(1501), [1501, 2252, 3002, 4503]);
        assert_eq!(step_quantity(2500, Step::Up, Some(2500)), 2600);
        assert_eq!(step_quantity(2500, Step::Down, Some(2500)), 2500);
        assert_eq!(step_quantity(1050, Step::Down, None), 1000);
        assert!(meets_minimum(1500, 1500));
        assert!(!meets_minimum(1499, 1500));
    }
}
