//! Client-side checks for the price forms.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::domain::aggregates::Product;
use crate::domain::value_objects::{round_money, MAX_PRICE};
use crate::pricing::{self, PricingError};

/// Rows shown in the bulk-change preview.
pub const PREVIEW_ROWS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceFormError {
    #[error("price cannot be negative")]
    Negative,
    #[error("price cannot exceed {max}", max = MAX_PRICE)]
    TooLarge,
    #[error("new price is the same as the current price")]
    Unchanged,
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Returns the rounded new price. Rejects out-of-range prices and no-op edits.
pub fn validate_price_edit(current: Decimal, new: Decimal) -> Result<Decimal, PriceFormError> {
    let new = round_money(new);
    if new < Decimal::ZERO {
        return Err(PriceFormError::Negative);
    }
    if new > MAX_PRICE {
        return Err(PriceFormError::TooLarge);
    }
    if new == round_money(current) {
        return Err(PriceFormError::Unchanged);
    }
    Ok(new)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PreviewRow {
    pub id: i64,
    pub name: String,
    pub old_price: Decimal,
    pub new_price: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BulkPreview {
    pub percentage: Decimal,
    pub affected_products: usize,
    pub rows: Vec<PreviewRow>,
    /// Products not listed in `rows`.
    pub remaining: usize,
}

impl BulkPreview {
    /// `None` for a zero percentage, which the form does not preview.
    pub fn build(products: &[Product], percentage: Decimal) -> Result<Option<Self>, PriceFormError> {
        let percentage = pricing::validate_bulk_percentage(percentage)?;
        if percentage.is_zero() {
            return Ok(None);
        }
        let rows = products.iter().take(PREVIEW_ROWS).map(|p| {
            pricing::apply_percentage(p.price, percentage).map(|new_price| PreviewRow {
                id: p.id,
                name: p.name.clone(),
                old_price: p.price,
                new_price,
            })
        }).collect::<Result<Vec<_>, _>>()?;
        Ok(Some(Self {
            percentage,
            affected_products: products.len(),
            rows,
            remaining: products.len().saturating_sub(PREVIEW_ROWS),
        }))
    }
}
