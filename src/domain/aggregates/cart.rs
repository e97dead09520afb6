//! Cart Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::pricing::{Fabric, PrintOption, Quote};

/// A configured, priced bag line. The figures are frozen at the moment it was added.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: Uuid,
    pub bag_type: String,
    pub fabric: Fabric,
    pub print: PrintOption,
    pub size: String,
    pub size_multiplier: Decimal,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    /// Discount rate applied, as a fraction.
    pub discount: Decimal,
    pub total: Decimal,
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    pub fn from_quote(
        bag_type: &str,
        size: &str,
        size_multiplier: Decimal,
        fabric: Fabric,
        print: PrintOption,
        quote: &Quote,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            bag_type: bag_type.to_string(),
            fabric,
            print,
            size: size.to_string(),
            size_multiplier,
            quantity: quote.quantity,
            unit_price: quote.unit_price,
            subtotal: quote.subtotal,
            discount: quote.discount_rate,
            total: quote.total,
            added_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self { Self::default() }

    pub fn from_items(items: Vec<CartItem>) -> Self { Self { items } }

    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn len(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    /// Lines are never merged; adding the same configuration twice gives two lines.
    pub fn push(&mut self, item: CartItem) { self.items.push(item); }

    pub fn remove(&mut self, id: Uuid) -> Result<CartItem, CartError> {
        let pos = self.items.iter().position(|i| i.id == id).ok_or(CartError::ItemNotFound(id))?;
        Ok(self.items.remove(pos))
    }

    pub fn clear(&mut self) { self.items.clear(); }

    pub fn total(&self) -> Decimal { self.items.iter().map(|i| i.total).sum() }

    /// Number of bags across all lines.
    pub fn item_count(&self) -> u64 { self.items.iter().map(|i| u64::from(i.quantity)).sum() }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("cart item {0} not found")]
    ItemNotFound(Uuid),
}
