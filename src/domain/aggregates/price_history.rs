//! Price history
//!
//! Append-only audit trail of price changes. Rows are only ever inserted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::value_objects::round_money;
use crate::pricing;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Increase,
    Decrease,
}

impl ChangeType {
    /// Positive changes are increases; zero and negative changes are recorded as decreases.
    pub fn classify(percentage: Decimal) -> Self {
        if percentage > Decimal::ZERO { Self::Increase } else { Self::Decrease }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increase => "increase",
            Self::Decrease => "decrease",
        }
    }
}

impl FromStr for ChangeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "increase" => Ok(Self::Increase),
            "decrease" => Ok(Self::Decrease),
            other => Err(format!("unknown change type '{other}'")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    pub id: i64,
    pub change_type: ChangeType,
    pub percentage_change: Decimal,
    pub reason: Option<String>,
    pub affected_products: i32,
    pub product_id: Option<i64>,
    pub product_name: Option<String>,
    pub old_price: Option<Decimal>,
    pub new_price: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

/// A history row before the store assigns its id and timestamp.
#[derive(Clone, Debug, PartialEq)]
pub struct NewPriceHistory {
    pub change_type: ChangeType,
    pub percentage_change: Decimal,
    pub reason: String,
    pub affected_products: i32,
    pub product_id: Option<i64>,
    pub product_name: Option<String>,
    pub old_price: Option<Decimal>,
    pub new_price: Option<Decimal>,
}

impl NewPriceHistory {
    pub fn bulk(percentage: Decimal, reason: &str, affected_products: u64) -> Self {
        Self {
            change_type: ChangeType::classify(percentage),
            percentage_change: percentage,
            reason: reason.to_string(),
            affected_products: i32::try_from(affected_products).unwrap_or(i32::MAX),
            product_id: None,
            product_name: None,
            old_price: None,
            new_price: None,
        }
    }

    pub fn single(product_id: i64, product_name: &str, old_price: Decimal, new_price: Decimal, reason: &str) -> Self {
        let percentage = pricing::percentage_delta(old_price, new_price);
        Self {
            change_type: ChangeType::classify(percentage),
            percentage_change: percentage,
            reason: reason.to_string(),
            affected_products: 1,
            product_id: Some(product_id),
            product_name: Some(product_name.to_string()),
            old_price: Some(old_price),
            new_price: Some(new_price),
        }
    }

    pub fn into_record(self, id: i64, created_at: DateTime<Utc>) -> PriceHistory {
        PriceHistory {
            id,
            change_type: self.change_type,
            percentage_change: self.percentage_change,
            reason: Some(self.reason),
            affected_products: self.affected_products,
            product_id: self.product_id,
            product_name: self.product_name,
            old_price: self.old_price,
            new_price: self.new_price,
            created_at,
        }
    }
}

/// Summary figures shown above the history table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryStats {
    pub total_changes: usize,
    pub total_increases: usize,
    pub total_decreases: usize,
    pub avg_increase: Decimal,
    /// Average magnitude of decreases (a positive number).
    pub avg_decrease: Decimal,
    pub last_change: Option<DateTime<Utc>>,
}

impl PriceHistoryStats {
    /// `records` must be newest first, as the stores return them.
    pub fn from_records(records: &[PriceHistory]) -> Self {
        let (increases, decreases): (Vec<_>, Vec<_>) =
            records.iter().partition(|r| r.change_type == ChangeType::Increase);
        let average = |items: &[&PriceHistory]| {
            if items.is_empty() {
                return Decimal::ZERO;
            }
            let sum: Decimal = items.iter().map(|r| r.percentage_change.abs()).sum();
            round_money(sum / Decimal::from(items.len()))
        };
        Self {
            total_changes: records.len(),
            total_increases: increases.len(),
            total_decreases: decreases.len(),
            avg_increase: average(&increases),
            avg_decrease: average(&decreases),
            last_change: records.first().map(|r| r.created_at),
        }
    }
}
