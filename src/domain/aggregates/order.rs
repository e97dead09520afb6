//! Order Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

/// Order lifecycle: pending → confirmed → production → shipped → delivered,
/// with cancelled reachable from anywhere.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Production,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        Self::Pending, Self::Confirmed, Self::Production, Self::Shipped, Self::Delivered, Self::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Production => "production",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool { matches!(self, Self::Delivered | Self::Cancelled) }

    /// Position along the fulfilment pipeline; `None` for cancelled.
    fn stage(&self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::Confirmed => Some(1),
            Self::Production => Some(2),
            Self::Shipped => Some(3),
            Self::Delivered => Some(4),
            Self::Cancelled => None,
        }
    }

    /// Cancelling is always allowed and re-writing the current status is a no-op.
    /// Otherwise only forward moves out of a non-terminal status are allowed;
    /// skipping stages is fine.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if next == Self::Cancelled || next == *self {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        matches!((self.stage(), next.stage()), (Some(from), Some(to)) if to > from)
    }

    /// Validate a move to `next`. With `strict` off any known status is accepted.
    pub fn transition_to(&self, next: OrderStatus, strict: bool) -> Result<OrderStatus, TransitionError> {
        if strict && !self.can_transition_to(next) {
            return Err(TransitionError::NotAllowed { from: *self, to: next });
        }
        Ok(next)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for OrderStatus {
    type Err = TransitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| TransitionError::UnknownStatus(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("unknown order status '{0}'")]
    UnknownStatus(String),
    #[error("order cannot move from {from} to {to}")]
    NotAllowed { from: OrderStatus, to: OrderStatus },
}

/// An order as listed to admins, joined with its customer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    pub customer_id: i64,
    pub customer_name: String,
    pub customer_email: String,
    pub product_type: String,
    pub product_color: String,
    pub product_size: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn full_name(&self) -> String { format!("{} {}", self.first_name, self.last_name) }
}

/// Customer details collected by the checkout form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewCustomer {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 5, max = 30))]
    pub phone: String,
    #[validate(length(min = 1, max = 500))]
    pub address: String,
}

/// A priced order ready to be stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub order_number: String,
    pub customer: NewCustomer,
    pub product_type: String,
    pub product_color: String,
    pub product_size: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total: Decimal,
}

/// `ORD-YYMMDD-XXXXXX`, with a random hex suffix.
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string()[..6].to_uppercase();
    format!("ORD-{}-{}", now.format("%y%m%d"), suffix)
}
