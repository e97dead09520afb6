//! Domain events
//!
//! Published as JSON on `<prefix>.<subject>` when a message bus is configured.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::aggregates::OrderStatus;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "domain", rename_all = "snake_case")]
pub enum DomainEvent {
    Price(PriceEvent),
    Order(OrderEvent),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PriceEvent {
    BulkChanged { percentage: Decimal, affected_products: i32, reason: String, at: DateTime<Utc> },
    ProductRepriced { product_id: i64, old_price: Decimal, new_price: Decimal, at: DateTime<Utc> },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    Placed { order_id: i64, order_number: String, total: Decimal },
    StatusChanged { order_id: i64, from: OrderStatus, to: OrderStatus },
}

impl DomainEvent {
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Price(PriceEvent::BulkChanged { .. }) => "prices.bulk_changed",
            Self::Price(PriceEvent::ProductRepriced { .. }) => "prices.product_repriced",
            Self::Order(OrderEvent::Placed { .. }) => "orders.placed",
            Self::Order(OrderEvent::StatusChanged { .. }) => "orders.status_changed",
        }
    }
}

impl From<PriceEvent> for DomainEvent {
    fn from(e: PriceEvent) -> Self { Self::Price(e) }
}

impl From<OrderEvent> for DomainEvent {
    fn from(e: OrderEvent) -> Self { Self::Order(e) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_and_payload() {
        let event: DomainEvent = OrderEvent::StatusChanged {
            order_id: 3,
            from: OrderStatus::Pending,
            to: OrderStatus::Cancelled,
        }
        .into();
        assert_eq!(event.subject(), "orders.status_changed");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["domain"], "order");
        assert_eq!(json["type"], "status_changed");
        assert_eq!(json["to"], "cancelled");
    }
}
