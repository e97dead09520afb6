//! Dashboard figures

use serde::Serialize;

use crate::domain::aggregates::{Customer, Order, OrderStatus, Product};

pub const RECENT_ORDERS: usize = 5;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_orders: usize,
    pub total_customers: usize,
    pub total_products: usize,
    pub pending_orders: usize,
    pub recent_orders: Vec<Order>,
}

impl DashboardSummary {
    pub fn compose(orders: &[Order], customers: &[Customer], products: &[Product]) -> Self {
        let mut recent: Vec<&Order> = orders.iter().collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Self {
            total_orders: orders.len(),
            total_customers: customers.len(),
            total_products: products.len(),
            pending_orders: orders.iter().filter(|o| o.status == OrderStatus::Pending).count(),
            recent_orders: recent.into_iter().take(RECENT_ORDERS).cloned().collect(),
        }
    }
}
