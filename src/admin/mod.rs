//! Admin console state
//!
//! The console keeps the three collections it last loaded and derives the
//! dashboard from them.

pub mod dashboard;
pub mod price_forms;

pub use dashboard::DashboardSummary;
pub use price_forms::{validate_price_edit, BulkPreview, PriceFormError};

use rust_decimal::Decimal;

use crate::domain::aggregates::{Customer, Order, Product};

#[derive(Clone, Debug, Default)]
pub struct AdminConsole {
    orders: Vec<Order>,
    customers: Vec<Customer>,
    products: Vec<Product>,
}

impl AdminConsole {
    pub fn new(orders: Vec<Order>, customers: Vec<Customer>, products: Vec<Product>) -> Self {
        Self { orders, customers, products }
    }

    pub fn orders(&self) -> &[Order] { &self.orders }
    pub fn customers(&self) -> &[Customer] { &self.customers }
    pub fn products(&self) -> &[Product] { &self.products }

    pub fn set_orders(&mut self, orders: Vec<Order>) { self.orders = orders; }
    pub fn set_customers(&mut self, customers: Vec<Customer>) { self.customers = customers; }
    pub fn set_products(&mut self, products: Vec<Product>) { self.products = products; }

    pub fn dashboard(&self) -> DashboardSummary {
        DashboardSummary::compose(&self.orders, &self.customers, &self.products)
    }

    pub fn bulk_preview(&self, percentage: Decimal) -> Result<Option<BulkPreview>, PriceFormError> {
        BulkPreview::build(&self.products, percentage)
    }

    /// Checks a price edit against the product's current price.
    pub fn check_price_edit(&self, product_id: i64, new_price: Decimal) -> Option<Result<Decimal, PriceFormError>> {
        let product = self.products.iter().find(|p| p.id == product_id)?;
        Some(validate_price_edit(product.price, new_price))
    }
}
