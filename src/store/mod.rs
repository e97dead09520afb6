//! Store Module
//!
//! Persistence for products, customers, orders, contact messages and the price
//! history. [`PgStore`] talks to PostgreSQL; [`MemoryStore`] keeps everything in
//! process and backs the development mode and the HTTP tests.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::aggregates::{
    ContactMessage, Customer, NewContactMessage, NewOrder, Order, OrderStatus, PriceHistory, Product,
    ProductInput,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error("corrupt row: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Everything the HTTP layer needs from persistence.
///
/// Prices handed to the store are already validated and rounded. Listings come
/// back newest first unless noted otherwise.
#[async_trait]
pub trait Store: Send + Sync {
    // Products
    async fn list_products(&self) -> StoreResult<Vec<Product>>;
    async fn get_product(&self, id: i64) -> StoreResult<Option<Product>>;
    async fn create_product(&self, input: &ProductInput) -> StoreResult<Product>;
    async fn update_product(&self, id: i64, input: &ProductInput) -> StoreResult<Option<Product>>;
    async fn delete_product(&self, id: i64) -> StoreResult<bool>;

    // Prices
    /// Reprices every product by `percentage` and appends one history row, atomically.
    async fn apply_bulk_price_change(&self, percentage: Decimal, reason: &str) -> StoreResult<PriceHistory>;
    /// `None` when the product does not exist.
    async fn set_product_price(&self, id: i64, price: Decimal, reason: &str) -> StoreResult<Option<PriceHistory>>;
    async fn list_price_history(&self, limit: i64) -> StoreResult<Vec<PriceHistory>>;

    // Customers and orders
    async fn list_customers(&self) -> StoreResult<Vec<Customer>>;
    /// Upserts the customer by email, then inserts the order.
    async fn place_order(&self, order: &NewOrder) -> StoreResult<Order>;
    async fn list_orders(&self) -> StoreResult<Vec<Order>>;
    async fn get_order(&self, id: i64) -> StoreResult<Option<Order>>;
    async fn set_order_status(&self, id: i64, status: OrderStatus) -> StoreResult<bool>;
    async fn delete_order(&self, id: i64) -> StoreResult<bool>;

    // Contact messages
    async fn create_contact_message(&self, message: NewContactMessage) -> StoreResult<ContactMessage>;
    async fn list_contact_messages(&self) -> StoreResult<Vec<ContactMessage>>;
    async fn set_contact_status(&self, id: i64, status: &str) -> StoreResult<bool>;
    async fn delete_contact_message(&self, id: i64) -> StoreResult<bool>;
}
