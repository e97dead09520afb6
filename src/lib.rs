//! Gopak Storefront
//!
//! Storefront and admin service for custom packaging bags.
//!
//! ## Features
//! - Bag configurator with live pricing (fabric, print, size, quantity discounts)
//! - Client-side cart with pluggable persistence
//! - Order intake with server-side re-quoting
//! - Admin API for products, orders, customers and contact messages
//! - Bulk and single-product price changes with an append-only price history

pub mod admin;
pub mod api;
pub mod config;
pub mod domain;
pub mod pricing;
pub mod state;
pub mod store;
pub mod storefront;

pub use config::Config;
pub use domain::aggregates::{
    BagSize, CartItem, ChangeType, ContactMessage, Customer, NewContactMessage, NewCustomer,
    NewOrder, Order, OrderStatus, PriceHistory, PriceHistoryStats, Product, ProductInput,
};
pub use pricing::{Fabric, PrintOption, Quote, QuoteRequest};
pub use state::AppState;
pub use store::{MemoryStore, PgStore, Store, StoreError};
