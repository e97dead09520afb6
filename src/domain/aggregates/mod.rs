//! Aggregates module
pub mod cart;
pub mod contact;
pub mod order;
pub mod price_history;
pub mod product;

pub use cart::{Cart, CartError, CartItem};
pub use contact::{ContactMessage, NewContactMessage};
pub use order::{generate_order_number, Customer, NewCustomer, NewOrder, Order, OrderStatus, TransitionError};
pub use price_history::{ChangeType, NewPriceHistory, PriceHistory, PriceHistoryStats};
pub use product::{BagSize, Product, ProductInput};
