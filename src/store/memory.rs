//! In-process store
//!
//! All tables sit behind one `RwLock`, so every write (including the two-table
//! price and order writes) is atomic with respect to readers.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{Store, StoreError, StoreResult};
use crate::domain::aggregates::{
    ContactMessage, Customer, NewContactMessage, NewOrder, NewPriceHistory, Order, OrderStatus,
    PriceHistory, Product, ProductInput,
};
use crate::domain::value_objects::Price;
use crate::pricing;
use crate::storefront::catalog;

#[derive(Default)]
struct Tables {
    products: BTreeMap<i64, Product>,
    customers: BTreeMap<i64, Customer>,
    orders: BTreeMap<i64, StoredOrder>,
    price_history: Vec<PriceHistory>,
    contacts: BTreeMap<i64, ContactMessage>,
    next_id: i64,
}

/// Orders are kept normalised and joined with their customer on read.
#[derive(Clone)]
struct StoredOrder {
    id: i64,
    order_number: String,
    customer_id: i64,
    product_type: String,
    product_color: String,
    product_size: String,
    quantity: i32,
    unit_price: Decimal,
    total: Decimal,
    status: OrderStatus,
    created_at: chrono::DateTime<Utc>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn joined(&self, o: &StoredOrder) -> Order {
        let (customer_name, customer_email) = self.customers.get(&o.customer_id)
            .map(|c| (c.full_name(), c.email.clone()))
            .unwrap_or_default();
        Order {
            id: o.id,
            order_number: o.order_number.clone(),
            customer_id: o.customer_id,
            customer_name,
            customer_email,
            product_type: o.product_type.clone(),
            product_color: o.product_color.clone(),
            product_size: o.product_size.clone(),
            quantity: o.quantity,
            unit_price: o.unit_price,
            total: o.total,
            status: o.status,
            created_at: o.created_at,
        }
    }

    fn append_history(&mut self, entry: NewPriceHistory) -> PriceHistory {
        let record = entry.into_record(self.next_id(), Utc::now());
        self.price_history.push(record.clone());
        record
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    /// A store holding the built-in bag sizes as products.
    pub fn seeded() -> Self {
        let mut tables = Tables::default();
        let now = Utc::now();
        for input in catalog::seed_products() {
            let id = tables.next_id();
            let price = Price::new(input.price).unwrap_or(Price::ZERO);
            tables.products.insert(id, input.into_product(id, price, now));
        }
        Self { tables: RwLock::new(tables) }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        Ok(self.tables.read().await.products.values().cloned().collect())
    }

    async fn get_product(&self, id: i64) -> StoreResult<Option<Product>> {
        Ok(self.tables.read().await.products.get(&id).cloned())
    }

    async fn create_product(&self, input: &ProductInput) -> StoreResult<Product> {
        let mut t = self.tables.write().await;
        let id = t.next_id();
        let price = Price::new(input.price).map_err(|e| StoreError::Constraint(e.to_string()))?;
        let product = input.clone().into_product(id, price, Utc::now());
        t.products.insert(id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: i64, input: &ProductInput) -> StoreResult<Option<Product>> {
        let mut t = self.tables.write().await;
        let Some(existing) = t.products.get_mut(&id) else {
            return Ok(None);
        };
        let price = Price::new(input.price).map_err(|e| StoreError::Constraint(e.to_string()))?;
        let mut updated = input.clone().into_product(id, price, Utc::now());
        updated.created_at = existing.created_at;
        *existing = updated.clone();
        Ok(Some(updated))
    }

    async fn delete_product(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.write().await.products.remove(&id).is_some())
    }

    async fn apply_bulk_price_change(&self, percentage: Decimal, reason: &str) -> StoreResult<PriceHistory> {
        let mut t = self.tables.write().await;
        let now = Utc::now();
        // all or nothing: price every product before touching any
        let repriced = t.products.values()
            .map(|p| pricing::apply_percentage(p.price, percentage))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Constraint(e.to_string()))?;
        for (product, price) in t.products.values_mut().zip(repriced) {
            product.price = price;
            product.updated_at = now;
        }
        let affected = t.products.len() as u64;
        Ok(t.append_history(NewPriceHistory::bulk(percentage, reason, affected)))
    }

    async fn set_product_price(&self, id: i64, price: Decimal, reason: &str) -> StoreResult<Option<PriceHistory>> {
        let mut t = self.tables.write().await;
        let Some(product) = t.products.get_mut(&id) else {
            return Ok(None);
        };
        let entry = NewPriceHistory::single(id, &product.name, product.price, price, reason);
        product.price = price;
        product.updated_at = Utc::now();
        Ok(Some(t.append_history(entry)))
    }

    async fn list_price_history(&self, limit: i64) -> StoreResult<Vec<PriceHistory>> {
        let t = self.tables.read().await;
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(t.price_history.iter().rev().take(limit).cloned().collect())
    }

    async fn list_customers(&self) -> StoreResult<Vec<Customer>> {
        Ok(self.tables.read().await.customers.values().rev().cloned().collect())
    }

    async fn place_order(&self, o: &NewOrder) -> StoreResult<Order> {
        let mut t = self.tables.write().await;
        if t.orders.values().any(|existing| existing.order_number == o.order_number) {
            return Err(StoreError::Conflict("order number already exists".into()));
        }
        let now = Utc::now();
        let existing = t.customers.values().find(|c| c.email == o.customer.email).map(|c| c.id);
        let customer_id = match existing {
            Some(id) => id,
            None => t.next_id(),
        };
        let created_at = t.customers.get(&customer_id).map(|c| c.created_at).unwrap_or(now);
        t.customers.insert(customer_id, Customer {
            id: customer_id,
            first_name: o.customer.first_name.clone(),
            last_name: o.customer.last_name.clone(),
            email: o.customer.email.clone(),
            phone: o.customer.phone.clone(),
            address: o.customer.address.clone(),
            created_at,
        });

        let id = t.next_id();
        let stored = StoredOrder {
            id,
            order_number: o.order_number.clone(),
            customer_id,
            product_type: o.product_type.clone(),
            product_color: o.product_color.clone(),
            product_size: o.product_size.clone(),
            quantity: o.quantity,
            unit_price: o.unit_price,
            total: o.total,
            status: OrderStatus::Pending,
            created_at: now,
        };
        let order = t.joined(&stored);
        t.orders.insert(id, stored);
        Ok(order)
    }

    async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        let t = self.tables.read().await;
        Ok(t.orders.values().rev().map(|o| t.joined(o)).collect())
    }

    async fn get_order(&self, id: i64) -> StoreResult<Option<Order>> {
        let t = self.tables.read().await;
        Ok(t.orders.get(&id).map(|o| t.joined(o)))
    }

    async fn set_order_status(&self, id: i64, status: OrderStatus) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        Ok(t.orders.get_mut(&id).map(|o| o.status = status).is_some())
    }

    async fn delete_order(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.write().await.orders.remove(&id).is_some())
    }

    async fn create_contact_message(&self, message: NewContactMessage) -> StoreResult<ContactMessage> {
        let mut t = self.tables.write().await;
        let id = t.next_id();
        let message = message.into_message(id, Utc::now());
        t.contacts.insert(id, message.clone());
        Ok(message)
    }

    async fn list_contact_messages(&self) -> StoreResult<Vec<ContactMessage>> {
        Ok(self.tables.read().await.contacts.values().rev().cloned().collect())
    }

    async fn set_contact_status(&self, id: i64, status: &str) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        Ok(t.contacts.get_mut(&id).map(|m| m.status = status.to_string()).is_some())
    }

    async fn delete_contact_message(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.write().await.contacts.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{ChangeType, NewCustomer};

    fn dec(s: &str) -> Decimal { s.parse().unwrap() }

    fn new_order(number: &str, email: &str) -> NewOrder {
        NewOrder {
            order_number: number.into(),
            customer: NewCustomer {
                first_name: "Ali".into(),
                last_name: "Yılmaz".into(),
                email: email.into(),
                phone: "05551234567".into(),
                address: "İstanbul".into(),
            },
            product_type: "3D Çanta (Yan Körüklü)".into(),
            product_color: "Kraft".into(),
            product_size: "Küçük Boy".into(),
            quantity: 2500,
            unit_price: dec("2.50"),
            total: dec("5625.00"),
        }
    }

    #[tokio::test]
    async fn test_seeded_catalog() {
        let store = MemoryStore::seeded();
        let products = store.list_products().await.unwrap();
        assert_eq!(products.len(), 8);
        assert_eq!(products[0].id, 1);
        assert_eq!(products[0].price, dec("2.50"));
    }

    #[tokio::test]
    async fn test_bulk_change_reprices_and_records() {
        let store = MemoryStore::seeded();
        let record = store.apply_bulk_price_change(dec("10"), "kur").await.unwrap();
        assert_eq!(record.affected_products, 8);
        assert_eq!(record.change_type, ChangeType::Increase);
        assert_eq!(store.get_product(1).await.unwrap().unwrap().price, dec("2.75"));
        assert_eq!(store.list_price_history(100).await.unwrap().len(), 1);

        store.apply_bulk_price_change(dec("-100"), "sıfırla").await.unwrap();
        assert!(store.list_products().await.unwrap().iter().all(|p| p.price.is_zero()));
    }

    #[tokio::test]
    async fn test_bulk_change_out_of_range_leaves_prices_alone() {
        let store = MemoryStore::seeded();
        let input = ProductInput::new("Dev boy", dec("99999999.00"));
        store.create_product(&input).await.unwrap();
        let err = store.apply_bulk_price_change(dec("10"), "r").await.unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));
        assert_eq!(store.get_product(1).await.unwrap().unwrap().price, dec("2.50"));
        assert!(store.list_price_history(100).await.unwrap().is_empty());

        let too_much = ProductInput::new("Fazla", dec("100000000"));
        assert!(matches!(store.create_product(&too_much).await, Err(StoreError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_single_price_change() {
        let store = MemoryStore::seeded();
        let record = store.set_product_price(2, dec("3.60"), "r").await.unwrap().unwrap();
        assert_eq!(record.old_price, Some(dec("3.00")));
        assert_eq!(record.new_price, Some(dec("3.60")));
        assert_eq!(record.percentage_change, dec("20.00"));
        assert!(store.set_product_price(999, dec("1"), "r").await.unwrap().is_none());

        // newest first
        store.set_product_price(2, dec("3.00"), "geri").await.unwrap();
        let history = store.list_price_history(100).await.unwrap();
        assert_eq!(history[0].change_type, ChangeType::Decrease);
        assert_eq!(store.list_price_history(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_orders_upsert_customer_by_email() {
        let store = MemoryStore::new();
        let first = store.place_order(&new_order("ORD-1", "ali@example.com")).await.unwrap();
        let second = store.place_order(&new_order("ORD-2", "ali@example.com")).await.unwrap();
        assert_eq!(first.customer_id, second.customer_id);
        assert_eq!(first.customer_name, "Ali Yılmaz");
        assert_eq!(store.list_customers().await.unwrap().len(), 1);
        assert!(matches!(
            store.place_order(&new_order("ORD-1", "x@example.com")).await,
            Err(StoreError::Conflict(_))
        ));

        let orders = store.list_orders().await.unwrap();
        assert_eq!(orders[0].order_number, "ORD-2");
        assert!(store.set_order_status(first.id, OrderStatus::Shipped).await.unwrap());
        assert_eq!(store.get_order(first.id).await.unwrap().unwrap().status, OrderStatus::Shipped);
        assert!(store.delete_order(first.id).await.unwrap());
        assert!(!store.delete_order(first.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_contact_messages() {
        let store = MemoryStore::new();
        let msg = store.create_contact_message(NewContactMessage {
            name: "Zeynep".into(),
            email: "z@example.com".into(),
            phone: None,
            message: "Numune istiyorum".into(),
        }).await.unwrap();
        assert_eq!(msg.status, "new");
        assert!(store.set_contact_status(msg.id, "read").await.unwrap());
        assert_eq!(store.list_contact_messages().await.unwrap()[0].status, "read");
        assert!(store.delete_contact_message(msg.id).await.unwrap());
        assert!(!store.set_contact_status(msg.id, "read").await.unwrap());
    }
}
