//! PostgreSQL store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::{Store, StoreError, StoreResult};
use crate::domain::aggregates::{
    ChangeType, ContactMessage, Customer, NewContactMessage, NewOrder, NewPriceHistory, Order, OrderStatus,
    PriceHistory, Product, ProductInput,
};

const PRODUCT_COLUMNS: &str = "id, name, description, price, stock_quantity, category, bag_type, bag_dimensions, \
     min_order_quantity, bag_description, has_custom_print, image_url, is_custom, created_at, updated_at";

const HISTORY_COLUMNS: &str = "id, change_type, percentage_change, reason, affected_products, product_id, \
     product_name, old_price, new_price, created_at";

const ORDER_SELECT: &str = "SELECT o.id, o.order_number, o.customer_id, \
     c.first_name || ' ' || c.last_name AS customer_name, c.email AS customer_email, \
     o.product_type, o.product_color, o.product_size, o.quantity, o.unit_price, o.total, o.status, o.created_at \
     FROM orders o JOIN customers c ON c.id = o.customer_id";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }

    /// Connects and brings the schema up to date.
    pub async fn connect(url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new().max_connections(max_connections).connect(url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool { &self.pool }
}

// Status and change-type columns are TEXT; rows are read into these and checked on the way out.

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    order_number: String,
    customer_id: i64,
    customer_name: String,
    customer_email: String,
    product_type: String,
    product_color: String,
    product_size: String,
    quantity: i32,
    unit_price: Decimal,
    total: Decimal,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<OrderStatus>()
            .map_err(|e| StoreError::Corrupt(format!("order {}: {e}", row.id)))?;
        Ok(Order {
            id: row.id,
            order_number: row.order_number,
            customer_id: row.customer_id,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            product_type: row.product_type,
            product_color: row.product_color,
            product_size: row.product_size,
            quantity: row.quantity,
            unit_price: row.unit_price,
            total: row.total,
            status,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct HistoryRow {
    id: i64,
    change_type: String,
    percentage_change: Decimal,
    reason: Option<String>,
    affected_products: i32,
    product_id: Option<i64>,
    product_name: Option<String>,
    old_price: Option<Decimal>,
    new_price: Option<Decimal>,
    created_at: DateTime<Utc>,
}

impl TryFrom<HistoryRow> for PriceHistory {
    type Error = StoreError;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        let change_type = row.change_type.parse::<ChangeType>()
            .map_err(|e| StoreError::Corrupt(format!("price_history {}: {e}", row.id)))?;
        Ok(PriceHistory {
            id: row.id,
            change_type,
            percentage_change: row.percentage_change,
            reason: row.reason,
            affected_products: row.affected_products,
            product_id: row.product_id,
            product_name: row.product_name,
            old_price: row.old_price,
            new_price: row.new_price,
            created_at: row.created_at,
        })
    }
}

/// SQLSTATE for `numeric_value_out_of_range`.
const NUMERIC_OUT_OF_RANGE: &str = "22003";

fn conflict_on_unique(err: sqlx::Error, what: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict(what.to_string()),
        _ => StoreError::Database(err),
    }
}

fn constraint_on_overflow(err: sqlx::Error, what: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(NUMERIC_OUT_OF_RANGE) => {
            StoreError::Constraint(what.to_string())
        }
        _ => StoreError::Database(err),
    }
}

async fn insert_history(
    conn: &mut sqlx::PgConnection,
    entry: &NewPriceHistory,
) -> StoreResult<PriceHistory> {
    let row: HistoryRow = sqlx::query_as(&format!(
        "INSERT INTO price_history (change_type, percentage_change, reason, affected_products, product_id, \
         product_name, old_price, new_price) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {HISTORY_COLUMNS}"
    ))
    .bind(entry.change_type.as_str())
    .bind(entry.percentage_change)
    .bind(&entry.reason)
    .bind(entry.affected_products)
    .bind(entry.product_id)
    .bind(&entry.product_name)
    .bind(entry.old_price)
    .bind(entry.new_price)
    .fetch_one(conn)
    .await?;
    row.try_into()
}

#[async_trait]
impl Store for PgStore {
    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"))
            .fetch_all(&self.pool).await?;
        Ok(products)
    }

    async fn get_product(&self, id: i64) -> StoreResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
            .bind(id).fetch_optional(&self.pool).await?;
        Ok(product)
    }

    async fn create_product(&self, r: &ProductInput) -> StoreResult<Product> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products (name, description, price, stock_quantity, category, bag_type, bag_dimensions, \
             min_order_quantity, bag_description, has_custom_print, image_url, is_custom) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&r.name).bind(&r.description).bind(r.price).bind(r.stock_quantity).bind(&r.category)
        .bind(&r.bag_type).bind(&r.bag_dimensions).bind(r.min_order_quantity).bind(&r.bag_description)
        .bind(r.has_custom_print).bind(&r.image_url).bind(r.is_custom)
        .fetch_one(&self.pool).await?;
        Ok(product)
    }

    async fn update_product(&self, id: i64, r: &ProductInput) -> StoreResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET name = $2, description = $3, price = $4, stock_quantity = $5, category = $6, \
             bag_type = $7, bag_dimensions = $8, min_order_quantity = $9, bag_description = $10, \
             has_custom_print = $11, image_url = $12, is_custom = $13, updated_at = NOW() \
             WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id).bind(&r.name).bind(&r.description).bind(r.price).bind(r.stock_quantity).bind(&r.category)
        .bind(&r.bag_type).bind(&r.bag_dimensions).bind(r.min_order_quantity).bind(&r.bag_description)
        .bind(r.has_custom_print).bind(&r.image_url).bind(r.is_custom)
        .fetch_optional(&self.pool).await?;
        Ok(product)
    }

    async fn delete_product(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn apply_bulk_price_change(&self, percentage: Decimal, reason: &str) -> StoreResult<PriceHistory> {
        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query(
            "UPDATE products SET price = ROUND(price * (1 + $1 / 100.0), 2), updated_at = NOW()"
        )
        .bind(percentage)
        .execute(&mut *tx)
        .await
        .map_err(|e| constraint_on_overflow(e, "price change leaves a price out of range"))?
        .rows_affected();
        let record = insert_history(&mut tx, &NewPriceHistory::bulk(percentage, reason, updated)).await?;
        tx.commit().await?;
        Ok(record)
    }

    async fn set_product_price(&self, id: i64, price: Decimal, reason: &str) -> StoreResult<Option<PriceHistory>> {
        let mut tx = self.pool.begin().await?;
        let current: Option<(Decimal, String)> =
            sqlx::query_as("SELECT price, name FROM products WHERE id = $1 FOR UPDATE")
                .bind(id).fetch_optional(&mut *tx).await?;
        let Some((old_price, name)) = current else {
            return Ok(None);
        };
        sqlx::query("UPDATE products SET price = $2, updated_at = NOW() WHERE id = $1")
            .bind(id).bind(price).execute(&mut *tx).await?;
        let record = insert_history(&mut tx, &NewPriceHistory::single(id, &name, old_price, price, reason)).await?;
        tx.commit().await?;
        Ok(Some(record))
    }

    async fn list_price_history(&self, limit: i64) -> StoreResult<Vec<PriceHistory>> {
        let rows: Vec<HistoryRow> = sqlx::query_as(&format!(
            "SELECT {HISTORY_COLUMNS} FROM price_history ORDER BY created_at DESC, id DESC LIMIT $1"
        ))
        .bind(limit).fetch_all(&self.pool).await?;
        rows.into_iter().map(PriceHistory::try_from).collect()
    }

    async fn list_customers(&self) -> StoreResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            "SELECT id, first_name, last_name, email, phone, address, created_at FROM customers ORDER BY created_at DESC, id DESC"
        )
        .fetch_all(&self.pool).await?;
        Ok(customers)
    }

    async fn place_order(&self, o: &NewOrder) -> StoreResult<Order> {
        let mut tx = self.pool.begin().await?;
        let (customer_id,): (i64,) = sqlx::query_as(
            "INSERT INTO customers (first_name, last_name, email, phone, address) VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (email) DO UPDATE SET first_name = EXCLUDED.first_name, last_name = EXCLUDED.last_name, \
             phone = EXCLUDED.phone, address = EXCLUDED.address RETURNING id"
        )
        .bind(&o.customer.first_name).bind(&o.customer.last_name).bind(&o.customer.email)
        .bind(&o.customer.phone).bind(&o.customer.address)
        .fetch_one(&mut *tx).await?;

        let (order_id,): (i64,) = sqlx::query_as(
            "INSERT INTO orders (order_number, customer_id, product_type, product_color, product_size, quantity, \
             unit_price, total, status) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING id"
        )
        .bind(&o.order_number).bind(customer_id).bind(&o.product_type).bind(&o.product_color)
        .bind(&o.product_size).bind(o.quantity).bind(o.unit_price).bind(o.total)
        .bind(OrderStatus::Pending.as_str())
        .fetch_one(&mut *tx).await
        .map_err(|e| conflict_on_unique(e, "order number already exists"))?;

        let row: OrderRow = sqlx::query_as(&format!("{ORDER_SELECT} WHERE o.id = $1"))
            .bind(order_id).fetch_one(&mut *tx).await?;
        tx.commit().await?;
        row.try_into()
    }

    async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!("{ORDER_SELECT} ORDER BY o.created_at DESC, o.id DESC"))
            .fetch_all(&self.pool).await?;
        rows.into_iter().map(Order::try_from).collect()
    }

    async fn get_order(&self, id: i64) -> StoreResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(&format!("{ORDER_SELECT} WHERE o.id = $1"))
            .bind(id).fetch_optional(&self.pool).await?;
        row.map(Order::try_from).transpose()
    }

    async fn set_order_status(&self, id: i64, status: OrderStatus) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(id).bind(status.as_str()).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_order(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_contact_message(&self, m: NewContactMessage) -> StoreResult<ContactMessage> {
        let message = sqlx::query_as::<_, ContactMessage>(
            "INSERT INTO contact_messages (name, email, phone, message) VALUES ($1, $2, $3, $4) \
             RETURNING id, name, email, phone, message, status, created_at"
        )
        .bind(&m.name).bind(&m.email).bind(m.phone.filter(|p| !p.trim().is_empty())).bind(&m.message)
        .fetch_one(&self.pool).await?;
        Ok(message)
    }

    async fn list_contact_messages(&self) -> StoreResult<Vec<ContactMessage>> {
        let messages = sqlx::query_as::<_, ContactMessage>(
            "SELECT id, name, email, phone, message, status, created_at FROM contact_messages ORDER BY created_at DESC, id DESC"
        )
        .fetch_all(&self.pool).await?;
        Ok(messages)
    }

    async fn set_contact_status(&self, id: i64, status: &str) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE contact_messages SET status = $2 WHERE id = $1")
            .bind(id).bind(status).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_contact_message(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM contact_messages WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::NewCustomer;
    use crate::pricing;

    fn dec(s: &str) -> Decimal { s.parse().unwrap() }

    /// Connects to `DATABASE_URL` and empties every table; `None` when unset.
    async fn fresh_store() -> Option<PgStore> {
        let url = match std::env::var("DATABASE_URL") {
            Ok(v) => v,
            Err(_) => {
                eprintln!("skipping postgres store test: DATABASE_URL not set");
                return None;
            }
        };
        let store = PgStore::connect(&url, 2).await.expect("connect");
        sqlx::query("TRUNCATE products, customers, orders, price_history, contact_messages RESTART IDENTITY CASCADE")
            .execute(store.pool())
            .await
            .expect("truncate");
        Some(store)
    }

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

    // One test body: the cases share a database and must not interleave.
    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a disposable PostgreSQL database"]
    async fn test_pg_store_prices_and_orders() {
        let Some(store) = fresh_store().await else { return };

        let small = store.create_product(&ProductInput::new("Küçük Boy", dec("2.50"))).await.unwrap();
        let medium = store.create_product(&ProductInput::new("Orta Boy", dec("3.33"))).await.unwrap();

        // SQL rounding agrees with the pricing engine
        let record = store.apply_bulk_price_change(dec("-5"), "kampanya").await.unwrap();
        assert_eq!(record.affected_products, 2);
        assert_eq!(record.change_type, ChangeType::Decrease);
        for (product, before) in [(&small, dec("2.50")), (&medium, dec("3.33"))] {
            let now = store.get_product(product.id).await.unwrap().unwrap().price;
            assert_eq!(now, pricing::apply_percentage(before, dec("-5")).unwrap());
        }

        let old = store.get_product(small.id).await.unwrap().unwrap().price;
        let record = store.set_product_price(small.id, dec("3.00"), "kur").await.unwrap().unwrap();
        assert_eq!(record.old_price, Some(old));
        assert_eq!(record.percentage_change, pricing::percentage_delta(old, dec("3.00")));
        assert!(store.set_product_price(9999, dec("1"), "r").await.unwrap().is_none());

        // an out-of-range bulk change rolls back as a whole
        store.create_product(&ProductInput::new("Dev boy", dec("99999999.00"))).await.unwrap();
        let err = store.apply_bulk_price_change(dec("10"), "r").await.unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)), "{err:?}");
        assert_eq!(store.get_product(small.id).await.unwrap().unwrap().price, dec("3.00"));
        let history = store.list_price_history(100).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].change_type, ChangeType::Increase);

        let first = store.place_order(&new_order("ORD-PG-1", "ali@example.com")).await.unwrap();
        assert_eq!(first.customer_name, "Ali Yılmaz");
        assert_eq!(first.status, OrderStatus::Pending);
        let dup = store.place_order(&new_order("ORD-PG-1", "veli@example.com")).await;
        assert!(matches!(dup, Err(StoreError::Conflict(_))));
        let second = store.place_order(&new_order("ORD-PG-2", "ali@example.com")).await.unwrap();
        assert_eq!(first.customer_id, second.customer_id);
        // the rejected order left no customer behind
        assert_eq!(store.list_customers().await.unwrap().len(), 1);

        assert!(store.set_order_status(first.id, OrderStatus::Confirmed).await.unwrap());
        assert_eq!(store.get_order(first.id).await.unwrap().unwrap().status, OrderStatus::Confirmed);
        assert!(store.delete_order(first.id).await.unwrap());
        assert!(!store.delete_order(first.id).await.unwrap());
    }
}
