//! # Order Repository
//!
//! Order reads and the admin status update.
//!
//! Order CREATION is deliberately not here - it is a multi-table
//! transaction owned by [`crate::checkout`]. This repository serves
//! everything after the commit: customer order history, the admin order
//! table, and status transitions.

use sqlx::SqlitePool;
use tracing::debug;

use chrono::{DateTime, Utc};

use crate::error::{DbError, DbResult};
use luxe_core::{Order, OrderItem, OrderStatus, PostalAddress};

/// An order together with its item snapshots, as order history renders it.
#[derive(Debug, Clone)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

/// Raw orders row; the JSON snapshot columns fold into [`PostalAddress`].
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    user_id: String,
    shipping_address_id: String,
    billing_address_id: String,
    shipping_snapshot: String,
    billing_snapshot: String,
    subtotal_cents: i64,
    shipping_cents: i64,
    tax_cents: i64,
    discount_cents: i64,
    total_cents: i64,
    promo_code: Option<String>,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DbError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let shipping_address: PostalAddress = serde_json::from_str(&row.shipping_snapshot)
            .map_err(|e| {
                DbError::Internal(format!("corrupt shipping snapshot on order {}: {}", row.id, e))
            })?;
        let billing_address: PostalAddress =
            serde_json::from_str(&row.billing_snapshot).map_err(|e| {
                DbError::Internal(format!("corrupt billing snapshot on order {}: {}", row.id, e))
            })?;

        Ok(Order {
            id: row.id,
            user_id: row.user_id,
            shipping_address_id: row.shipping_address_id,
            billing_address_id: row.billing_address_id,
            shipping_address,
            billing_address,
            subtotal_cents: row.subtotal_cents,
            shipping_cents: row.shipping_cents,
            tax_cents: row.tax_cents,
            discount_cents: row.discount_cents,
            total_cents: row.total_cents,
            promo_code: row.promo_code,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_ORDER: &str = r#"
    SELECT id, user_id, shipping_address_id, billing_address_id,
           shipping_snapshot, billing_snapshot,
           subtotal_cents, shipping_cents, tax_cents, discount_cents,
           total_cents, promo_code, status, created_at, updated_at
    FROM orders
"#;

const SELECT_ITEMS: &str = r#"
    SELECT id, order_id, product_id, name_snapshot, image_snapshot,
           unit_price_cents, quantity, line_total_cents, created_at
    FROM order_items
"#;

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!("{} WHERE id = ?1", SELECT_ORDER))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Order::try_from).transpose()
    }

    /// Gets an order and its item snapshots.
    pub async fn get_with_items(&self, id: &str) -> DbResult<Option<OrderWithItems>> {
        let order = match self.get_by_id(id).await? {
            Some(order) => order,
            None => return Ok(None),
        };
        let items = self.get_items(id).await?;

        Ok(Some(OrderWithItems { order, items }))
    }

    /// Gets the item snapshots for an order, in insertion order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "{} WHERE order_id = ?1 ORDER BY created_at",
            SELECT_ITEMS
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists a customer's orders, newest first, with items - the shape the
    /// order-history page renders.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<OrderWithItems>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{} WHERE user_id = ?1 ORDER BY created_at DESC",
            SELECT_ORDER
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let order = Order::try_from(row)?;
            let items = self.get_items(&order.id).await?;
            out.push(OrderWithItems { order, items });
        }

        Ok(out)
    }

    /// Lists recent orders across all customers (admin back-office).
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{} ORDER BY created_at DESC LIMIT ?1",
            SELECT_ORDER
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    /// Updates an order's status (admin).
    ///
    /// The caller parses the status string through [`OrderStatus`]'s
    /// `FromStr` allow-list, so an invalid value is rejected before this is
    /// ever reached; the type makes an out-of-list write unrepresentable.
    pub async fn update_status(&self, id: &str, status: OrderStatus) -> DbResult<()> {
        debug!(id = %id, status = %status, "Updating order status");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE orders SET status = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        Ok(())
    }

    /// Counts all orders (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
// Placement scenarios live in checkout.rs; these cover reads and the
// status update on top of orders placed through the real transaction.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::tests_support::{place_sample_order, sample_db};
    use std::str::FromStr;

    #[tokio::test]
    async fn test_get_with_items_round_trips_snapshots() {
        let db = sample_db().await;
        let placed = place_sample_order(&db, "user-1").await;

        let fetched = db
            .orders()
            .get_with_items(&placed.id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(fetched.order.id, placed.id);
        assert_eq!(fetched.order.total_cents, placed.total_cents);
        assert_eq!(fetched.order.shipping_address, placed.shipping_address);
        assert!(!fetched.items.is_empty());
        for item in &fetched.items {
            assert!(!item.name_snapshot.is_empty());
            assert_eq!(
                item.line_total_cents,
                item.unit_price_cents * item.quantity
            );
        }
    }

    #[tokio::test]
    async fn test_list_for_user_is_scoped_and_ordered() {
        let db = sample_db().await;
        let first = place_sample_order(&db, "user-1").await;
        let second = place_sample_order(&db, "user-1").await;
        place_sample_order(&db, "user-2").await;

        let orders = db.orders().list_for_user("user-1").await.unwrap();
        assert_eq!(orders.len(), 2);
        let ids: Vec<_> = orders.iter().map(|o| o.order.id.as_str()).collect();
        assert!(ids.contains(&first.id.as_str()));
        assert!(ids.contains(&second.id.as_str()));

        assert_eq!(db.orders().list_recent(10).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_update_status() {
        let db = sample_db().await;
        let placed = place_sample_order(&db, "user-1").await;
        assert_eq!(placed.status, OrderStatus::Pending);

        db.orders()
            .update_status(&placed.id, OrderStatus::Processing)
            .await
            .unwrap();
        let fetched = db.orders().get_by_id(&placed.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, OrderStatus::Processing);

        // The allow-list rejects junk before any write
        assert!(OrderStatus::from_str("refunded").is_err());

        // Unknown order ids surface NotFound
        assert!(matches!(
            db.orders()
                .update_status("missing", OrderStatus::Shipped)
                .await,
            Err(DbError::NotFound { .. })
        ));
    }
}
