//! # Checkout - the Order Placement Transaction
//!
//! Turns a priced cart into a durable order, atomically.
//!
//! ## Placement Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  place_order(request)                                                   │
//! │                                                                         │
//! │  1. cart empty?              ──► EMPTY_CART                             │
//! │  2. promo code (if any)      ──► PROMO_* rejection                      │
//! │  3. price the cart           ──► INVALID_TOTAL if total ≤ 0             │
//! │  4. shipping address fields  ──► INVALID_ADDRESS                        │
//! │  ───────────── BEGIN TRANSACTION ─────────────                          │
//! │  5. insert shipping Address row                                         │
//! │  6. insert billing Address row (or reuse shipping id)                   │
//! │  7. insert Order row (status: pending, address snapshots)               │
//! │  8. insert one OrderItem snapshot per cart line                         │
//! │  ───────────── COMMIT ────────────────────────                          │
//! │                                                                         │
//! │  Any failure in 5-8 rolls back EVERYTHING ──► ORDER_CREATE_FAILED      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Happens After Commit
//! Recording the promo redemption (`promos().record_use`) and clearing the
//! cart are the CALLER's responsibility. Both are separate, independently
//! retryable operations - a failure in either leaves the committed order
//! intact rather than corrupting it.
//!
//! ## Rollback Mechanics
//! Every statement runs on one sqlx `Transaction`. An early `?` return
//! drops the transaction un-committed, which rolls back all of steps 5-8;
//! partial orders are never observable by a subsequent read.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::promo::PromoRepository;
use luxe_core::error::{CheckoutError, ValidationError};
use luxe_core::pricing::{quote, PricingConfig, ShippingMethod};
use luxe_core::validation::validate_postal_address;
use luxe_core::{
    Address, AddressRole, Cart, CartLine, Money, Order, OrderStatus, PostalAddress, PromoRejection,
};
use thiserror::Error;

// =============================================================================
// Request & Error Types
// =============================================================================

/// Everything checkout needs to place an order.
///
/// `user_id` comes from the authentication collaborator and is trusted as
/// verified; `lines` come from the cart store and are not mutated here.
#[derive(Debug, Clone)]
pub struct PlaceOrderRequest {
    pub user_id: String,
    pub lines: Vec<CartLine>,
    pub shipping_method: ShippingMethod,
    pub shipping_address: PostalAddress,
    /// Omitted (or structurally identical to shipping) means the billing
    /// address reuses the shipping address row.
    pub billing_address: Option<PostalAddress>,
    pub promo_code: Option<String>,
}

/// Why an order was not placed.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    /// The request was rejected before any write (empty cart, bad address,
    /// promo rejection, non-positive total). Nothing to roll back.
    #[error(transparent)]
    Rejected(#[from] CheckoutError),

    /// A persistence step failed; every write was rolled back.
    #[error("Failed to create order")]
    CreateFailed(#[source] DbError),
}

impl PlaceOrderError {
    /// Stable machine-readable identifier for API consumers.
    pub fn code(&self) -> &'static str {
        match self {
            PlaceOrderError::Rejected(e) => e.code(),
            PlaceOrderError::CreateFailed(_) => "ORDER_CREATE_FAILED",
        }
    }
}

impl From<DbError> for PlaceOrderError {
    fn from(err: DbError) -> Self {
        PlaceOrderError::CreateFailed(err)
    }
}

impl From<sqlx::Error> for PlaceOrderError {
    fn from(err: sqlx::Error) -> Self {
        PlaceOrderError::CreateFailed(err.into())
    }
}

// =============================================================================
// Checkout Service
// =============================================================================

/// The order placement transaction.
///
/// Owns no state beyond the pool; obtain one per call site via
/// `db.checkout()`.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    pool: SqlitePool,
}

impl CheckoutService {
    /// Creates a new CheckoutService.
    pub fn new(pool: SqlitePool) -> Self {
        CheckoutService { pool }
    }

    /// Places an order: validates, prices, and persists atomically.
    ///
    /// On success the returned [`Order`] is durably committed with status
    /// `pending`. On `Rejected` nothing was written; on `CreateFailed`
    /// everything written inside the attempt was rolled back.
    pub async fn place_order(
        &self,
        request: PlaceOrderRequest,
        pricing: &PricingConfig,
    ) -> Result<Order, PlaceOrderError> {
        debug!(user_id = %request.user_id, lines = request.lines.len(), "place_order");

        // ---- Step 1: an order must contain at least one item -------------
        if request.lines.is_empty() {
            return Err(CheckoutError::EmptyCart.into());
        }

        let cart = Cart {
            lines: request.lines.clone(),
        };
        let subtotal = cart.subtotal();

        // ---- Step 2: resolve the promo code (no writes, no consumption) --
        let discount = match &request.promo_code {
            Some(code) => self
                .resolve_promo(code, subtotal)
                .await?
                .map_err(CheckoutError::Promo)?,
            None => Money::zero(),
        };

        // ---- Step 3: price the cart and reject non-positive totals -------
        let totals = quote(&cart, request.shipping_method, discount, pricing);
        if !totals.total.is_positive() {
            return Err(CheckoutError::InvalidTotal.into());
        }

        // ---- Step 4: the shipping address must be complete ---------------
        validate_postal_address(&request.shipping_address)
            .map_err(|e| PlaceOrderError::Rejected(invalid_address(e)))?;
        if let Some(billing) = &request.billing_address {
            validate_postal_address(billing)
                .map_err(|e| PlaceOrderError::Rejected(invalid_address(e)))?;
        }

        // ---- Steps 5-8: one transaction, all or nothing ------------------
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let shipping_address_id = insert_address(
            &mut tx,
            &request.user_id,
            &request.shipping_address,
            AddressRole::Shipping,
        )
        .await?;

        // Reuse the shipping row when billing is omitted or structurally
        // identical; otherwise persist a second row.
        let (billing_address_id, billing_postal) = match &request.billing_address {
            Some(billing) if *billing != request.shipping_address => {
                let id =
                    insert_address(&mut tx, &request.user_id, billing, AddressRole::Billing)
                        .await?;
                (id, billing.clone())
            }
            _ => (shipping_address_id.clone(), request.shipping_address.clone()),
        };

        let order = Order {
            id: Uuid::new_v4().to_string(),
            user_id: request.user_id.clone(),
            shipping_address_id,
            billing_address_id,
            shipping_address: request.shipping_address.clone(),
            billing_address: billing_postal,
            subtotal_cents: totals.subtotal.cents(),
            shipping_cents: totals.shipping.cents(),
            tax_cents: totals.tax.cents(),
            discount_cents: totals.discount.cents(),
            total_cents: totals.total.cents(),
            promo_code: request.promo_code.clone(),
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        insert_order(&mut tx, &order).await?;

        for line in &request.lines {
            insert_item_snapshot(&mut tx, &order.id, line, now).await?;
        }

        tx.commit().await?;

        info!(
            order_id = %order.id,
            user_id = %order.user_id,
            total = %order.total(),
            items = request.lines.len(),
            "Order placed"
        );

        Ok(order)
    }

    /// Looks up and validates a promo code against the subtotal.
    ///
    /// Infrastructure failures surface as `DbError`; eligibility failures
    /// come back as tagged rejections for the caller to report. Runs before
    /// the transaction opens - validation never holds a write lock.
    async fn resolve_promo(
        &self,
        code: &str,
        subtotal: Money,
    ) -> Result<Result<Money, PromoRejection>, DbError> {
        PromoRepository::new(self.pool.clone())
            .check(code, subtotal)
            .await
    }
}

/// Maps a missing-field validation failure to the checkout taxonomy.
fn invalid_address(err: ValidationError) -> CheckoutError {
    match err {
        ValidationError::Required { field } => CheckoutError::InvalidAddress { field },
        other => CheckoutError::InvalidAddress {
            field: other.to_string(),
        },
    }
}

// =============================================================================
// Transaction-Scoped Writes
// =============================================================================
// Every statement below runs on the caller's transaction, never the pool -
// with a single-connection pool a stray pool query here would deadlock, and
// a pool write would escape the rollback.

/// Inserts a checkout address row and returns its id.
async fn insert_address(
    tx: &mut Transaction<'_, Sqlite>,
    owner_id: &str,
    postal: &PostalAddress,
    role: AddressRole,
) -> Result<String, PlaceOrderError> {
    let address = Address {
        id: Uuid::new_v4().to_string(),
        owner_id: owner_id.to_string(),
        recipient: postal.recipient.clone(),
        phone: postal.phone.clone(),
        line1: postal.line1.clone(),
        line2: postal.line2.clone(),
        city: postal.city.clone(),
        state: postal.state.clone(),
        postal_code: postal.postal_code.clone(),
        country: postal.country.clone(),
        role,
        is_default_shipping: false,
        is_default_billing: false,
        created_at: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO addresses (
            id, owner_id, recipient, phone, line1, line2, city, state,
            postal_code, country, role, is_default_shipping,
            is_default_billing, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        "#,
    )
    .bind(&address.id)
    .bind(&address.owner_id)
    .bind(&address.recipient)
    .bind(&address.phone)
    .bind(&address.line1)
    .bind(&address.line2)
    .bind(&address.city)
    .bind(&address.state)
    .bind(&address.postal_code)
    .bind(&address.country)
    .bind(address.role)
    .bind(address.is_default_shipping)
    .bind(address.is_default_billing)
    .bind(address.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(address.id)
}

/// Inserts the order row with its totals and address snapshots.
async fn insert_order(
    tx: &mut Transaction<'_, Sqlite>,
    order: &Order,
) -> Result<(), PlaceOrderError> {
    let shipping_snapshot = serde_json::to_string(&order.shipping_address)
        .map_err(|e| DbError::Internal(format!("address snapshot: {}", e)))?;
    let billing_snapshot = serde_json::to_string(&order.billing_address)
        .map_err(|e| DbError::Internal(format!("address snapshot: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO orders (
            id, user_id, shipping_address_id, billing_address_id,
            shipping_snapshot, billing_snapshot,
            subtotal_cents, shipping_cents, tax_cents, discount_cents,
            total_cents, promo_code, status, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
        "#,
    )
    .bind(&order.id)
    .bind(&order.user_id)
    .bind(&order.shipping_address_id)
    .bind(&order.billing_address_id)
    .bind(shipping_snapshot)
    .bind(billing_snapshot)
    .bind(order.subtotal_cents)
    .bind(order.shipping_cents)
    .bind(order.tax_cents)
    .bind(order.discount_cents)
    .bind(order.total_cents)
    .bind(&order.promo_code)
    .bind(order.status)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Inserts one order-item snapshot for a cart line.
///
/// Name and image come from the catalog as it stands right now (read on
/// the same transaction); the unit price is the cart line's - the price
/// the pricing engine actually charged. The product foreign key backstops
/// a line pointing at a row that no longer exists.
async fn insert_item_snapshot(
    tx: &mut Transaction<'_, Sqlite>,
    order_id: &str,
    line: &CartLine,
    now: chrono::DateTime<Utc>,
) -> Result<(), PlaceOrderError> {
    let current: Option<(String, Option<String>)> =
        sqlx::query_as("SELECT name, image_url FROM products WHERE id = ?1")
            .bind(&line.product_id)
            .fetch_optional(&mut **tx)
            .await?;

    let (name_snapshot, image_snapshot) = match current {
        Some((name, image)) => (name, image),
        None => (line.name.clone(), line.image_url.clone()),
    };

    sqlx::query(
        r#"
        INSERT INTO order_items (
            id, order_id, product_id, name_snapshot, image_snapshot,
            unit_price_cents, quantity, line_total_cents, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(order_id)
    .bind(&line.product_id)
    .bind(name_snapshot)
    .bind(image_snapshot)
    .bind(line.unit_price_cents)
    .bind(line.quantity)
    .bind(line.line_total().cents())
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

// =============================================================================
// Test Support
// =============================================================================

#[cfg(test)]
pub(crate) mod tests_support {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use luxe_core::Product;

    /// In-memory database with two catalog products.
    pub async fn sample_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();

        for (id, name, price_cents) in [
            ("prod-jacket", "Premium Leather Jacket", 29999),
            ("prod-watch", "Classic Watch", 39999),
        ] {
            db.products()
                .insert(&Product {
                    id: id.to_string(),
                    name: name.to_string(),
                    description: None,
                    price_cents,
                    category: Some("Accessories".to_string()),
                    image_url: Some(format!("/images/{}.jpg", id)),
                    featured: false,
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                })
                .await
                .unwrap();
        }

        db
    }

    pub fn sample_address() -> PostalAddress {
        PostalAddress {
            recipient: "Jordan Reyes".to_string(),
            phone: "555-0100".to_string(),
            line1: "1 Main Street".to_string(),
            line2: None,
            city: "Springfield".to_string(),
            state: "NY".to_string(),
            postal_code: "10001".to_string(),
            country: "USA".to_string(),
        }
    }

    pub fn sample_line(product_id: &str, price_cents: i64, quantity: i64) -> CartLine {
        CartLine {
            product_id: product_id.to_string(),
            name: "stale cart name".to_string(),
            unit_price_cents: price_cents,
            quantity,
            size: Some("M".to_string()),
            color: None,
            image_url: None,
            added_at: Utc::now(),
        }
    }

    /// Places a simple two-line order for reuse in repository tests.
    pub async fn place_sample_order(db: &Database, user_id: &str) -> Order {
        db.checkout()
            .place_order(
                PlaceOrderRequest {
                    user_id: user_id.to_string(),
                    lines: vec![
                        sample_line("prod-jacket", 29999, 1),
                        sample_line("prod-watch", 39999, 2),
                    ],
                    shipping_method: ShippingMethod::Standard,
                    shipping_address: sample_address(),
                    billing_address: None,
                    promo_code: None,
                },
                &PricingConfig::default(),
            )
            .await
            .unwrap()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::tests_support::*;
    use super::*;
    use crate::pool::Database;
    use luxe_core::{PromoKind, Promotion};

    async fn table_count(db: &Database, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    async fn assert_nothing_written(db: &Database) {
        assert_eq!(table_count(db, "orders").await, 0);
        assert_eq!(table_count(db, "order_items").await, 0);
        assert_eq!(table_count(db, "addresses").await, 0);
    }

    fn request(lines: Vec<CartLine>) -> PlaceOrderRequest {
        PlaceOrderRequest {
            user_id: "user-1".to_string(),
            lines,
            shipping_method: ShippingMethod::Standard,
            shipping_address: sample_address(),
            billing_address: None,
            promo_code: None,
        }
    }

    #[tokio::test]
    async fn test_place_order_happy_path() {
        let db = sample_db().await;

        // $299.99 + 2 × $399.99 = $1099.97 subtotal, free standard shipping,
        // 8% tax = $88.00, total $1187.97
        let order = db
            .checkout()
            .place_order(
                request(vec![
                    sample_line("prod-jacket", 29999, 1),
                    sample_line("prod-watch", 39999, 2),
                ]),
                &PricingConfig::default(),
            )
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.subtotal_cents, 109997);
        assert_eq!(order.shipping_cents, 0);
        assert_eq!(order.tax_cents, 8800);
        assert_eq!(order.discount_cents, 0);
        assert_eq!(order.total_cents, 118797);
        assert_eq!(
            order.total_cents,
            order.subtotal_cents + order.shipping_cents + order.tax_cents
                - order.discount_cents
        );

        // Billing reused the shipping row: one address, one order, two items
        assert_eq!(order.billing_address_id, order.shipping_address_id);
        assert_eq!(table_count(&db, "addresses").await, 1);
        assert_eq!(table_count(&db, "orders").await, 1);
        assert_eq!(table_count(&db, "order_items").await, 2);

        // Item snapshots carry the CATALOG name/image, not the stale cart copy
        let items = db.orders().get_items(&order.id).await.unwrap();
        let jacket = items
            .iter()
            .find(|i| i.product_id == "prod-jacket")
            .unwrap();
        assert_eq!(jacket.name_snapshot, "Premium Leather Jacket");
        assert_eq!(
            jacket.image_snapshot.as_deref(),
            Some("/images/prod-jacket.jpg")
        );
        assert_eq!(jacket.unit_price_cents, 29999);
        assert_eq!(jacket.line_total_cents, 29999);
    }

    #[tokio::test]
    async fn test_empty_cart_writes_nothing() {
        let db = sample_db().await;

        let err = db
            .checkout()
            .place_order(request(vec![]), &PricingConfig::default())
            .await
            .unwrap_err();

        assert_eq!(err.code(), "EMPTY_CART");
        assert_nothing_written(&db).await;
    }

    #[tokio::test]
    async fn test_incomplete_address_rejected() {
        let db = sample_db().await;

        let mut req = request(vec![sample_line("prod-jacket", 29999, 1)]);
        req.shipping_address.city = String::new();

        let err = db
            .checkout()
            .place_order(req, &PricingConfig::default())
            .await
            .unwrap_err();

        assert_eq!(err.code(), "INVALID_ADDRESS");
        assert!(matches!(
            err,
            PlaceOrderError::Rejected(CheckoutError::InvalidAddress { ref field }) if field == "city"
        ));
        assert_nothing_written(&db).await;
    }

    #[tokio::test]
    async fn test_promo_applied_and_recorded_after_commit() {
        let db = sample_db().await;
        let now = Utc::now();
        db.promos()
            .insert(&Promotion {
                code: "SAVE10".to_string(),
                kind: PromoKind::Percentage { bps: 1000 },
                usage_limit: Some(100),
                uses: 0,
                per_customer_only: false,
                expires_at: None,
                active: true,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        // $299.99 subtotal, 10% off = $30.00 discount, tax $24.00
        let mut req = request(vec![sample_line("prod-jacket", 29999, 1)]);
        req.promo_code = Some("save10".to_string()); // any casing works

        let order = db
            .checkout()
            .place_order(req, &PricingConfig::default())
            .await
            .unwrap();

        assert_eq!(order.discount_cents, 3000);
        assert_eq!(order.promo_code.as_deref(), Some("save10"));
        assert_eq!(
            order.total_cents,
            order.subtotal_cents + order.shipping_cents + order.tax_cents
                - order.discount_cents
        );

        // Placement alone does NOT consume a redemption...
        assert_eq!(db.promos().get_by_code("SAVE10").await.unwrap().unwrap().uses, 0);

        // ...the caller records it after the commit
        assert!(db.promos().record_use("save10").await.unwrap());
        assert_eq!(db.promos().get_by_code("SAVE10").await.unwrap().unwrap().uses, 1);
    }

    #[tokio::test]
    async fn test_rejected_promo_blocks_placement() {
        let db = sample_db().await;

        let mut req = request(vec![sample_line("prod-jacket", 29999, 1)]);
        req.promo_code = Some("NOSUCHCODE".to_string());

        let err = db
            .checkout()
            .place_order(req, &PricingConfig::default())
            .await
            .unwrap_err();

        assert_eq!(err.code(), "PROMO_NOT_FOUND");
        assert_nothing_written(&db).await;
    }

    #[tokio::test]
    async fn test_distinct_billing_address_gets_its_own_row() {
        let db = sample_db().await;

        let mut billing = sample_address();
        billing.line1 = "2 Finance Plaza".to_string();

        let mut req = request(vec![sample_line("prod-jacket", 29999, 1)]);
        req.billing_address = Some(billing.clone());

        let order = db
            .checkout()
            .place_order(req, &PricingConfig::default())
            .await
            .unwrap();

        assert_ne!(order.billing_address_id, order.shipping_address_id);
        assert_eq!(order.billing_address, billing);
        assert_eq!(table_count(&db, "addresses").await, 2);
    }

    #[tokio::test]
    async fn test_identical_billing_address_reuses_shipping_row() {
        let db = sample_db().await;

        let mut req = request(vec![sample_line("prod-jacket", 29999, 1)]);
        req.billing_address = Some(sample_address()); // structurally identical

        let order = db
            .checkout()
            .place_order(req, &PricingConfig::default())
            .await
            .unwrap();

        assert_eq!(order.billing_address_id, order.shipping_address_id);
        assert_eq!(table_count(&db, "addresses").await, 1);
    }

    #[tokio::test]
    async fn test_item_insert_failure_rolls_back_order_and_addresses() {
        let db = sample_db().await;

        // The second line references a product id that is not in the
        // catalog; the foreign key fails the snapshot insert AFTER the
        // address and order rows were written inside the transaction.
        let err = db
            .checkout()
            .place_order(
                request(vec![
                    sample_line("prod-jacket", 29999, 1),
                    sample_line("prod-ghost", 1000, 1),
                ]),
                &PricingConfig::default(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), "ORDER_CREATE_FAILED");
        assert!(matches!(err, PlaceOrderError::CreateFailed(_)));

        // A subsequent read finds zero rows for the attempt
        assert_nothing_written(&db).await;
    }

    #[tokio::test]
    async fn test_address_snapshot_survives_address_edits() {
        let db = sample_db().await;
        let order = place_sample_order(&db, "user-1").await;

        // Mutate the persisted address row after the fact
        sqlx::query("UPDATE addresses SET line1 = 'REWRITTEN' WHERE id = ?1")
            .bind(&order.shipping_address_id)
            .execute(db.pool())
            .await
            .unwrap();

        // The order still displays what was submitted at placement time
        let fetched = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(fetched.shipping_address.line1, "1 Main Street");
    }

    #[tokio::test]
    async fn test_express_shipping_and_fixed_promo_totals() {
        let db = sample_db().await;
        let now = Utc::now();
        db.promos()
            .insert(&Promotion {
                code: "TWENTYOFF".to_string(),
                kind: PromoKind::Fixed { amount_cents: 2000 },
                usage_limit: None,
                uses: 0,
                per_customer_only: false,
                expires_at: None,
                active: true,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        // $30.00 cart, express $25.00, $20 off, tax $2.40 ⇒ total $37.40
        let mut req = request(vec![sample_line("prod-jacket", 3000, 1)]);
        req.shipping_method = ShippingMethod::Express;
        req.promo_code = Some("TWENTYOFF".to_string());

        let order = db
            .checkout()
            .place_order(req, &PricingConfig::default())
            .await
            .unwrap();

        assert_eq!(order.subtotal_cents, 3000);
        assert_eq!(order.shipping_cents, 2500);
        assert_eq!(order.discount_cents, 2000);
        assert_eq!(order.tax_cents, 240);
        assert_eq!(order.total_cents, 3740);
    }
}
