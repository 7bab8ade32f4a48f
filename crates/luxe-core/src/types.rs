//! # Domain Types
//!
//! Core domain types used throughout the Luxe storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Order       │   │   Promotion     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  code (unique)  │       │
//! │  │  name           │   │  status         │   │  kind (tagged)  │       │
//! │  │  price_cents    │   │  total_cents    │   │  usage_limit    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Address      │   │   OrderItem     │   │   OrderStatus   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id + owner_id  │   │  *_snapshot     │   │  Pending        │       │
//! │  │  role, defaults │   │  frozen price   │   │  ... Cancelled  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! An `Order` freezes everything the customer saw at purchase time: item
//! name/image/price on each `OrderItem`, and the full postal address on the
//! order row itself. Later catalog or address-book edits never rewrite
//! history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 800 bps = 8% (the storefront default sales tax)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product available in the storefront.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown in listings and on order snapshots.
    pub name: String,

    /// Optional long-form description for the product page.
    pub description: Option<String>,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Merchandising category ("Outerwear", "Accessories", ...).
    pub category: Option<String>,

    /// Primary image reference, snapshotted onto order items at purchase.
    pub image_url: Option<String>,

    /// Whether the product appears in featured placements.
    pub featured: bool,

    /// Whether the product is active (soft delete).
    pub is_active: bool,

    /// When the product was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Promotion
// =============================================================================

/// What a promotion is worth, as a tagged variant.
///
/// A tagged enum rather than a free-form `type` string plus a value column:
/// the pricing engine has to handle both arms exhaustively, checked by the
/// compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PromoKind {
    /// Percentage off the cart subtotal, in basis points (1000 = 10% off).
    Percentage { bps: u32 },
    /// Fixed amount off, in cents.
    Fixed { amount_cents: i64 },
}

impl PromoKind {
    /// Computes the discount this promotion yields on a given subtotal.
    ///
    /// The result is always within `[0, subtotal]`: a 150%-off code or a
    /// fixed amount larger than the cart discounts the whole subtotal and
    /// nothing more.
    pub fn discount(&self, subtotal: Money) -> Money {
        let raw = match *self {
            PromoKind::Percentage { bps } => subtotal.percent_bps(bps),
            PromoKind::Fixed { amount_cents } => Money::from_cents(amount_cents),
        };
        raw.clamp_non_negative().min(subtotal)
    }
}

/// A redeemable promo code with its eligibility constraints.
///
/// Created by an administrator. `uses` is incremented only after an order
/// durably commits (see the promo repository), never by validation alone,
/// so abandoned checkouts cannot consume a code.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Promotion {
    /// The code customers type, unique case-insensitively.
    pub code: String,

    /// Percentage or fixed value (tagged).
    pub kind: PromoKind,

    /// Maximum total redemptions; `None` means unlimited.
    pub usage_limit: Option<i64>,

    /// Successful redemptions so far. Never decremented.
    pub uses: i64,

    /// Declared in the data model but not yet enforced by validation - a
    /// redemption ledger per customer does not exist yet.
    pub per_customer_only: bool,

    /// Expiry timestamp; `None` means the code never expires.
    #[ts(as = "Option<String>")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Kill switch: inactive codes are rejected outright.
    pub active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Promotion {
    /// Whether the code has expired relative to the given instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expiry) if expiry <= now)
    }

    /// Whether any redemptions remain under the usage cap.
    pub fn has_uses_remaining(&self) -> bool {
        match self.usage_limit {
            Some(limit) => self.uses < limit,
            None => true,
        }
    }
}

// =============================================================================
// Addresses
// =============================================================================

/// A plain postal address, with no identity attached.
///
/// This is both the checkout input and the frozen snapshot stored on an
/// order row. `PartialEq` is the structural-identity test checkout uses to
/// decide whether billing can reuse the shipping row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PostalAddress {
    pub recipient: String,
    pub phone: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

/// Which checkout role an address row was created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AddressRole {
    Shipping,
    Billing,
}

/// A saved address row in a customer's address book.
///
/// ## Invariant
/// At most one `is_default_shipping` and one `is_default_billing` address
/// per owner; the address repository enforces this at write time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Address {
    pub id: String,
    pub owner_id: String,
    pub recipient: String,
    pub phone: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub role: AddressRole,
    pub is_default_shipping: bool,
    pub is_default_billing: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Address {
    /// Extracts the plain postal fields, dropping identity and role.
    pub fn postal(&self) -> PostalAddress {
        PostalAddress {
            recipient: self.recipient.clone(),
            phone: self.phone.clone(),
            line1: self.line1.clone(),
            line2: self.line2.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            postal_code: self.postal_code.clone(),
            country: self.country.clone(),
        }
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// The lifecycle status of an order.
///
/// Transitions are admin-driven: pending → processing → shipped → completed
/// in the common path, with cancellation possible from any non-terminal
/// state. There is deliberately no transition table - the only guard is the
/// allow-list of valid values, parsed before any write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed, awaiting fulfilment.
    Pending,
    /// Being picked and packed.
    Processing,
    /// Handed to the carrier.
    Shipped,
    /// Delivered and closed.
    Completed,
    /// Cancelled before completion.
    Cancelled,
}

impl OrderStatus {
    /// The canonical lowercase form stored in the database and exposed
    /// over the API.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Whether this status permits no further transitions.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a status string against the allow-list.
///
/// Anything outside `pending|processing|shipped|completed|cancelled` is an
/// error, reported before any database write happens.
impl FromStr for OrderStatus {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(crate::error::ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: vec![
                    "pending".to_string(),
                    "processing".to_string(),
                    "shipped".to_string(),
                    "completed".to_string(),
                    "cancelled".to_string(),
                ],
            }),
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// A placed order.
///
/// Created exactly once per successful checkout, never deleted, only
/// status-mutated. Every total component is persisted so the invariant
/// `total = subtotal + shipping + tax - discount` is checkable per row.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub shipping_address_id: String,
    pub billing_address_id: String,
    /// Postal address frozen at placement time (see snapshot pattern above).
    pub shipping_address: PostalAddress,
    /// Billing counterpart; equals `shipping_address` when the customer
    /// reused it.
    pub billing_address: PostalAddress,
    pub subtotal_cents: i64,
    pub shipping_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    /// The promo code applied at checkout, if any.
    pub promo_code: Option<String>,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns the grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A line item on a placed order.
/// Uses the snapshot pattern to freeze product data at purchase time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// Product name at time of purchase (frozen).
    pub name_snapshot: String,
    /// Product image at time of purchase (frozen).
    pub image_snapshot: Option<String>,
    /// Unit price in cents at time of purchase (frozen).
    pub unit_price_cents: i64,
    /// Quantity purchased.
    pub quantity: i64,
    /// Line total (unit_price × quantity).
    pub line_total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(800);
        assert_eq!(rate.bps(), 800);
        assert!((rate.percentage() - 8.0).abs() < 0.001);
    }

    #[test]
    fn test_tax_rate_from_percentage() {
        let rate = TaxRate::from_percentage(8.25);
        assert_eq!(rate.bps(), 825);
    }

    #[test]
    fn test_promo_kind_discount_clamped() {
        let subtotal = Money::from_cents(10000);

        // 10% of $100.00
        let pct = PromoKind::Percentage { bps: 1000 };
        assert_eq!(pct.discount(subtotal).cents(), 1000);

        // 150% clamps to the subtotal
        let over = PromoKind::Percentage { bps: 15000 };
        assert_eq!(over.discount(subtotal), subtotal);

        // Fixed amount larger than the cart clamps too
        let big_fixed = PromoKind::Fixed {
            amount_cents: 99999,
        };
        assert_eq!(big_fixed.discount(subtotal), subtotal);

        // Garbage negative value never produces a negative discount
        let negative = PromoKind::Fixed { amount_cents: -500 };
        assert_eq!(negative.discount(subtotal), Money::zero());
    }

    #[test]
    fn test_promotion_expiry() {
        let now = Utc::now();
        let mut promo = sample_promo();

        promo.expires_at = None;
        assert!(!promo.is_expired(now));

        promo.expires_at = Some(now + Duration::days(1));
        assert!(!promo.is_expired(now));

        promo.expires_at = Some(now - Duration::days(1));
        assert!(promo.is_expired(now));
    }

    #[test]
    fn test_promotion_uses_remaining() {
        let mut promo = sample_promo();

        promo.usage_limit = None;
        promo.uses = 1_000_000;
        assert!(promo.has_uses_remaining());

        promo.usage_limit = Some(5);
        promo.uses = 4;
        assert!(promo.has_uses_remaining());

        promo.uses = 5;
        assert!(!promo.has_uses_remaining());
    }

    #[test]
    fn test_order_status_parse_allow_list() {
        assert_eq!("pending".parse::<OrderStatus>().unwrap(), OrderStatus::Pending);
        assert_eq!("shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert_eq!(
            "cancelled".parse::<OrderStatus>().unwrap(),
            OrderStatus::Cancelled
        );

        assert!("refunded".parse::<OrderStatus>().is_err());
        assert!("PENDING".parse::<OrderStatus>().is_err());
        assert!("".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_order_status_terminal() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_postal_address_structural_equality() {
        let a = sample_address();
        let mut b = sample_address();
        assert_eq!(a, b);

        b.line1 = "2 Other Street".to_string();
        assert_ne!(a, b);
    }

    fn sample_promo() -> Promotion {
        let now = Utc::now();
        Promotion {
            code: "SAVE10".to_string(),
            kind: PromoKind::Percentage { bps: 1000 },
            usage_limit: None,
            uses: 0,
            per_customer_only: false,
            expires_at: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_address() -> PostalAddress {
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
}
