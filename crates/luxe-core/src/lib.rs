//! # luxe-core: Pure Business Logic for the Luxe Storefront
//!
//! This crate is the heart of the storefront backend. It contains all
//! business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Luxe Commerce Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Storefront / Admin Frontend                     │   │
//! │  │    Catalog ──► Cart ──► Checkout ──► Order History / Admin       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP API                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ luxe-core (THIS CRATE) ★                         │   │
//! │  │                                                                  │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │  pricing  │   │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │   quote   │   │   │
//! │  │   │   Order   │  │  TaxRate  │  │ CartLine  │  │  shipping │   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │   ┌───────────┐  ┌───────────┐                                  │   │
//! │  │   │   promo   │  │ validation│                                  │   │
//! │  │   │ validate  │  │   rules   │                                  │   │
//! │  │   └───────────┘  └───────────┘                                  │   │
//! │  │                                                                  │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   luxe-db (Database Layer)                       │   │
//! │  │        SQLite repositories, checkout transaction, migrations     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Promotion, Address, Order, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Cart and cart lines with variant keying
//! - [`pricing`] - The pricing engine (subtotal/shipping/tax/discount/total)
//! - [`promo`] - Promotion validation
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input =
//!    same output. Even "now" is an argument where time matters.
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64)
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use luxe_core::cart::{Cart, CartLine};
//! use luxe_core::money::Money;
//! use luxe_core::pricing::{quote, PricingConfig, ShippingMethod};
//! use chrono::Utc;
//!
//! let mut cart = Cart::new();
//! cart.add(CartLine {
//!     product_id: "p1".to_string(),
//!     name: "Classic Watch".to_string(),
//!     unit_price_cents: 5000,
//!     quantity: 2,
//!     size: None,
//!     color: None,
//!     image_url: None,
//!     added_at: Utc::now(),
//! }).unwrap();
//!
//! let totals = quote(
//!     &cart,
//!     ShippingMethod::Standard,
//!     Money::zero(),
//!     &PricingConfig::default(),
//! );
//! assert_eq!(totals.total.cents(), 10800); // $100 + 8% tax, free shipping
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod pricing;
pub mod promo;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use luxe_core::Money` instead of
// `use luxe_core::money::Money`

pub use cart::{Cart, CartError, CartLine};
pub use error::{CheckoutError, PromoRejection, ValidationError};
pub use money::Money;
pub use pricing::{quote, CartTotals, PricingConfig, ShippingMethod};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
///
/// Prevents runaway carts and keeps checkout requests bounded.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single variant in the cart.
///
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;
