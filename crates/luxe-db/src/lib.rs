//! # luxe-db: Database Layer for the Luxe Storefront
//!
//! This crate provides database access for the storefront backend.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Luxe Commerce Data Flow                           │
//! │                                                                         │
//! │  API Handler (POST /orders)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      luxe-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │   Database    │   │  Repositories  │   │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │   │  product/promo │   │  (embedded)  │   │   │
//! │  │   │               │◄──│  address/order │   │ 001_init.sql │   │   │
//! │  │   │  SqlitePool   │   ├────────────────┤   │ 002_snap.sql │   │   │
//! │  │   │  WAL + FKs    │◄──│  checkout.rs   │   │              │   │   │
//! │  │   └───────────────┘   │  (transaction) │   └──────────────┘   │   │
//! │  │                       └────────────────┘                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (luxe.db)                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (product, promo, ...)
//! - [`checkout`] - The order placement transaction
//!
//! ## Usage
//!
//! ```rust,ignore
//! use luxe_db::{Database, DbConfig};
//! use luxe_core::pricing::PricingConfig;
//!
//! // Create database with default config (runs migrations)
//! let db = Database::new(DbConfig::new("path/to/luxe.db")).await?;
//!
//! // Place an order atomically
//! let order = db.checkout().place_order(request, &PricingConfig::default()).await?;
//!
//! // After the commit, the caller settles the side effects
//! if let Some(code) = &order.promo_code {
//!     db.promos().record_use(code).await?;
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::{CheckoutService, PlaceOrderError, PlaceOrderRequest};
pub use error::DbError;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::address::AddressRepository;
pub use repository::order::{OrderRepository, OrderWithItems};
pub use repository::product::ProductRepository;
pub use repository::promo::{PromoOutcome, PromoRepository};
