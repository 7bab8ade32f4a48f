//! # Cart Module
//!
//! The shopping cart: an ordered list of lines, each freezing the product
//! data the customer saw when they added it.
//!
//! ## Variant Keying
//! A cart line is identified by `(product_id, size, color)` - the same
//! jacket in Medium/Black and Large/Black are two separate lines. Adding an
//! existing variant again merges quantities instead of duplicating the line.
//!
//! ## Price Freezing
//! `unit_price_cents` is captured when the line is created. If the catalog
//! price changes while the customer is browsing, the cart keeps charging
//! what it displayed. The order transaction snapshots the same figure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::money::Money;
use crate::types::Product;
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

// =============================================================================
// Cart Errors
// =============================================================================

/// Cart mutation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CartError {
    /// Quantity must be positive and within the per-line cap.
    #[error("Quantity must be between 1 and {max}")]
    InvalidQuantity { max: i64 },

    /// The cart has reached the maximum number of distinct lines.
    #[error("Cart cannot have more than {max} items")]
    TooManyLines { max: usize },

    /// No line matches the given product/size/color.
    #[error("Item is not in the cart")]
    LineNotFound,
}

// =============================================================================
// Cart Line
// =============================================================================

/// A single line in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    /// Product ID (UUID), for catalog lookup at checkout.
    pub product_id: String,

    /// Product name at time of adding (frozen).
    pub name: String,

    /// Price in cents at time of adding (frozen).
    pub unit_price_cents: i64,

    /// Quantity in cart. Always positive.
    pub quantity: i64,

    /// Selected size variant, if the product has sizes.
    pub size: Option<String>,

    /// Selected color variant, if the product has colors.
    pub color: Option<String>,

    /// Image reference at time of adding (frozen).
    pub image_url: Option<String>,

    /// When this line was added to the cart.
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Creates a cart line from a catalog product, freezing its current
    /// name, price and image.
    pub fn from_product(
        product: &Product,
        quantity: i64,
        size: Option<String>,
        color: Option<String>,
    ) -> Self {
        CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price_cents: product.price_cents,
            quantity,
            size,
            color,
            image_url: product.image_url.clone(),
            added_at: Utc::now(),
        }
    }

    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Calculates the line total (unit price × quantity).
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }

    /// Whether this line is the `(product, size, color)` variant.
    fn is_variant(&self, product_id: &str, size: Option<&str>, color: Option<&str>) -> bool {
        self.product_id == product_id
            && self.size.as_deref() == size
            && self.color.as_deref() == color
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by `(product_id, size, color)`
/// - Every quantity is in `1..=MAX_LINE_QUANTITY`
/// - At most `MAX_CART_LINES` distinct lines
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    /// Lines in the cart, in insertion order.
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds a line to the cart, merging quantities if the same variant is
    /// already present.
    pub fn add(&mut self, line: CartLine) -> Result<(), CartError> {
        validate_quantity(line.quantity)?;

        if let Some(existing) = self.lines.iter_mut().find(|l| {
            l.is_variant(&line.product_id, line.size.as_deref(), line.color.as_deref())
        }) {
            let merged = existing.quantity + line.quantity;
            if merged > MAX_LINE_QUANTITY {
                return Err(CartError::InvalidQuantity {
                    max: MAX_LINE_QUANTITY,
                });
            }
            existing.quantity = merged;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CartError::TooManyLines {
                max: MAX_CART_LINES,
            });
        }

        self.lines.push(line);
        Ok(())
    }

    /// Sets the quantity of an existing variant. Zero removes the line.
    pub fn update_quantity(
        &mut self,
        product_id: &str,
        size: Option<&str>,
        color: Option<&str>,
        quantity: i64,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove(product_id, size, color);
        }
        validate_quantity(quantity)?;

        match self
            .lines
            .iter_mut()
            .find(|l| l.is_variant(product_id, size, color))
        {
            Some(line) => {
                line.quantity = quantity;
                Ok(())
            }
            None => Err(CartError::LineNotFound),
        }
    }

    /// Removes a variant from the cart.
    pub fn remove(
        &mut self,
        product_id: &str,
        size: Option<&str>,
        color: Option<&str>,
    ) -> Result<(), CartError> {
        let before = self.lines.len();
        self.lines.retain(|l| !l.is_variant(product_id, size, color));

        if self.lines.len() == before {
            Err(CartError::LineNotFound)
        } else {
            Ok(())
        }
    }

    /// Empties the cart. Called by the checkout caller after an order
    /// commits - never by the order transaction itself.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// The subtotal: sum of line totals, before shipping/tax/discount.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(|l| l.line_total()).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn validate_quantity(quantity: i64) -> Result<(), CartError> {
    if quantity <= 0 || quantity > MAX_LINE_QUANTITY {
        return Err(CartError::InvalidQuantity {
            max: MAX_LINE_QUANTITY,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
