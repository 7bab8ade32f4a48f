//! # Pricing Engine
//!
//! Pure computation of a cart's price breakdown: subtotal, shipping, tax,
//! discount, grand total. No side effects - the storefront calls this on
//! every quantity change and shipping-method toggle for live totals, and
//! the checkout transaction calls it one last time before persisting.
//!
//! ## The One Formula
//! ```text
//! subtotal = Σ(unit_price × quantity)
//! shipping = free above threshold (standard) / flat surcharge (express)
//! tax      = subtotal × tax_rate, rounded half-up once
//! discount = promo output, clamped to [0, subtotal]
//! total    = max(0, subtotal + shipping + tax − discount)
//! ```
//!
//! Every constant in the formula lives on [`PricingConfig`] - there are no
//! magic numbers at call sites.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::money::Money;
use crate::types::TaxRate;

// =============================================================================
// Shipping Method
// =============================================================================

/// The shipping option the customer selected at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    /// Standard delivery (5-7 business days).
    Standard,
    /// Express delivery (1-2 business days), flat surcharge.
    Express,
}

impl Default for ShippingMethod {
    fn default() -> Self {
        ShippingMethod::Standard
    }
}

// =============================================================================
// Pricing Configuration
// =============================================================================

/// The configuration constants driving the pricing engine.
///
/// Defaults match the storefront's published rates; deployments override
/// them at startup, never per-request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingConfig {
    /// Sales tax rate applied to the subtotal. Default: 8%.
    pub tax_rate: TaxRate,

    /// Standard shipping is free for subtotals strictly above this.
    /// Default: $100.00.
    pub free_shipping_threshold: Money,

    /// Standard shipping rate below the threshold. Default: $0.00.
    pub standard_shipping: Money,

    /// Flat express surcharge, charged regardless of subtotal.
    /// Default: $25.00.
    pub express_surcharge: Money,
}

impl Default for PricingConfig {
    fn default() -> Self {
        PricingConfig {
            tax_rate: TaxRate::from_bps(800),
            free_shipping_threshold: Money::from_major_minor(100, 0),
            standard_shipping: Money::zero(),
            express_surcharge: Money::from_major_minor(25, 0),
        }
    }
}

impl PricingConfig {
    /// Overrides the tax rate.
    pub fn tax_rate(mut self, rate: TaxRate) -> Self {
        self.tax_rate = rate;
        self
    }

    /// Overrides the express surcharge.
    pub fn express_surcharge(mut self, surcharge: Money) -> Self {
        self.express_surcharge = surcharge;
        self
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// The full price breakdown for a cart.
///
/// Persisted verbatim onto the order row, so the invariant
/// `total = subtotal + shipping + tax − discount` is checkable per order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartTotals {
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
}

// =============================================================================
// Pricing Functions
// =============================================================================

/// Computes the shipping cost for a subtotal and method.
///
/// Standard shipping is free strictly above the threshold (a $100.01 cart
/// ships free; a $100.00 cart pays the standard rate, which defaults to
/// free anyway). Express always pays the flat surcharge.
pub fn shipping_cost(
    subtotal: Money,
    method: ShippingMethod,
    config: &PricingConfig,
) -> Money {
    match method {
        ShippingMethod::Standard => {
            if subtotal > config.free_shipping_threshold {
                Money::zero()
            } else {
                config.standard_shipping
            }
        }
        ShippingMethod::Express => config.express_surcharge,
    }
}

/// Prices a cart: the Pricing Engine entry point.
///
/// `discount` is whatever the promotion validator returned (zero when no
/// code is applied); it is clamped here to `[0, subtotal]` so a discount
/// can never exceed the goods, and the total is clamped to `>= 0`.
///
/// Pure and idempotent - safe to call repeatedly as the customer edits
/// quantities or toggles the shipping method.
pub fn quote(
    cart: &Cart,
    method: ShippingMethod,
    discount: Money,
    config: &PricingConfig,
) -> CartTotals {
    let subtotal = cart.subtotal();
    let shipping = shipping_cost(subtotal, method, config);
    let tax = subtotal.calculate_tax(config.tax_rate);
    let discount = discount.clamp_non_negative().min(subtotal);
    let total = (subtotal + shipping + tax - discount).clamp_non_negative();

    CartTotals {
        subtotal,
        shipping,
        tax,
        discount,
        total,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
