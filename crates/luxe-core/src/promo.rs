//! # Promotion Validator
//!
//! Decides whether a promo code applies to a cart, and for how much.
//!
//! ## Check Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate(promo, subtotal, now)                                         │
//! │                                                                         │
//! │  1. lookup (repository layer)  ── miss ──►  PROMO_NOT_FOUND             │
//! │  2. active?                    ── no ────►  PROMO_INACTIVE              │
//! │  3. unexpired at `now`?        ── no ────►  PROMO_EXPIRED               │
//! │  4. uses < usage_limit?        ── no ────►  PROMO_LIMIT_REACHED         │
//! │  5. discount > 0 on this cart? ── no ────►  PROMO_NOT_APPLICABLE        │
//! │                │                                                        │
//! │                └──────────────── yes ────►  Ok(discount)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Checks short-circuit on the first failure so the caller can render the
//! exact reason. Rejections are values, never panics.
//!
//! ## What Validation Does NOT Do
//! Success does not consume a redemption. `uses` is incremented by a
//! separate repository operation only after the order durably commits -
//! otherwise abandoned checkouts would eat limited codes.
//!
//! The lookup itself (check 1) lives at the repository boundary; this
//! module is pure, and time is an explicit argument so tests never sleep.

use chrono::{DateTime, Utc};

use crate::error::PromoRejection;
use crate::money::Money;
use crate::types::Promotion;

/// Validates a promotion against a cart subtotal at a given instant.
///
/// Returns the discount amount (already clamped to `[0, subtotal]`) or the
/// first failing check's rejection.
pub fn validate(
    promo: &Promotion,
    subtotal: Money,
    now: DateTime<Utc>,
) -> Result<Money, PromoRejection> {
    if !promo.active {
        return Err(PromoRejection::Inactive);
    }

    if promo.is_expired(now) {
        return Err(PromoRejection::Expired);
    }

    if !promo.has_uses_remaining() {
        return Err(PromoRejection::LimitReached);
    }

    let discount = promo.kind.discount(subtotal);
    if !discount.is_positive() {
        return Err(PromoRejection::NotApplicable);
    }

    Ok(discount)
}

// =============================================================================
// Unit Tests
// =============================================================================
