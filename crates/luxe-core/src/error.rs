//! # Error Types
//!
//! Domain-specific error types for luxe-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  luxe-core errors (this file)                                           │
//! │  ├── CheckoutError    - Checkout rejections (empty cart, bad address)   │
//! │  ├── PromoRejection   - Why a promo code did not apply                  │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  luxe-db errors (separate crate)                                        │
//! │  ├── DbError          - Database operation failures                     │
//! │  └── PlaceOrderError  - Rejection or ORDER_CREATE_FAILED                │
//! │                                                                         │
//! │  Flow: ValidationError → CheckoutError → PlaceOrderError → API layer    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Errors are enum variants, never bare Strings
//! 3. Every checkout/promo variant carries a stable machine-readable
//!    `code()` so the UI can render an exact message per case
//! 4. Promo rejections are ordinary return values, not exceptions - the
//!    validator reports a tagged reason and never panics or raises

use thiserror::Error;

// =============================================================================
// Promo Rejection
// =============================================================================

/// Why a promo code did not apply.
///
/// These are reported to the caller as values (the validator returns
/// `Result<Money, PromoRejection>`); each variant maps to one exact message
/// in the UI, in the order the checks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PromoRejection {
    /// No promotion exists under this code (case-insensitive lookup).
    #[error("Promo code not found")]
    NotFound,

    /// The code exists but an administrator has deactivated it.
    #[error("Promo code is not active")]
    Inactive,

    /// The code's expiry timestamp is in the past.
    #[error("Promo code has expired")]
    Expired,

    /// Total redemptions have reached the usage cap.
    #[error("Promo code usage limit reached")]
    LimitReached,

    /// The code is live but yields no discount on this cart.
    #[error("Promo does not apply to this cart")]
    NotApplicable,
}

impl PromoRejection {
    /// Stable machine-readable identifier for API consumers.
    pub const fn code(&self) -> &'static str {
        match self {
            PromoRejection::NotFound => "PROMO_NOT_FOUND",
            PromoRejection::Inactive => "PROMO_INACTIVE",
            PromoRejection::Expired => "PROMO_EXPIRED",
            PromoRejection::LimitReached => "PROMO_LIMIT_REACHED",
            PromoRejection::NotApplicable => "PROMO_NOT_APPLICABLE",
        }
    }
}

// =============================================================================
// Checkout Error
// =============================================================================

/// Checkout rejections raised before any database write.
///
/// Each is terminal for the attempt: the caller (UI) decides whether to fix
/// the input and retry. Nothing here implies partial state - rejections
/// happen strictly before the order transaction opens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// The cart has no lines.
    #[error("Order must contain at least one item")]
    EmptyCart,

    /// The computed grand total is not positive.
    #[error("Invalid order total")]
    InvalidTotal,

    /// The shipping (or billing) address is missing required fields.
    #[error("Invalid address: {field} is required")]
    InvalidAddress { field: String },

    /// The supplied promo code was rejected.
    #[error(transparent)]
    Promo(#[from] PromoRejection),
}

impl CheckoutError {
    /// Stable machine-readable identifier for API consumers.
    pub const fn code(&self) -> &'static str {
        match self {
            CheckoutError::EmptyCart => "EMPTY_CART",
            CheckoutError::InvalidTotal => "INVALID_TOTAL",
            CheckoutError::InvalidAddress { .. } => "INVALID_ADDRESS",
            CheckoutError::Promo(rejection) => rejection.code(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when user input doesn't meet requirements, before business
/// logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., bad promo code characters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in the allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience alias for checkout-rule results.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_messages() {
        assert_eq!(PromoRejection::NotFound.to_string(), "Promo code not found");
        assert_eq!(
            PromoRejection::LimitReached.to_string(),
            "Promo code usage limit reached"
        );
    }

    #[test]
    fn test_rejection_codes() {
        assert_eq!(PromoRejection::Expired.code(), "PROMO_EXPIRED");
        assert_eq!(PromoRejection::Inactive.code(), "PROMO_INACTIVE");
    }

    #[test]
    fn test_checkout_codes() {
        assert_eq!(CheckoutError::EmptyCart.code(), "EMPTY_CART");
        assert_eq!(CheckoutError::InvalidTotal.code(), "INVALID_TOTAL");
        assert_eq!(
            CheckoutError::InvalidAddress {
                field: "city".to_string()
            }
            .code(),
            "INVALID_ADDRESS"
        );
        // A promo rejection keeps its own code through the wrapper
        let wrapped: CheckoutError = PromoRejection::NotFound.into();
        assert_eq!(wrapped.code(), "PROMO_NOT_FOUND");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "line1".to_string(),
        };
        assert_eq!(err.to_string(), "line1 is required");
    }
}
