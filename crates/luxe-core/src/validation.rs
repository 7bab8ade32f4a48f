//! # Validation Module
//!
//! Input validation utilities for the storefront core.
//!
//! Validation here is the second of three layers - the frontend gives
//! immediate feedback, these functions enforce business rules before any
//! persistence, and the database schema backstops with NOT NULL / UNIQUE /
//! foreign-key constraints.
//!
//! ## Usage
//! ```rust
//! use luxe_core::validation::validate_promo_code;
//!
//! assert!(validate_promo_code("SAVE10").is_ok());
//! assert!(validate_promo_code("").is_err());
//! ```

use crate::error::ValidationError;
use crate::types::PostalAddress;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Address Validation
// =============================================================================

/// Validates that a postal address carries every required field.
///
/// ## Rules
/// - `recipient`, `phone`, `line1`, `city`, `state`, `postal_code` and
///   `country` must be non-blank
/// - `line2` is optional
///
/// Returns the FIRST missing field, so the caller can point the customer at
/// one concrete input to fix.
pub fn validate_postal_address(address: &PostalAddress) -> ValidationResult<()> {
    let required: [(&str, &str); 7] = [
        ("recipient", &address.recipient),
        ("phone", &address.phone),
        ("line1", &address.line1),
        ("city", &address.city),
        ("state", &address.state),
        ("postal_code", &address.postal_code),
        ("country", &address.country),
    ];

    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ValidationError::Required {
                field: field.to_string(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Promo Code Validation
// =============================================================================

/// Validates the shape of a promo code.
///
/// ## Rules
/// - Must not be empty
/// - Maximum 40 characters
/// - Only letters, numbers, hyphens, and underscores
///
/// Case is NOT normalized here - lookup is case-insensitive at the
/// repository layer.
pub fn validate_promo_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > 40 {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: 40,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validation
// =============================================================================

/// Validates a price in cents.
///
/// Zero is allowed (free items); negative prices are not.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a product name for admin catalog writes.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validation
// =============================================================================

/// Validates a UUID string format.
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> PostalAddress {
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

    #[test]
    fn test_valid_address() {
        assert!(validate_postal_address(&address()).is_ok());
    }

    #[test]
    fn test_line2_is_optional() {
        let mut addr = address();
        addr.line2 = Some("Apt 4B".to_string());
        assert!(validate_postal_address(&addr).is_ok());
        addr.line2 = None;
        assert!(validate_postal_address(&addr).is_ok());
    }

    #[test]
    fn test_missing_fields_reported_by_name() {
        let mut addr = address();
        addr.city = "   ".to_string();
        assert_eq!(
            validate_postal_address(&addr),
            Err(ValidationError::Required {
                field: "city".to_string()
            })
        );

        let mut addr = address();
        addr.postal_code = String::new();
        assert_eq!(
            validate_postal_address(&addr),
            Err(ValidationError::Required {
                field: "postal_code".to_string()
            })
        );
    }

    #[test]
    fn test_validate_promo_code() {
        assert!(validate_promo_code("SAVE10").is_ok());
        assert!(validate_promo_code("spring_sale-2026").is_ok());

        assert!(validate_promo_code("").is_err());
        assert!(validate_promo_code("   ").is_err());
        assert!(validate_promo_code("HAS SPACE").is_err());
        assert!(validate_promo_code(&"A".repeat(50)).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(4999).is_ok());
        assert!(validate_price_cents(-1).is_err());
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Premium Leather Jacket").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
    }
}
