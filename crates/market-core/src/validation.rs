//! # Validation Module
//!
//! Field-level business rules for the marketplace.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: axum extractors                                              │
//! │  └── JSON shape and types (serde)                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (pure)                                           │
//! │  └── ranges, enum spellings, fee integrity                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: services (store lookups)                                     │
//! │  └── existence checks, uniqueness, available stock                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: SQLite                                                       │
//! │  └── UNIQUE / CHECK / FOREIGN KEY constraints                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every validator returns the first failing rule only. Callers run them in
//! a fixed order so that a request with several bad fields always reports
//! the same one.

use crate::error::{CoreError, ValidationError};
use crate::money::{calculate_payment_amount, Money};
use crate::types::{DeliveryType, PaymentType, ProductType};
use crate::{MAX_PRODUCT_CONDITION, MAX_PRODUCT_IMAGES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Account Validators
// =============================================================================

/// Validates an account email.
///
/// Only emptiness is checked; the address is stored and compared exactly
/// as given (case-sensitive).
///
/// ## Example
/// ```rust
/// use market_core::validation::validate_email;
///
/// assert!(validate_email("ann@shop.sg").is_ok());
/// assert!(validate_email("   ").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    if email.trim().is_empty() {
        return Err(ValidationError::bad("email"));
    }
    Ok(())
}

/// Validates a sign-up password (must not be empty).
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::bad("password"));
    }
    Ok(())
}

/// Validates a seller's display name (must not be blank).
pub fn validate_seller_name(name: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::bad("seller_name"));
    }
    Ok(())
}

// =============================================================================
// Product Validators
// =============================================================================

/// Validates a product price in minor units.
///
/// Zero is allowed (free items).
///
/// ## Example
/// ```rust
/// use market_core::validation::validate_price;
///
/// assert!(validate_price(0).is_ok());
/// assert!(validate_price(-1).is_err());
/// ```
pub fn validate_price(cents: i64) -> ValidationResult<Money> {
    if cents < 0 {
        return Err(ValidationError::bad("price"));
    }
    Ok(Money::from_cents(cents))
}

/// Validates a condition grade in `0..=5`.
pub fn validate_condition(condition: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRODUCT_CONDITION).contains(&condition) {
        return Err(ValidationError::bad("condition"));
    }
    Ok(())
}

/// Parses `"Buy-Now"` / `"Pre-Order"` exactly.
pub fn validate_product_type(value: &str) -> ValidationResult<ProductType> {
    value.parse()
}

/// Validates the number of units a seller lists (at least one).
pub fn validate_product_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity < 1 {
        return Err(ValidationError::bad("product_quantity"));
    }
    Ok(())
}

/// Validates the number of files in an image upload.
///
/// ## Rules
/// - At least one image
/// - At most [`MAX_PRODUCT_IMAGES`]
pub fn validate_image_count(count: usize) -> Result<(), CoreError> {
    if count == 0 {
        return Err(CoreError::NoImagesAttached);
    }
    if count > MAX_PRODUCT_IMAGES {
        return Err(CoreError::TooManyImages {
            max: MAX_PRODUCT_IMAGES,
        });
    }
    Ok(())
}

// =============================================================================
// Order Validators
// =============================================================================

/// Validates an order quantity against the product's remaining stock.
///
/// ## Rules
/// `0 < quantity <= available`
///
/// ## Example
/// ```rust
/// use market_core::validation::validate_order_quantity;
///
/// assert!(validate_order_quantity(3, 3).is_ok());
/// assert!(validate_order_quantity(0, 3).is_err());
/// assert!(validate_order_quantity(4, 3).is_err());
/// ```
pub fn validate_order_quantity(quantity: i64, available: i64) -> ValidationResult<()> {
    if quantity <= 0 || quantity > available {
        return Err(ValidationError::bad("order_quantity"));
    }
    Ok(())
}

/// Parses `"card"` / `"paynow_online"` exactly.
pub fn validate_payment_type(value: &str) -> ValidationResult<PaymentType> {
    value.parse()
}

/// Parses `"standard_delivery"` / `"self_collection"` exactly.
pub fn validate_delivery_type(value: &str) -> ValidationResult<DeliveryType> {
    value.parse()
}

/// Checks that the client-supplied amount equals the server-side
/// calculation. This is the tamper check on order totals. A total too
/// large to represent is rejected the same way.
pub fn validate_amount(
    claimed: i64,
    price: Money,
    quantity: i64,
    payment_type: PaymentType,
    delivery_type: DeliveryType,
) -> ValidationResult<Money> {
    let expected = calculate_payment_amount(price, quantity, payment_type, delivery_type)
        .ok_or_else(|| ValidationError::bad("amount"))?;
    if expected.cents() != claimed {
        return Err(ValidationError::bad("amount"));
    }
    Ok(expected)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ann@shop.sg").is_ok());
        assert_eq!(
            validate_email("").unwrap_err().to_string(),
            "Bad email data"
        );
    }

    #[test]
    fn test_validate_password_and_name() {
        assert!(validate_password("hunter2").is_ok());
        assert!(validate_password("").is_err());
        assert!(validate_seller_name("Ann's Cameras").is_ok());
        assert_eq!(
            validate_seller_name(" ").unwrap_err().to_string(),
            "Bad seller_name data"
        );
    }

    #[rstest]
    #[case(0, true)]
    #[case(1099, true)]
    #[case(-1, false)]
    fn test_validate_price(#[case] cents: i64, #[case] ok: bool) {
        assert_eq!(validate_price(cents).is_ok(), ok);
    }

    #[rstest]
    #[case(-1, false)]
    #[case(0, true)]
    #[case(5, true)]
    #[case(6, false)]
    fn test_validate_condition(#[case] condition: i64, #[case] ok: bool) {
        assert_eq!(validate_condition(condition).is_ok(), ok);
    }

    #[test]
    fn test_validate_product_type() {
        assert_eq!(validate_product_type("Buy-Now").unwrap(), ProductType::BuyNow);
        assert!(validate_product_type("Auction").is_err());
    }

    #[test]
    fn test_validate_image_count() {
        assert!(matches!(
            validate_image_count(0),
            Err(CoreError::NoImagesAttached)
        ));
        assert!(validate_image_count(1).is_ok());
        assert!(validate_image_count(5).is_ok());
        assert!(matches!(
            validate_image_count(6),
            Err(CoreError::TooManyImages { max: 5 })
        ));
    }

    #[rstest]
    #[case(1, 5, true)]
    #[case(5, 5, true)]
    #[case(0, 5, false)]
    #[case(-2, 5, false)]
    #[case(6, 5, false)]
    #[case(1, 0, false)]
    fn test_validate_order_quantity(
        #[case] quantity: i64,
        #[case] available: i64,
        #[case] ok: bool,
    ) {
        assert_eq!(validate_order_quantity(quantity, available).is_ok(), ok);
    }

    #[test]
    fn test_validate_amount() {
        let price = Money::from_cents(10000);
        let ok = validate_amount(
            20808,
            price,
            2,
            PaymentType::Card,
            DeliveryType::StandardDelivery,
        );
        assert_eq!(ok.unwrap().cents(), 20808);

        let err = validate_amount(
            20000,
            price,
            2,
            PaymentType::Card,
            DeliveryType::StandardDelivery,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Bad amount data");
    }

    #[test]
    fn test_validate_amount_rejects_overflowing_total() {
        let err = validate_amount(
            i64::MAX,
            Money::from_cents(i64::MAX / 2 + 1),
            2,
            PaymentType::Card,
            DeliveryType::StandardDelivery,
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::bad("amount"));
    }
}
