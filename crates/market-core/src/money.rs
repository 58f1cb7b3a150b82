//! # Money Module
//!
//! Provides the `Money` type and the order fee schedule.
//!
//! ## Why Integer Money?
//! All prices, fees and payment amounts are integers in the currency's
//! minor unit (cents for SGD). Percent surcharges use integer division and
//! truncate toward zero, so the server and the client can reproduce the
//! exact same amount.
//!
//! ## Fee Schedule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    calculate_payment_amount                             │
//! │                                                                         │
//! │  price × quantity                                                      │
//! │       │                                                                 │
//! │       ├── < 2500?            → + 100  (small-order surcharge)          │
//! │       │                                                                 │
//! │       ├── standard_delivery? → + 400  (flat delivery fee)              │
//! │       │                                                                 │
//! │       └── card?              → + 2% of everything above (truncated)    │
//! │                                                                         │
//! │  Order matters: the card surcharge sees the delivery fee.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{DeliveryType, PaymentType};
use crate::{
    CARD_SURCHARGE_PERCENT, SMALL_ORDER_FEE_CENTS, SMALL_ORDER_THRESHOLD_CENTS,
    STANDARD_DELIVERY_FEE_CENTS,
};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// Serialized transparently as an integer so that JSON bodies carry plain
/// numbers (`"price": 1099`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use market_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity, or `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use market_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3), Some(Money::from_cents(897)));
    /// assert_eq!(Money::from_cents(i64::MAX).multiply_quantity(2), None);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds two amounts, or `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Returns `percent`% of this amount, truncated toward zero, or `None`
    /// on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use market_core::money::Money;
    ///
    /// // 2% of 20400 = 408
    /// assert_eq!(Money::from_cents(20400).percent(2), Some(Money::from_cents(408)));
    /// // 2% of 2499 = 49.98 → 49
    /// assert_eq!(Money::from_cents(2499).percent(2), Some(Money::from_cents(49)));
    /// ```
    #[inline]
    pub const fn percent(&self, percent: i64) -> Option<Self> {
        match self.0.checked_mul(percent) {
            Some(scaled) => Some(Money(scaled / 100)),
            None => None,
        }
    }
}

// =============================================================================
// Fee Calculation
// =============================================================================

/// Computes the amount a buyer must pay for an order.
///
/// Pure and deterministic. The order handler compares the client-supplied
/// amount against this value and rejects any mismatch. Returns `None` when
/// any step overflows `i64` cents.
///
/// ## Example
/// ```rust
/// use market_core::money::{calculate_payment_amount, Money};
/// use market_core::types::{DeliveryType, PaymentType};
///
/// let amount = calculate_payment_amount(
///     Money::from_cents(1000),
///     2,
///     PaymentType::PaynowOnline,
///     DeliveryType::SelfCollection,
/// );
/// assert_eq!(amount, Some(Money::from_cents(2100))); // 2000 + small-order surcharge
/// ```
pub fn calculate_payment_amount(
    price: Money,
    quantity: i64,
    payment_type: PaymentType,
    delivery_type: DeliveryType,
) -> Option<Money> {
    let mut amount = price.multiply_quantity(quantity)?;

    if amount.cents() < SMALL_ORDER_THRESHOLD_CENTS {
        amount = amount.checked_add(Money::from_cents(SMALL_ORDER_FEE_CENTS))?;
    }

    if delivery_type == DeliveryType::StandardDelivery {
        amount = amount.checked_add(Money::from_cents(STANDARD_DELIVERY_FEE_CENTS))?;
    }

    if payment_type == PaymentType::Card {
        amount = amount.checked_add(amount.percent(CARD_SURCHARGE_PERCENT)?)?;
    }

    Some(amount)
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly rendering, e.g. `S$10.99`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}S${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

/// Row decoding reads prices as plain integers.
impl From<i64> for Money {
    fn from(cents: i64) -> Self {
        Money::from_cents(cents)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
