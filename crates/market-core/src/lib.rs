//! # market-core: Pure Business Logic for the Marketplace
//!
//! This crate contains the domain rules of the marketplace backend as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Marketplace Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    market-api (axum)                            │   │
//! │  │    /buyers  /sellers  /products  /orders                        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ market-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                  │   │
//! │  │   │   types   │  │   money   │  │ validation│                  │   │
//! │  │   │  Product  │  │   Money   │  │   rules   │                  │   │
//! │  │   │   Order   │  │   Fees    │  │  checks   │                  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    market-db (Database Layer)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Buyer, Seller, Product, Order, ...)
//! - [`money`] - Money type and the order fee schedule
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level business rules
//!
//! ## Example Usage
//!
//! ```rust
//! use market_core::money::{calculate_payment_amount, Money};
//! use market_core::types::{DeliveryType, PaymentType};
//!
//! let amount = calculate_payment_amount(
//!     Money::from_cents(10000),
//!     2,
//!     PaymentType::Card,
//!     DeliveryType::StandardDelivery,
//! );
//! assert_eq!(amount, Some(Money::from_cents(20808)));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use money::{calculate_payment_amount, Money};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of images attached to a single product.
pub const MAX_PRODUCT_IMAGES: usize = 5;

/// Highest allowed product condition grade (0 = poor, 5 = brand new).
pub const MAX_PRODUCT_CONDITION: i64 = 5;

/// Orders whose product cost is below this (minor units) pay a surcharge.
pub const SMALL_ORDER_THRESHOLD_CENTS: i64 = 2500;

/// Flat surcharge for orders below [`SMALL_ORDER_THRESHOLD_CENTS`].
pub const SMALL_ORDER_FEE_CENTS: i64 = 100;

/// Flat fee for `standard_delivery`.
pub const STANDARD_DELIVERY_FEE_CENTS: i64 = 400;

/// Card surcharge in percent, applied after all other fees.
pub const CARD_SURCHARGE_PERCENT: i64 = 2;

/// Currency all amounts are denominated in.
pub const DEFAULT_CURRENCY: &str = "SGD";
