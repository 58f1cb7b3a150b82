//! # Domain Types
//!
//! Core domain types used throughout the marketplace.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐   ┌─────────────┐ │
//! │  │   Buyer     │   │   Seller    │   │  Product    │   │ProductImage │ │
//! │  │  buyer_id   │   │  seller_id  │   │  product_id │   │  image_id   │ │
//! │  │  email      │   │  email      │   │  seller_id ─┼──►│  product_id │ │
//! │  │  (hash)     │   │  seller_name│   │  price      │   │  image_no   │ │
//! │  └──────┬──────┘   └─────────────┘   └──────┬──────┘   └─────────────┘ │
//! │         │                                   │                           │
//! │         ▼                                   ▼                           │
//! │  ┌─────────────────────────┐   ┌─────────────────────────┐             │
//! │  │  Order (buyer_id)       │   │  GuestOrder (email)     │             │
//! │  │  payment_status=pending │   │  payment_status=pending │             │
//! │  └─────────────────────────┘   └─────────────────────────┘             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ids are assigned by the store at insert time. Entities are never updated
//! or deleted by this codebase, except `sold_quantity` / `image_count` on
//! products.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Accounts
// =============================================================================

/// A buyer account row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Buyer {
    pub buyer_id: i64,
    pub email: String,
    /// PHC-format password hash. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

/// A seller account row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Seller {
    pub seller_id: i64,
    pub email: String,
    pub seller_name: String,
    /// PHC-format password hash. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

// =============================================================================
// Product Type
// =============================================================================

/// How a product is sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
pub enum ProductType {
    /// In stock, ships now.
    #[serde(rename = "Buy-Now")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Buy-Now"))]
    BuyNow,
    /// Ships once the seller receives stock.
    #[serde(rename = "Pre-Order")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Pre-Order"))]
    PreOrder,
}

impl ProductType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProductType::BuyNow => "Buy-Now",
            ProductType::PreOrder => "Pre-Order",
        }
    }
}

impl FromStr for ProductType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Buy-Now" => Ok(ProductType::BuyNow),
            "Pre-Order" => Ok(ProductType::PreOrder),
            other => Err(ValidationError::NotAllowed {
                field: "product_type".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Type
// =============================================================================

/// How the buyer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    /// Card payment, carries a 2% surcharge.
    Card,
    /// PayNow QR / online transfer.
    PaynowOnline,
}

impl PaymentType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Card => "card",
            PaymentType::PaynowOnline => "paynow_online",
        }
    }
}

impl FromStr for PaymentType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(PaymentType::Card),
            "paynow_online" => Ok(PaymentType::PaynowOnline),
            other => Err(ValidationError::NotAllowed {
                field: "payment_type".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Delivery Type
// =============================================================================

/// How the order reaches the buyer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum DeliveryType {
    /// Courier delivery, flat fee.
    StandardDelivery,
    /// Buyer collects from the seller.
    SelfCollection,
}

impl DeliveryType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DeliveryType::StandardDelivery => "standard_delivery",
            DeliveryType::SelfCollection => "self_collection",
        }
    }
}

impl FromStr for DeliveryType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard_delivery" => Ok(DeliveryType::StandardDelivery),
            "self_collection" => Ok(DeliveryType::SelfCollection),
            other => Err(ValidationError::NotAllowed {
                field: "delivery_type".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for DeliveryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// Payment state of an order.
///
/// ```text
/// pending ──(provider webhook)──► paid
///    │
///    └─────(provider webhook)──► failed
/// ```
///
/// Only `Pending` is ever written by this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

// =============================================================================
// Product
// =============================================================================

/// A product listed by a seller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub product_id: i64,
    pub seller_id: i64,
    pub title: String,
    pub description: String,
    pub product_type: ProductType,
    /// Unit price in minor units.
    #[cfg_attr(feature = "sqlx", sqlx(try_from = "i64"))]
    pub price: Money,
    /// 0 (poor) to 5 (brand new).
    pub condition: i64,
    pub product_quantity: i64,
    pub sold_quantity: i64,
    pub posted_date: DateTime<Utc>,
    pub image_count: i64,
}

impl Product {
    /// Units still available for new orders.
    pub fn available_stock(&self) -> i64 {
        self.product_quantity - self.sold_quantity
    }
}

/// Validated input for a new product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub seller_id: i64,
    pub title: String,
    pub description: String,
    pub product_type: ProductType,
    pub price: Money,
    pub condition: i64,
    pub product_quantity: i64,
}

/// Metadata row for one product image. The bytes live in object storage
/// under the image id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductImage {
    pub image_id: i64,
    pub product_id: i64,
    /// 1-based position within the product's images.
    pub image_no: i64,
}

// =============================================================================
// Orders
// =============================================================================

/// Delivery contact shared by member and guest orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingDetails {
    pub phone: String,
    pub address_line_1: String,
    pub address_line_2: Option<String>,
    pub postal_code: String,
}

/// Who placed the order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Purchaser {
    /// Authenticated buyer account.
    Buyer(i64),
    /// Guest checkout, keyed by email.
    Guest(String),
}

/// A fully validated order ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub product_id: i64,
    pub purchaser: Purchaser,
    pub order_quantity: i64,
    pub payment_type: PaymentType,
    pub delivery_type: DeliveryType,
    pub amount: Money,
    pub shipping: ShippingDetails,
}

/// An order placed by a buyer account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub order_id: i64,
    pub product_id: i64,
    pub buyer_id: i64,
    pub delivery_type: DeliveryType,
    pub order_quantity: i64,
    pub payment_type: PaymentType,
    pub payment_status: PaymentStatus,
    /// Amount charged, as verified at creation.
    #[cfg_attr(feature = "sqlx", sqlx(try_from = "i64"))]
    pub amount: Money,
    pub phone: String,
    pub order_date: DateTime<Utc>,
    pub address_line_1: String,
    /// Empty string when the buyer gave no second line.
    pub address_line_2: String,
    pub postal_code: String,
}

/// An order placed without an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct GuestOrder {
    pub guest_order_id: i64,
    pub product_id: i64,
    pub email: String,
    pub delivery_type: DeliveryType,
    pub order_quantity: i64,
    pub payment_type: PaymentType,
    pub payment_status: PaymentStatus,
    #[cfg_attr(feature = "sqlx", sqlx(try_from = "i64"))]
    pub amount: Money,
    pub phone: String,
    pub order_date: DateTime<Utc>,
    pub address_line_1: String,
    pub address_line_2: String,
    pub postal_code: String,
}

// =============================================================================
// Unit Tests
// =============================================================================
