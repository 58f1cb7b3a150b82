//! # Repository Module
//!
//! Database repository implementations for the marketplace.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Service (market-api)                                                  │
//! │       │                                                                 │
//! │       │  db.orders().insert(&new_order)                                │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── insert(&self, order)        ← stock reserve + insert, one tx      │
//! │  ├── get_by_id(&self, id)                                              │
//! │  └── get_guest_by_id(&self, id)                                        │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`BuyerRepository`](buyer::BuyerRepository) - Buyer accounts
//! - [`SellerRepository`](seller::SellerRepository) - Seller accounts
//! - [`ProductRepository`](product::ProductRepository) - Products and images
//! - [`OrderRepository`](order::OrderRepository) - Member and guest orders
//!
//! ## Existence Checks
//! Every `exists_*` method returns `DbResult<bool>`. Callers in the HTTP
//! layer decide how to treat a store error.

pub mod buyer;
pub mod order;
pub mod product;
pub mod seller;
