//! # Marketplace API
//!
//! REST server for buyers, sellers, products and orders.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Marketplace API                                 │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │ AccountService │  │ ProductService │  │  OrderService              ││
//! │  │                │  │                │  │                            ││
//! │  │ • SignUp       │  │ • Create       │  │ • CreateOrder              ││
//! │  │ • Login        │  │ • Get          │  │ • CreateGuestOrder         ││
//! │  │ (buyer/seller) │  │ • AttachImages │  │ • GetOrder / GetGuestOrder ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Infrastructure (AppState)                    │  │
//! │  │                                                                   │  │
//! │  │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────────────┐│  │
//! │  │  │   SQLite     │  │ ObjectStore  │  │    PaymentBridge         ││  │
//! │  │  │  (market-db) │  │              │  │                          ││  │
//! │  │  │ Primary data │  │ Image bytes  │  │ Hosted checkout requests ││  │
//! │  │  └──────────────┘  └──────────────┘  └──────────────────────────┘│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (see [`config::ApiConfig`]):
//! - `DATABASE_PATH` - SQLite file (default: ./data/marketplace.db)
//! - `HTTP_PORT` - listening port (default: 8080)
//! - `IMAGE_STORAGE_DIR` - product image directory (default: ./data/images)
//! - `PUBLIC_BASE_URL` - base for redirect and webhook URLs
//! - `PAYMENT_ENABLED`, `PAYMENT_API_BASE_URL`, `PAYMENT_API_KEY`

pub mod config;
pub mod credentials;
pub mod error;
pub mod handlers;
pub mod payments;
pub mod routes;
pub mod services;
pub mod storage;

use std::sync::Arc;

// Re-exports
pub use config::ApiConfig;
pub use error::ApiError;
pub use routes::create_router;

use market_db::Database;
use payments::PaymentBridge;
use storage::ObjectStore;

/// Shared application state.
///
/// Built once at startup and handed to every handler.
pub struct AppState {
    pub db: Database,
    pub storage: Arc<dyn ObjectStore>,
    pub payments: PaymentBridge,
    pub config: ApiConfig,
}

impl AppState {
    /// Wires the payment bridge from `config`.
    pub fn new(db: Database, storage: Arc<dyn ObjectStore>, config: ApiConfig) -> Self {
        AppState {
            db,
            storage,
            payments: PaymentBridge::new(&config),
            config,
        }
    }
}
