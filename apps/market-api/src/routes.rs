//! Route configuration for the marketplace API.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | POST | /buyers/signup | `buyers::sign_up` |
//! | POST | /buyers/login | `buyers::login` |
//! | POST | /sellers/signup | `sellers::sign_up` |
//! | POST | /sellers/login | `sellers::login` |
//! | POST | /products | `products::create_product` |
//! | GET | /products/{id} | `products::get_product` |
//! | POST | /products/{id} | `products::attach_images` |
//! | POST | /orders | `orders::create_order` |
//! | POST | /orders/guest | `orders::create_guest_order` |
//! | GET | /orders/{id} | `orders::get_order` |
//! | GET | /orders/guest/{id} | `orders::get_guest_order` |
//! | GET | /health | `health::health_check` |

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{buyers, health, orders, products, sellers};
use crate::AppState;

/// Builds the application router.
///
/// Image uploads replace axum's default 2MB body cap with
/// `max_upload_bytes`; every other route keeps the default.
pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    let product_by_id = get(products::get_product).merge(
        post(products::attach_images)
            .layer::<_, std::convert::Infallible>(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(upload_limit)),
    );

    Router::new()
        // Accounts
        .route("/buyers/signup", post(buyers::sign_up))
        .route("/buyers/login", post(buyers::login))
        .route("/sellers/signup", post(sellers::sign_up))
        .route("/sellers/login", post(sellers::login))
        // Products
        .route("/products", post(products::create_product))
        .route("/products/{id}", product_by_id)
        // Orders
        .route("/orders", post(orders::create_order))
        .route("/orders/guest", post(orders::create_guest_order))
        .route("/orders/{id}", get(orders::get_order))
        .route("/orders/guest/{id}", get(orders::get_guest_order))
        // Health
        .route("/health", get(health::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
