//! Product endpoints.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | POST | /products | `create_product` |
//! | GET | /products/{id} | `get_product` |
//! | POST | /products/{id} | `attach_images` (multipart) |

use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use market_core::Product;

use crate::error::ApiError;
use crate::services::product_service::AttachedImages;
use crate::services::{ProductDraft, ProductService};
use crate::AppState;

/// Multipart field carrying image files.
pub const IMAGES_FIELD: &str = "images";

fn default_quantity() -> i64 {
    1
}

/// Body of `POST /products`.
///
/// `product_type` stays a string here so an unknown spelling reports
/// "Bad product_type data" in its turn.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductRequest {
    pub title: String,
    pub seller_id: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub product_type: String,
    pub price: i64,
    pub condition: i64,
    #[serde(default = "default_quantity")]
    pub product_quantity: i64,
}

impl From<CreateProductRequest> for ProductDraft {
    fn from(req: CreateProductRequest) -> Self {
        ProductDraft {
            seller_id: req.seller_id,
            title: req.title,
            description: req.description,
            product_type: req.product_type,
            price: req.price,
            condition: req.condition,
            product_quantity: req.product_quantity,
        }
    }
}

/// POST /products
///
/// # Response
///
/// - `201 Created` - the stored product, including `product_id`,
///   `posted_date` and `sold_quantity: 0`
/// - `400 Bad Request` - first invalid field
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let Json(request) = payload?;

    let product = ProductService::new(state)
        .create_product(request.into())
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /products/{id}
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Product>, ApiError> {
    let Path(product_id) = path?;

    let product = ProductService::new(state).get_product(product_id).await?;
    Ok(Json(product))
}

/// POST /products/{id}
///
/// Reads every `images` part of a multipart body; other parts are skipped.
///
/// # Response
///
/// - `201 Created` - `{"product_id": 1, "image_ids": [1, 2]}`
/// - `400 Bad Request` - unknown product, 0 or more than 5 images, or the
///   product already has images
/// - `415 Unsupported Media Type` - body is not multipart
pub async fn attach_images(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<AttachedImages>), ApiError> {
    let Path(product_id) = path?;
    let mut multipart = multipart?;

    let mut images = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGES_FIELD) {
            debug!(field = ?field.name(), "Skipping multipart field");
            continue;
        }
        images.push(field.bytes().await?);
    }

    let attached = ProductService::new(state)
        .attach_images(product_id, images)
        .await?;

    Ok((StatusCode::CREATED, Json(attached)))
}
