//! Order endpoints.
//!
//! - `POST /orders` - Member checkout
//! - `POST /orders/guest` - Guest checkout
//! - `GET /orders/{id}` - Member order
//! - `GET /orders/guest/{id}` - Guest order

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use market_core::{GuestOrder, Order, ShippingDetails};

use crate::error::ApiError;
use crate::services::{OrderRequest, OrderService};
use crate::AppState;

/// Fields common to both checkout bodies.
///
/// `payment_type` and `delivery_type` are plain strings so that bad values
/// are reported by the pipeline in order.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderFields {
    pub product_id: i64,
    pub order_quantity: i64,
    #[serde(default)]
    pub payment_type: String,
    #[serde(default)]
    pub delivery_type: String,
    pub amount: i64,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address_line_1: String,
    #[serde(default)]
    pub address_line_2: Option<String>,
    #[serde(default)]
    pub postal_code: String,
}

impl From<OrderFields> for OrderRequest {
    fn from(f: OrderFields) -> Self {
        OrderRequest {
            product_id: f.product_id,
            order_quantity: f.order_quantity,
            payment_type: f.payment_type,
            delivery_type: f.delivery_type,
            amount: f.amount,
            shipping: ShippingDetails {
                phone: f.phone,
                address_line_1: f.address_line_1,
                address_line_2: f.address_line_2.filter(|line| !line.is_empty()),
                postal_code: f.postal_code,
            },
        }
    }
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    pub buyer_id: i64,
    #[serde(flatten)]
    pub order: OrderFields,
}

/// Body of `POST /orders/guest`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGuestOrderRequest {
    #[serde(default)]
    pub email: String,
    #[serde(flatten)]
    pub order: OrderFields,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub order_id: i64,
    pub redirect_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGuestOrderResponse {
    pub guest_order_id: i64,
    pub redirect_url: String,
}

/// POST /orders
///
/// # Response
///
/// - `201 Created` - `{"order_id": 1, "redirect_url": "..."}`
/// - `400 Bad Request` - first failing validation step
/// - `500 Internal Server Error` - insert or payment provider failure
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateOrderResponse>), ApiError> {
    let Json(request) = payload?;

    let created = OrderService::new(state)
        .create_order(request.buyer_id, request.order.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            order_id: created.order_id,
            redirect_url: created.redirect_url,
        }),
    ))
}

/// POST /orders/guest
pub async fn create_guest_order(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateGuestOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateGuestOrderResponse>), ApiError> {
    let Json(request) = payload?;

    let created = OrderService::new(state)
        .create_guest_order(&request.email, request.order.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateGuestOrderResponse {
            guest_order_id: created.order_id,
            redirect_url: created.redirect_url,
        }),
    ))
}

/// GET /orders/{id}
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Order>, ApiError> {
    let Path(order_id) = path?;
    Ok(Json(OrderService::new(state).get_order(order_id).await?))
}

/// GET /orders/guest/{id}
pub async fn get_guest_order(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<GuestOrder>, ApiError> {
    let Path(guest_order_id) = path?;
    Ok(Json(
        OrderService::new(state)
            .get_guest_order(guest_order_id)
            .await?,
    ))
}
