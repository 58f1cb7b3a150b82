//! Buyer account endpoints.
//!
//! - `POST /buyers/signup` - Create a buyer account
//! - `POST /buyers/login` - Check buyer credentials

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::ApiError;
use crate::services::{AccountService, BuyerAccount};
use crate::AppState;

/// Body of both buyer endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct BuyerCredentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// POST /buyers/signup
///
/// # Response
///
/// - `201 Created` - `{"email": "...", "buyer_id": 1}`
/// - `400 Bad Request` - empty field or email already registered
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BuyerCredentials>, JsonRejection>,
) -> Result<(StatusCode, Json<BuyerAccount>), ApiError> {
    let Json(request) = payload?;

    let account = AccountService::new(state)
        .buyer_sign_up(&request.email, &request.password)
        .await?;

    Ok((StatusCode::CREATED, Json(account)))
}

/// POST /buyers/login
///
/// # Response
///
/// - `200 OK` - `{"email": "...", "buyer_id": 1}`
/// - `401 Unauthorized` - "Incorrect user email or password!"
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BuyerCredentials>, JsonRejection>,
) -> Result<Json<BuyerAccount>, ApiError> {
    let Json(request) = payload?;

    let account = AccountService::new(state)
        .buyer_login(&request.email, &request.password)
        .await?;

    Ok(Json(account))
}
