//! Seller account endpoints.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::ApiError;
use crate::services::{AccountService, SellerAccount};
use crate::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct SellerSignUpRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub seller_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SellerLoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// POST /sellers/signup - 201 with `{email, seller_id, seller_name}`.
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SellerSignUpRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SellerAccount>), ApiError> {
    let Json(request) = payload?;

    let account = AccountService::new(state)
        .seller_sign_up(&request.email, &request.password, &request.seller_name)
        .await?;

    Ok((StatusCode::CREATED, Json(account)))
}

/// POST /sellers/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SellerLoginRequest>, JsonRejection>,
) -> Result<Json<SellerAccount>, ApiError> {
    let Json(request) = payload?;

    let account = AccountService::new(state)
        .seller_login(&request.email, &request.password)
        .await?;

    Ok(Json(account))
}
