//! # API Error Type
//!
//! The single error value returned by every handler.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Marketplace API                    │
//! │                                                                         │
//! │  Handler → Service                                                     │
//! │       │                                                                 │
//! │       ├── ValidationError ("Bad price data")      ──┐                  │
//! │       ├── CoreError ("Too many images ...")       ──┤                  │
//! │       ├── JsonRejection / PathRejection           ──┼──► 400           │
//! │       ├── MultipartRejection                      ──┼──► 415           │
//! │       ├── DbError (store failure)  ── error! log ──┼──► 500           │
//! │       │                                            │   "Internal      │
//! │       │                                            │    server error" │
//! │       ▼                                            ▼                   │
//! │  ApiError { status, message } ── IntoResponse ──► {"message": "..."}   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Store and network root causes are logged server-side and never reach the
//! client.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use market_core::{CoreError, ValidationError};
use market_db::DbError;

/// Message for any login failure.
pub const LOGIN_FAILED: &str = "Incorrect user email or password!";

/// Message for sanitised store failures.
pub const INTERNAL_ERROR: &str = "Internal server error";

/// API error returned from handlers.
///
/// ## Serialization
/// What the client receives:
/// ```json
/// { "message": "Bad order_quantity data" }
/// ```
/// with the HTTP status set to `status`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{status}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            message: message.into(),
        }
    }

    /// 400 Bad Request.
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, message)
    }

    /// 401 with the fixed login failure message.
    pub fn login_failed() -> Self {
        ApiError::new(StatusCode::UNAUTHORIZED, LOGIN_FAILED)
    }

    /// 404 Not Found.
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::NOT_FOUND, message)
    }

    /// 500 with a message safe to show the client.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                message: self.message,
            }),
        )
            .into_response()
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

/// Converts database errors to API errors.
///
/// Only outcomes a client can cause become 400s; everything else is logged
/// and sanitised.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err.unique_field() {
            Some(field) if field.ends_with("seller_name") => {
                return ApiError::bad_request("Seller name already exists!");
            }
            Some(field) if field.ends_with("email") => {
                return ApiError::bad_request("Email already exists!");
            }
            _ => {}
        }

        match err {
            DbError::StockExhausted { .. } => ValidationError::bad("order_quantity").into(),
            DbError::ImagesAlreadyAttached { product_id } => {
                CoreError::ImagesAlreadyAttached(product_id).into()
            }
            DbError::NotFound { entity, id } => {
                ApiError::not_found(format!("{} {} does not exist", entity, id))
            }
            other => {
                tracing::error!(error = %other, "Database operation failed");
                ApiError::internal(INTERNAL_ERROR)
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::bad_request(err.body_text())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
