//! # Payment Bridge
//!
//! Outbound call to the payment provider that turns a pending order into a
//! hosted checkout page.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     create_payment_request                              │
//! │                                                                         │
//! │  order persisted (pending)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  POST {PAYMENT_API_BASE_URL}/v1/payment-requests                       │
//! │    X-BUSINESS-API-KEY: ...                                              │
//! │    { amount, currency, payment_methods, redirect_url, webhook,         │
//! │      reference_number, email? }                                         │
//! │       │                                                                 │
//! │       ├── transport error / non-2xx ──► 500 "Failed to create ..."     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  { id?, url?, status? }   (undecodable body → all None)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The provider later reports the outcome to the webhook URL; handling that
//! callback is outside this service.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use market_core::{Money, PaymentType};

use crate::config::ApiConfig;
use crate::error::ApiError;

/// Message returned for every bridge failure.
pub const PAYMENT_FAILED: &str = "Failed to create payment request";

/// Header carrying the provider API key.
pub const API_KEY_HEADER: &str = "X-BUSINESS-API-KEY";

/// Body sent to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequestPayload {
    /// Decimal major units, e.g. `"25.50"`.
    pub amount: String,
    pub currency: String,
    pub payment_methods: Vec<String>,
    pub redirect_url: String,
    pub webhook: String,
    pub reference_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Provider reply. Every field is optional; a body that does not decode
/// yields the default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PaymentRequestResponse {
    pub id: Option<String>,
    pub url: Option<String>,
    pub status: Option<String>,
}

/// Formats minor units as a decimal string in major units.
pub fn decimal_amount(amount: Money) -> String {
    let cents = amount.cents();
    let sign = if cents < 0 { "-" } else { "" };
    format!("{}{}.{:02}", sign, (cents / 100).abs(), (cents % 100).abs())
}

/// Confirmation page the payer lands on. Also used as the redirect URL when
/// payments are disabled.
pub fn placeholder_redirect_url(public_base_url: &str, order_id: i64, is_guest: bool) -> String {
    let param = if is_guest { "guest_order_id" } else { "order_id" };
    format!(
        "{}/payment/confirmation?{}={}",
        public_base_url, param, order_id
    )
}

/// Where the provider reports the payment outcome.
pub fn webhook_url(public_base_url: &str, is_guest: bool) -> String {
    if is_guest {
        format!("{}/orders/guest/webhook", public_base_url)
    } else {
        format!("{}/orders/webhook", public_base_url)
    }
}

/// Client for the payment provider.
#[derive(Debug, Clone)]
pub struct PaymentBridge {
    client: Client,
    api_base_url: Option<String>,
    api_key: Option<String>,
    currency: String,
    public_base_url: String,
}

impl PaymentBridge {
    /// Create a bridge from the API configuration.
    ///
    /// Missing provider settings are not an error here; they fail each call.
    pub fn new(config: &ApiConfig) -> Self {
        PaymentBridge {
            client: Client::new(),
            api_base_url: config.payment_api_base_url.clone(),
            api_key: config.payment_api_key.clone(),
            currency: config.payment_currency.clone(),
            public_base_url: config.public_base_url.clone(),
        }
    }

    /// Builds the provider payload for one order.
    pub fn build_payload(
        &self,
        amount: Money,
        order_id: i64,
        payment_type: PaymentType,
        is_guest: bool,
        email: Option<&str>,
    ) -> PaymentRequestPayload {
        PaymentRequestPayload {
            amount: decimal_amount(amount),
            currency: self.currency.clone(),
            payment_methods: vec![payment_type.as_str().to_string()],
            redirect_url: placeholder_redirect_url(&self.public_base_url, order_id, is_guest),
            webhook: webhook_url(&self.public_base_url, is_guest),
            reference_number: order_id.to_string(),
            email: email.map(str::to_string),
        }
    }

    /// Asks the provider to open a payment request for an order.
    ///
    /// ## Errors
    /// 500 [`PAYMENT_FAILED`] when the base URL or API key is unset, the
    /// request cannot be sent, or the provider answers with a non-2xx status.
    pub async fn create_payment_request(
        &self,
        amount: Money,
        order_id: i64,
        payment_type: PaymentType,
        is_guest: bool,
        email: Option<&str>,
    ) -> Result<PaymentRequestResponse, ApiError> {
        let (base_url, api_key) = match (&self.api_base_url, &self.api_key) {
            (Some(base_url), Some(api_key)) => (base_url, api_key),
            _ => {
                error!("Payment provider base URL or API key is not configured");
                return Err(ApiError::internal(PAYMENT_FAILED));
            }
        };

        let payload = self.build_payload(amount, order_id, payment_type, is_guest, email);
        let endpoint = format!("{}/v1/payment-requests", base_url);

        let response = self
            .client
            .post(&endpoint)
            .header(API_KEY_HEADER, api_key)
            .json(&payload)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                error!(order_id, guest = is_guest, error = %e, "Payment request failed");
                ApiError::internal(PAYMENT_FAILED)
            })?;

        let reply = match response.json::<PaymentRequestResponse>().await {
            Ok(reply) => reply,
            Err(e) => {
                debug!(order_id, error = %e, "Ignoring undecodable payment provider body");
                PaymentRequestResponse::default()
            }
        };

        info!(
            order_id,
            guest = is_guest,
            request_id = ?reply.id,
            "Payment request created"
        );
        Ok(reply)
    }
}
