//! Order pipeline for member and guest checkouts.
//!
//! ## Validation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  First failing check wins; later checks never run.                     │
//! │                                                                         │
//! │  1. product exists            "Bad product_id data"                    │
//! │  2. buyer exists | email set  "Bad buyer_id data" | "Bad email data"   │
//! │  3. load price and stock                                               │
//! │  4. 0 < quantity <= stock     "Bad order_quantity data"                │
//! │  5. payment_type              "Bad payment_type data"                  │
//! │  6. delivery_type             "Bad delivery_type data"                 │
//! │  7. amount == server total    "Bad amount data"                        │
//! │                                                                         │
//! │  insert (reserves stock atomically) ──► redirect URL                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::{error, info};

use market_core::validation::{
    validate_amount, validate_delivery_type, validate_email, validate_order_quantity,
    validate_payment_type,
};
use market_core::{
    DeliveryType, GuestOrder, Money, NewOrder, Order, PaymentType, Purchaser, ShippingDetails,
    ValidationError,
};
use market_db::DbError;

use crate::error::{ApiError, INTERNAL_ERROR};
use crate::payments::placeholder_redirect_url;
use crate::services::exists_or_false;
use crate::AppState;

/// Order fields shared by member and guest checkouts, before validation.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub product_id: i64,
    pub order_quantity: i64,
    pub payment_type: String,
    pub delivery_type: String,
    /// Client-computed total in minor units.
    pub amount: i64,
    pub shipping: ShippingDetails,
}

/// A persisted order and where to send the payer next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedOrder {
    pub order_id: i64,
    pub redirect_url: String,
}

/// Fields that passed validation.
struct ValidatedOrder {
    payment_type: PaymentType,
    delivery_type: DeliveryType,
    amount: Money,
}

/// Order service implementation.
pub struct OrderService {
    state: Arc<AppState>,
}

impl OrderService {
    /// Create a new order service.
    pub fn new(state: Arc<AppState>) -> Self {
        OrderService { state }
    }

    /// Places an order for a buyer account.
    pub async fn create_order(
        &self,
        buyer_id: i64,
        request: OrderRequest,
    ) -> Result<CreatedOrder, ApiError> {
        self.check_product(request.product_id).await?;

        let buyer_exists =
            exists_or_false("buyer", buyer_id, self.state.db.buyers().exists_by_id(buyer_id))
                .await;
        if !buyer_exists {
            return Err(ValidationError::bad("buyer_id").into());
        }

        let valid = self.validate(&request).await?;
        self.place(Purchaser::Buyer(buyer_id), request, valid).await
    }

    /// Places an order without an account, keyed by email.
    pub async fn create_guest_order(
        &self,
        email: &str,
        request: OrderRequest,
    ) -> Result<CreatedOrder, ApiError> {
        self.check_product(request.product_id).await?;
        validate_email(email)?;

        let valid = self.validate(&request).await?;
        self.place(Purchaser::Guest(email.to_string()), request, valid)
            .await
    }

    /// Fetches a member order.
    pub async fn get_order(&self, order_id: i64) -> Result<Order, ApiError> {
        self.state
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Order {} does not exist", order_id)))
    }

    /// Fetches a guest order.
    pub async fn get_guest_order(&self, guest_order_id: i64) -> Result<GuestOrder, ApiError> {
        self.state
            .db
            .orders()
            .get_guest_by_id(guest_order_id)
            .await?
            .ok_or_else(|| {
                ApiError::not_found(format!("Guest order {} does not exist", guest_order_id))
            })
    }

    async fn check_product(&self, product_id: i64) -> Result<(), ApiError> {
        let products = self.state.db.products();
        if !exists_or_false("product", product_id, products.exists_by_id(product_id)).await {
            return Err(ValidationError::bad("product_id").into());
        }
        Ok(())
    }

    /// Steps 3 to 7 of the pipeline.
    async fn validate(&self, request: &OrderRequest) -> Result<ValidatedOrder, ApiError> {
        let (price, available) = self
            .state
            .db
            .products()
            .price_and_stock(request.product_id)
            .await?
            .ok_or_else(|| ValidationError::bad("product_id"))?;

        validate_order_quantity(request.order_quantity, available)?;
        let payment_type = validate_payment_type(&request.payment_type)?;
        let delivery_type = validate_delivery_type(&request.delivery_type)?;
        let amount = validate_amount(
            request.amount,
            price,
            request.order_quantity,
            payment_type,
            delivery_type,
        )?;

        Ok(ValidatedOrder {
            payment_type,
            delivery_type,
            amount,
        })
    }

    async fn place(
        &self,
        purchaser: Purchaser,
        request: OrderRequest,
        valid: ValidatedOrder,
    ) -> Result<CreatedOrder, ApiError> {
        let is_guest = matches!(purchaser, Purchaser::Guest(_));
        let email = match &purchaser {
            Purchaser::Guest(email) => Some(email.clone()),
            Purchaser::Buyer(_) => None,
        };

        let new_order = NewOrder {
            product_id: request.product_id,
            purchaser,
            order_quantity: request.order_quantity,
            payment_type: valid.payment_type,
            delivery_type: valid.delivery_type,
            amount: valid.amount,
            shipping: request.shipping,
        };

        let order_id = match self.state.db.orders().insert(&new_order).await {
            Ok(id) => id,
            Err(DbError::StockExhausted { .. }) => {
                return Err(ValidationError::bad("order_quantity").into());
            }
            Err(e) => {
                error!(product_id = new_order.product_id, error = %e, "Order insert failed");
                return Err(ApiError::internal(INTERNAL_ERROR));
            }
        };

        let placeholder =
            placeholder_redirect_url(&self.state.config.public_base_url, order_id, is_guest);

        let redirect_url = if self.state.config.payment_enabled {
            let reply = self
                .state
                .payments
                .create_payment_request(
                    valid.amount,
                    order_id,
                    valid.payment_type,
                    is_guest,
                    email.as_deref(),
                )
                .await?;
            reply.url.unwrap_or(placeholder)
        } else {
            placeholder
        };

        info!(order_id, guest = is_guest, amount = valid.amount.cents(), "Order placed");
        Ok(CreatedOrder {
            order_id,
            redirect_url,
        })
    }
}
