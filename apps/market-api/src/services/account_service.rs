//! Buyer and seller account operations.
//!
//! Sign-up and login are structurally identical for both account kinds;
//! sellers additionally carry a unique display name.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use market_core::validation::{validate_email, validate_password, validate_seller_name};
use market_core::{Buyer, Seller};

use crate::credentials::{hash_password, verify_password};
use crate::error::ApiError;
use crate::services::exists_or_false;
use crate::AppState;

/// Public view of a buyer account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerAccount {
    pub email: String,
    pub buyer_id: i64,
}

impl From<Buyer> for BuyerAccount {
    fn from(buyer: Buyer) -> Self {
        BuyerAccount {
            email: buyer.email,
            buyer_id: buyer.buyer_id,
        }
    }
}

/// Public view of a seller account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerAccount {
    pub email: String,
    pub seller_id: i64,
    pub seller_name: String,
}

impl From<Seller> for SellerAccount {
    fn from(seller: Seller) -> Self {
        SellerAccount {
            email: seller.email,
            seller_id: seller.seller_id,
            seller_name: seller.seller_name,
        }
    }
}

/// Account service implementation.
pub struct AccountService {
    state: Arc<AppState>,
}

impl AccountService {
    /// Create a new account service.
    pub fn new(state: Arc<AppState>) -> Self {
        AccountService { state }
    }

    /// Registers a buyer.
    ///
    /// ## Errors
    /// - 400 "Bad email data" / "Bad password data" for empty fields
    /// - 400 "Email already exists!" when the email is taken
    pub async fn buyer_sign_up(&self, email: &str, password: &str) -> Result<BuyerAccount, ApiError> {
        validate_email(email)?;
        validate_password(password)?;

        let buyers = self.state.db.buyers();
        if exists_or_false("buyer", email, buyers.exists_by_email(email)).await {
            return Err(ApiError::bad_request("Email already exists!"));
        }

        let hash = hash_password(password)?;
        let buyer = buyers.insert(email, &hash).await?;

        info!(buyer_id = buyer.buyer_id, "Buyer signed up");
        Ok(buyer.into())
    }

    /// Authenticates a buyer. Every failure is the same 401.
    pub async fn buyer_login(&self, email: &str, password: &str) -> Result<BuyerAccount, ApiError> {
        if email.is_empty() || password.is_empty() {
            return Err(ApiError::login_failed());
        }

        let buyer = match self.state.db.buyers().get_by_email(email).await {
            Ok(Some(buyer)) => buyer,
            Ok(None) => return Err(ApiError::login_failed()),
            Err(e) => {
                warn!(error = %e, "Buyer lookup failed during login");
                return Err(ApiError::login_failed());
            }
        };

        if !verify_password(password, &buyer.password_hash) {
            return Err(ApiError::login_failed());
        }

        info!(buyer_id = buyer.buyer_id, "Buyer logged in");
        Ok(buyer.into())
    }

    /// Registers a seller.
    ///
    /// Email uniqueness is checked before name uniqueness.
    pub async fn seller_sign_up(
        &self,
        email: &str,
        password: &str,
        seller_name: &str,
    ) -> Result<SellerAccount, ApiError> {
        validate_email(email)?;
        validate_password(password)?;
        validate_seller_name(seller_name)?;

        let sellers = self.state.db.sellers();
        if exists_or_false("seller", email, sellers.exists_by_email(email)).await {
            return Err(ApiError::bad_request("Email already exists!"));
        }
        if exists_or_false("seller", seller_name, sellers.exists_by_name(seller_name)).await {
            return Err(ApiError::bad_request("Seller name already exists!"));
        }

        let hash = hash_password(password)?;
        let seller = sellers.insert(email, seller_name, &hash).await?;

        info!(seller_id = seller.seller_id, "Seller signed up");
        Ok(seller.into())
    }

    /// Authenticates a seller. Every failure is the same 401.
    pub async fn seller_login(&self, email: &str, password: &str) -> Result<SellerAccount, ApiError> {
        if email.is_empty() || password.is_empty() {
            return Err(ApiError::login_failed());
        }

        let seller = match self.state.db.sellers().get_by_email(email).await {
            Ok(Some(seller)) => seller,
            Ok(None) => return Err(ApiError::login_failed()),
            Err(e) => {
                warn!(error = %e, "Seller lookup failed during login");
                return Err(ApiError::login_failed());
            }
        };

        if !verify_password(password, &seller.password_hash) {
            return Err(ApiError::login_failed());
        }

        info!(seller_id = seller.seller_id, "Seller logged in");
        Ok(seller.into())
    }
}
