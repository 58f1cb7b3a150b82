//! Service implementations for the marketplace operations.

pub mod account_service;
pub mod order_service;
pub mod product_service;

use std::fmt::Display;
use std::future::Future;

use market_db::DbResult;
use tracing::warn;

pub use account_service::{AccountService, BuyerAccount, SellerAccount};
pub use order_service::{CreatedOrder, OrderRequest, OrderService};
pub use product_service::{ProductDraft, ProductService};

/// Runs an existence lookup, treating a store failure as "does not exist".
///
/// The failure is logged at `warn` and never reaches the caller.
pub(crate) async fn exists_or_false<F>(entity: &str, key: impl Display, lookup: F) -> bool
where
    F: Future<Output = DbResult<bool>>,
{
    match lookup.await {
        Ok(exists) => exists,
        Err(e) => {
            warn!(entity, key = %key, error = %e, "Existence check failed, treating as absent");
            false
        }
    }
}
