//! Product listing and image operations.
//!
//! ## Image attach
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  attach_images(product_id, images)                                      │
//! │                                                                         │
//! │  1. product exists?            no ──► 400 "Product N does not exist"   │
//! │  2. 1 <= images <= 5?          no ──► 400 "No images ..." / "Too many" │
//! │  3. reserve rows (tx open)     has images ──► 400 "... already has"    │
//! │  4. upload each object         fail ──► rollback, delete uploaded, 500 │
//! │  5. commit                     ──► image ids                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use market_core::validation::{
    validate_condition, validate_image_count, validate_price, validate_product_quantity,
    validate_product_type,
};
use market_core::{NewProduct, Product, ValidationError};

use crate::error::ApiError;
use crate::services::exists_or_false;
use crate::storage::image_key;
use crate::AppState;

/// Message for a failed image upload.
pub const UPLOAD_FAILED: &str = "Failed to upload product images";

/// Unvalidated product listing as received from a seller.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub seller_id: i64,
    pub title: String,
    pub description: String,
    pub product_type: String,
    pub price: i64,
    pub condition: i64,
    pub product_quantity: i64,
}

/// Result of a successful image attach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachedImages {
    pub product_id: i64,
    pub image_ids: Vec<i64>,
}

/// Product service implementation.
pub struct ProductService {
    state: Arc<AppState>,
}

impl ProductService {
    /// Create a new product service.
    pub fn new(state: Arc<AppState>) -> Self {
        ProductService { state }
    }

    /// Validates and lists a product.
    ///
    /// Checks run in a fixed order: price, condition, product type,
    /// quantity, then seller existence.
    pub async fn create_product(&self, draft: ProductDraft) -> Result<Product, ApiError> {
        let price = validate_price(draft.price)?;
        validate_condition(draft.condition)?;
        let product_type = validate_product_type(&draft.product_type)?;
        validate_product_quantity(draft.product_quantity)?;

        let seller_exists = exists_or_false(
            "seller",
            draft.seller_id,
            self.state.db.sellers().exists_by_id(draft.seller_id),
        )
        .await;
        if !seller_exists {
            return Err(ValidationError::bad("seller_id").into());
        }

        let product = self
            .state
            .db
            .products()
            .insert(&NewProduct {
                seller_id: draft.seller_id,
                title: draft.title,
                description: draft.description,
                product_type,
                price,
                condition: draft.condition,
                product_quantity: draft.product_quantity,
            })
            .await?;

        info!(
            product_id = product.product_id,
            seller_id = product.seller_id,
            "Product created"
        );
        Ok(product)
    }

    /// Fetches a product by id.
    pub async fn get_product(&self, product_id: i64) -> Result<Product, ApiError> {
        self.state
            .db
            .products()
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Product {} does not exist", product_id)))
    }

    /// Attaches images to a product that has none yet.
    ///
    /// Objects are uploaded one at a time under [`image_key`]. The image rows
    /// become visible only once every upload has succeeded.
    pub async fn attach_images(
        &self,
        product_id: i64,
        images: Vec<Bytes>,
    ) -> Result<AttachedImages, ApiError> {
        let products = self.state.db.products();

        if !exists_or_false("product", product_id, products.exists_by_id(product_id)).await {
            return Err(ApiError::bad_request(format!(
                "Product {} does not exist",
                product_id
            )));
        }

        validate_image_count(images.len())?;

        let batch = products.reserve_images(product_id, images.len()).await?;
        let keys: Vec<String> = batch.image_ids().iter().map(|id| image_key(*id)).collect();

        let mut uploaded: Vec<&str> = Vec::with_capacity(keys.len());
        for (key, data) in keys.iter().zip(images) {
            if let Err(e) = self.state.storage.put(key, data).await {
                error!(product_id, key = %key, error = %e, "Image upload failed");

                if let Err(e) = batch.rollback().await {
                    error!(product_id, error = %e, "Failed to roll back image rows");
                }
                self.remove_objects(&uploaded).await;
                return Err(ApiError::internal(UPLOAD_FAILED));
            }
            uploaded.push(key);
        }

        let image_ids = match batch.commit().await {
            Ok(ids) => ids,
            Err(e) => {
                error!(product_id, error = %e, "Failed to commit image rows");
                self.remove_objects(&uploaded).await;
                return Err(ApiError::internal(UPLOAD_FAILED));
            }
        };

        info!(product_id, count = image_ids.len(), "Product images attached");
        Ok(AttachedImages {
            product_id,
            image_ids,
        })
    }

    /// Best-effort delete of objects whose rows never became visible.
    async fn remove_objects(&self, keys: &[&str]) {
        for key in keys {
            if let Err(e) = self.state.storage.delete(key).await {
                warn!(key = %key, error = %e, "Failed to remove uploaded image");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryObjectStore, ObjectStore};
    use crate::ApiConfig;
    use axum::http::StatusCode;
    use market_core::ProductType;
    use market_db::{Database, DbConfig};
    use rstest::rstest;

    struct Fixture {
        svc: ProductService,
        store: Arc<MemoryObjectStore>,
        seller_id: i64,
    }

    async fn setup() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let seller = db.sellers().insert("s@shop.sg", "Shop", "h").await.unwrap();
        let store = Arc::new(MemoryObjectStore::new());
        let state = AppState::new(db, store.clone(), ApiConfig::default());

        Fixture {
            svc: ProductService::new(Arc::new(state)),
            store,
            seller_id: seller.seller_id,
        }
    }

    fn draft(seller_id: i64) -> ProductDraft {
        ProductDraft {
            seller_id,
            title: "Film Camera".to_string(),
            description: "35mm".to_string(),
            product_type: "Buy-Now".to_string(),
            price: 12000,
            condition: 4,
            product_quantity: 1,
        }
    }

    fn images(n: usize) -> Vec<Bytes> {
        (0..n).map(|i| Bytes::from(vec![i as u8; 4])).collect()
    }

    #[tokio::test]
    async fn test_create_and_get_product() {
        let f = setup().await;

        let product = f.svc.create_product(draft(f.seller_id)).await.unwrap();
        assert_eq!(product.product_type, ProductType::BuyNow);
        assert_eq!(product.sold_quantity, 0);
        assert_eq!(product.image_count, 0);

        let fetched = f.svc.get_product(product.product_id).await.unwrap();
        assert_eq!(fetched.title, "Film Camera");

        let err = f.svc.get_product(product.product_id + 1).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[case(-1, 9, "Nope", 0, "Bad price data")]
    #[case(100, 9, "Nope", 0, "Bad condition data")]
    #[case(100, 3, "Nope", 0, "Bad product_type data")]
    #[case(100, 3, "Pre-Order", 0, "Bad product_quantity data")]
    #[tokio::test]
    async fn test_create_product_validation_order(
        #[case] price: i64,
        #[case] condition: i64,
        #[case] product_type: &str,
        #[case] quantity: i64,
        #[case] expected: &str,
    ) {
        let f = setup().await;
        let mut bad = draft(f.seller_id + 100);
        bad.price = price;
        bad.condition = condition;
        bad.product_type = product_type.to_string();
        bad.product_quantity = quantity;

        let err = f.svc.create_product(bad).await.unwrap_err();
        assert_eq!(err.message, expected);
    }

    #[tokio::test]
    async fn test_create_product_unknown_seller() {
        let f = setup().await;

        let err = f.svc.create_product(draft(f.seller_id + 1)).await.unwrap_err();
        assert_eq!(err.message, "Bad seller_id data");
    }

    #[tokio::test]
    async fn test_attach_images() {
        let f = setup().await;
        let product = f.svc.create_product(draft(f.seller_id)).await.unwrap();

        let attached = f.svc.attach_images(product.product_id, images(3)).await.unwrap();
        assert_eq!(attached.image_ids.len(), 3);
        assert_eq!(f.store.len().await, 3);
        assert!(f.store.get(&image_key(attached.image_ids[0])).await.is_some());

        let product = f.svc.get_product(product.product_id).await.unwrap();
        assert_eq!(product.image_count, 3);

        let err = f.svc.attach_images(product.product_id, images(1)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            err.message,
            format!("Product {} already has images", product.product_id)
        );
    }

    #[tokio::test]
    async fn test_attach_images_count_checks() {
        let f = setup().await;
        let product = f.svc.create_product(draft(f.seller_id)).await.unwrap();

        let err = f.svc.attach_images(product.product_id, images(0)).await.unwrap_err();
        assert_eq!(err.message, "No images attached to the request");

        let err = f.svc.attach_images(product.product_id, images(6)).await.unwrap_err();
        assert_eq!(err.message, "Too many images attached, maximum is 5");

        let err = f.svc.attach_images(999, images(6)).await.unwrap_err();
        assert_eq!(err.message, "Product 999 does not exist");
    }

    #[tokio::test]
    async fn test_remove_objects_clears_every_uploaded_key() {
        let f = setup().await;
        for id in [1, 2] {
            f.store.put(&image_key(id), Bytes::from_static(b"img")).await.unwrap();
        }

        // Keys that were never stored are skipped
        f.svc
            .remove_objects(&["product-images/1", "product-images/2", "product-images/9"])
            .await;

        assert!(f.store.is_empty().await);
    }
}
