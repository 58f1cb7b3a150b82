//! # Product Repository
//!
//! Database operations for products and their image metadata.
//!
//! ## Key Operations
//! - Insert / fetch products
//! - Price and remaining-stock lookup for order validation
//! - One-shot image attach inside a transaction
//!
//! ## Image Attach
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    reserve_images → upload → commit                     │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    UPDATE products SET image_count = n                                 │
//! │      WHERE product_id = ? AND image_count = 0   ← 0 rows? abort        │
//! │    INSERT product_images (image_no 1..n) RETURNING image_id            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ImageBatch { image_ids }  ── caller uploads bytes per image id ──┐    │
//! │                                                                    │    │
//! │  all uploads ok?  ── yes ──► batch.commit()                        │    │
//! │                   └─ no ───► batch.rollback() + delete objects ◄───┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The batch holds a write transaction while the caller uploads. Uploads are
//! capped at five files, so the lock is short-lived.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use market_core::{Money, NewProduct, Product, ProductImage};

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let product = repo.insert(&new_product).await?;
/// let found = repo.get_by_id(product.product_id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product.
    ///
    /// `posted_date` is set to now; `sold_quantity` and `image_count` start
    /// at zero. Returns the stored record with its generated id.
    pub async fn insert(&self, product: &NewProduct) -> DbResult<Product> {
        debug!(
            seller_id = product.seller_id,
            title = %product.title,
            "Inserting product"
        );

        let created = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                seller_id, title, description, product_type,
                price, condition, product_quantity, sold_quantity,
                posted_date, image_count
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6, ?7, 0,
                ?8, 0
            )
            RETURNING
                product_id, seller_id, title, description, product_type,
                price, condition, product_quantity, sold_quantity,
                posted_date, image_count
            "#,
        )
        .bind(product.seller_id)
        .bind(&product.title)
        .bind(&product.description)
        .bind(product.product_type)
        .bind(product.price.cents())
        .bind(product.condition)
        .bind(product.product_quantity)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, product_id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                product_id, seller_id, title, description, product_type,
                price, condition, product_quantity, sold_quantity,
                posted_date, image_count
            FROM products
            WHERE product_id = ?1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Checks whether a product id exists.
    pub async fn exists_by_id(&self, product_id: i64) -> DbResult<bool> {
        let exists: i64 =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE product_id = ?1)")
                .bind(product_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists != 0)
    }

    /// Returns `(unit price, available stock)` for order validation.
    pub async fn price_and_stock(&self, product_id: i64) -> DbResult<Option<(Money, i64)>> {
        let row: Option<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT price, product_quantity - sold_quantity
            FROM products
            WHERE product_id = ?1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(price, available)| (Money::from_cents(price), available)))
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Images
    // =========================================================================

    /// Starts a one-shot image attach for `count` images.
    ///
    /// Claims the product by moving `image_count` from 0 to `count` and
    /// inserts one metadata row per image with `image_no` 1..=count. Nothing
    /// is visible to other connections until [`ImageBatch::commit`].
    ///
    /// ## Errors
    /// * `DbError::NotFound` - product does not exist
    /// * `DbError::ImagesAlreadyAttached` - product already has images
    pub async fn reserve_images(&self, product_id: i64, count: usize) -> DbResult<ImageBatch> {
        debug!(product_id, count, "Reserving product images");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE products SET image_count = ?2 WHERE product_id = ?1 AND image_count = 0",
        )
        .bind(product_id)
        .bind(count as i64)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let exists: i64 =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE product_id = ?1)")
                    .bind(product_id)
                    .fetch_one(&mut *tx)
                    .await?;
            tx.rollback().await?;

            return Err(if exists != 0 {
                DbError::ImagesAlreadyAttached { product_id }
            } else {
                DbError::not_found("Product", product_id)
            });
        }

        let mut image_ids = Vec::with_capacity(count);
        for image_no in 1..=count as i64 {
            let image_id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO product_images (product_id, image_no)
                VALUES (?1, ?2)
                RETURNING image_id
                "#,
            )
            .bind(product_id)
            .bind(image_no)
            .fetch_one(&mut *tx)
            .await?;
            image_ids.push(image_id);
        }

        Ok(ImageBatch {
            tx,
            product_id,
            image_ids,
        })
    }

    /// Lists a product's images ordered by `image_no`.
    pub async fn list_images(&self, product_id: i64) -> DbResult<Vec<ProductImage>> {
        let images = sqlx::query_as::<_, ProductImage>(
            r#"
            SELECT image_id, product_id, image_no
            FROM product_images
            WHERE product_id = ?1
            ORDER BY image_no
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }
}

// =============================================================================
// Image Batch
// =============================================================================

/// Image rows written inside an open transaction.
///
/// Dropping the batch without calling [`commit`](Self::commit) rolls the
/// transaction back.
pub struct ImageBatch {
    tx: Transaction<'static, Sqlite>,
    product_id: i64,
    image_ids: Vec<i64>,
}

impl ImageBatch {
    /// Generated image ids, in `image_no` order.
    pub fn image_ids(&self) -> &[i64] {
        &self.image_ids
    }

    /// Makes the rows and the new `image_count` visible.
    pub async fn commit(self) -> DbResult<Vec<i64>> {
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        debug!(product_id = self.product_id, "Product images committed");
        Ok(self.image_ids)
    }

    /// Discards the rows and restores `image_count` to zero.
    pub async fn rollback(self) -> DbResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        Ok(())
    }
}

impl std::fmt::Debug for ImageBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageBatch")
            .field("product_id", &self.product_id)
            .field("image_ids", &self.image_ids)
            .finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
