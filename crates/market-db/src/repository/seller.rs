//! # Seller Repository
//!
//! Database operations for seller accounts. Sellers carry a unique display
//! name in addition to the unique email.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use market_core::Seller;

/// Repository for seller database operations.
#[derive(Debug, Clone)]
pub struct SellerRepository {
    pool: SqlitePool,
}

impl SellerRepository {
    /// Creates a new SellerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SellerRepository { pool }
    }

    /// Inserts a seller and returns the stored row.
    pub async fn insert(
        &self,
        email: &str,
        seller_name: &str,
        password_hash: &str,
    ) -> DbResult<Seller> {
        debug!(email = %email, seller_name = %seller_name, "Inserting seller");

        let seller = sqlx::query_as::<_, Seller>(
            r#"
            INSERT INTO sellers (email, seller_name, password_hash)
            VALUES (?1, ?2, ?3)
            RETURNING seller_id, email, seller_name, password_hash
            "#,
        )
        .bind(email)
        .bind(seller_name)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(seller)
    }

    /// Gets a seller by exact email.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<Seller>> {
        let seller = sqlx::query_as::<_, Seller>(
            r#"
            SELECT seller_id, email, seller_name, password_hash
            FROM sellers
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(seller)
    }

    /// Checks whether a seller id exists.
    pub async fn exists_by_id(&self, seller_id: i64) -> DbResult<bool> {
        let exists: i64 =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM sellers WHERE seller_id = ?1)")
                .bind(seller_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists != 0)
    }

    /// Checks whether an email is taken. Case-sensitive.
    pub async fn exists_by_email(&self, email: &str) -> DbResult<bool> {
        let exists: i64 =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM sellers WHERE email = ?1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists != 0)
    }

    /// Checks whether a seller name is taken. Case-sensitive.
    pub async fn exists_by_name(&self, seller_name: &str) -> DbResult<bool> {
        let exists: i64 =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM sellers WHERE seller_name = ?1)")
                .bind(seller_name)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists != 0)
    }
}
