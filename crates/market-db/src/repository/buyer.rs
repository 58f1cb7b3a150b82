//! # Buyer Repository
//!
//! Database operations for buyer accounts.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use market_core::Buyer;

/// Repository for buyer database operations.
#[derive(Debug, Clone)]
pub struct BuyerRepository {
    pool: SqlitePool,
}

impl BuyerRepository {
    /// Creates a new BuyerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BuyerRepository { pool }
    }

    /// Inserts a buyer and returns the stored row.
    ///
    /// `password_hash` must already be a PHC string; this layer never sees
    /// the plaintext. A duplicate email surfaces as
    /// [`DbError::UniqueViolation`](crate::DbError::UniqueViolation).
    pub async fn insert(&self, email: &str, password_hash: &str) -> DbResult<Buyer> {
        debug!(email = %email, "Inserting buyer");

        let buyer = sqlx::query_as::<_, Buyer>(
            r#"
            INSERT INTO buyers (email, password_hash)
            VALUES (?1, ?2)
            RETURNING buyer_id, email, password_hash
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(buyer)
    }

    /// Gets a buyer by exact (case-sensitive) email.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<Buyer>> {
        let buyer = sqlx::query_as::<_, Buyer>(
            "SELECT buyer_id, email, password_hash FROM buyers WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(buyer)
    }

    /// Checks whether a buyer id exists.
    pub async fn exists_by_id(&self, buyer_id: i64) -> DbResult<bool> {
        let exists: i64 =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM buyers WHERE buyer_id = ?1)")
                .bind(buyer_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists != 0)
    }

    /// Checks whether an email is taken. Case-sensitive.
    pub async fn exists_by_email(&self, email: &str) -> DbResult<bool> {
        let exists: i64 =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM buyers WHERE email = ?1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists != 0)
    }
}
