//! # Order Repository
//!
//! Database operations for member orders and guest orders.
//!
//! ## Stock Reservation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         insert(new_order)                               │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    UPDATE products                                                      │
//! │       SET sold_quantity = sold_quantity + qty                          │
//! │     WHERE product_id = ?                                               │
//! │       AND product_quantity - sold_quantity >= qty                      │
//! │       │                                                                 │
//! │       ├── 0 rows ──► ROLLBACK, DbError::StockExhausted                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │    INSERT INTO orders | guest_orders (payment_status = 'pending')      │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two concurrent orders for the last unit cannot both succeed.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use market_core::{GuestOrder, NewOrder, Order, PaymentStatus, Purchaser};

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Reserves stock and inserts the order in one transaction.
    ///
    /// Writes to `orders` for [`Purchaser::Buyer`] and to `guest_orders`
    /// for [`Purchaser::Guest`]. Returns the generated order id.
    ///
    /// ## Errors
    /// * `DbError::StockExhausted` - fewer than `order_quantity` units left
    pub async fn insert(&self, order: &NewOrder) -> DbResult<i64> {
        debug!(
            product_id = order.product_id,
            quantity = order.order_quantity,
            "Inserting order"
        );

        let mut tx = self.pool.begin().await?;

        let reserved = sqlx::query(
            r#"
            UPDATE products
               SET sold_quantity = sold_quantity + ?2
             WHERE product_id = ?1
               AND product_quantity - sold_quantity >= ?2
            "#,
        )
        .bind(order.product_id)
        .bind(order.order_quantity)
        .execute(&mut *tx)
        .await?;

        if reserved.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(DbError::StockExhausted {
                product_id: order.product_id,
            });
        }

        let now = Utc::now();
        let shipping = &order.shipping;

        let order_id: i64 = match &order.purchaser {
            Purchaser::Buyer(buyer_id) => {
                sqlx::query_scalar(
                    r#"
                    INSERT INTO orders (
                        product_id, buyer_id, delivery_type, order_quantity,
                        payment_type, payment_status, amount, phone,
                        order_date, address_line_1, address_line_2, postal_code
                    ) VALUES (
                        ?1, ?2, ?3, ?4,
                        ?5, ?6, ?7, ?8,
                        ?9, ?10, ?11, ?12
                    )
                    RETURNING order_id
                    "#,
                )
                .bind(order.product_id)
                .bind(*buyer_id)
                .bind(order.delivery_type)
                .bind(order.order_quantity)
                .bind(order.payment_type)
                .bind(PaymentStatus::Pending)
                .bind(order.amount.cents())
                .bind(&shipping.phone)
                .bind(now)
                .bind(&shipping.address_line_1)
                .bind(shipping.address_line_2.as_deref())
                .bind(&shipping.postal_code)
                .fetch_one(&mut *tx)
                .await?
            }
            Purchaser::Guest(email) => {
                sqlx::query_scalar(
                    r#"
                    INSERT INTO guest_orders (
                        product_id, email, delivery_type, order_quantity,
                        payment_type, payment_status, amount, phone,
                        order_date, address_line_1, address_line_2, postal_code
                    ) VALUES (
                        ?1, ?2, ?3, ?4,
                        ?5, ?6, ?7, ?8,
                        ?9, ?10, ?11, ?12
                    )
                    RETURNING guest_order_id
                    "#,
                )
                .bind(order.product_id)
                .bind(email)
                .bind(order.delivery_type)
                .bind(order.order_quantity)
                .bind(order.payment_type)
                .bind(PaymentStatus::Pending)
                .bind(order.amount.cents())
                .bind(&shipping.phone)
                .bind(now)
                .bind(&shipping.address_line_1)
                .bind(shipping.address_line_2.as_deref())
                .bind(&shipping.postal_code)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            order_id,
            product_id = order.product_id,
            guest = matches!(order.purchaser, Purchaser::Guest(_)),
            "Order created"
        );
        Ok(order_id)
    }

    /// Gets a member order by id. `address_line_2` is never null.
    pub async fn get_by_id(&self, order_id: i64) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT
                order_id, product_id, buyer_id, delivery_type, order_quantity,
                payment_type, payment_status, amount, phone, order_date,
                address_line_1, COALESCE(address_line_2, '') AS address_line_2,
                postal_code
            FROM orders
            WHERE order_id = ?1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets a guest order by id. `address_line_2` is never null.
    pub async fn get_guest_by_id(&self, guest_order_id: i64) -> DbResult<Option<GuestOrder>> {
        let order = sqlx::query_as::<_, GuestOrder>(
            r#"
            SELECT
                guest_order_id, product_id, email, delivery_type, order_quantity,
                payment_type, payment_status, amount, phone, order_date,
                address_line_1, COALESCE(address_line_2, '') AS address_line_2,
                postal_code
            FROM guest_orders
            WHERE guest_order_id = ?1
            "#,
        )
        .bind(guest_order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Checks whether a member order id exists.
    pub async fn exists_by_id(&self, order_id: i64) -> DbResult<bool> {
        let exists: i64 =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM orders WHERE order_id = ?1)")
                .bind(order_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists != 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use market_core::{
        DeliveryType, Money, NewProduct, PaymentType, ProductType, ShippingDetails,
    };

    struct Fixture {
        db: Database,
        product_id: i64,
        buyer_id: i64,
    }

    async fn setup(stock: i64) -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let seller = db.sellers().insert("s@shop.sg", "Shop", "h").await.unwrap();
        let buyer = db.buyers().insert("b@shop.sg", "h").await.unwrap();
        let product = db
            .products()
            .insert(&NewProduct {
                seller_id: seller.seller_id,
                title: "Lamp".to_string(),
                description: String::new(),
                product_type: ProductType::BuyNow,
                price: Money::from_cents(1000),
                condition: 5,
                product_quantity: stock,
            })
            .await
            .unwrap();

        Fixture {
            db,
            product_id: product.product_id,
            buyer_id: buyer.buyer_id,
        }
    }

    fn new_order(product_id: i64, purchaser: Purchaser, quantity: i64) -> NewOrder {
        NewOrder {
            product_id,
            purchaser,
            order_quantity: quantity,
            payment_type: PaymentType::PaynowOnline,
            delivery_type: DeliveryType::SelfCollection,
            amount: Money::from_cents(2100),
            shipping: ShippingDetails {
                phone: "91234567".to_string(),
                address_line_1: "1 Orchard Rd".to_string(),
                address_line_2: None,
                postal_code: "238801".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_order() {
        let f = setup(5).await;

        let order_id = f
            .db
            .orders()
            .insert(&new_order(f.product_id, Purchaser::Buyer(f.buyer_id), 2))
            .await
            .unwrap();

        let order = f.db.orders().get_by_id(order_id).await.unwrap().unwrap();
        assert_eq!(order.product_id, f.product_id);
        assert_eq!(order.buyer_id, f.buyer_id);
        assert_eq!(order.order_quantity, 2);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.amount.cents(), 2100);
        assert_eq!(order.address_line_1, "1 Orchard Rd");
        assert_eq!(order.address_line_2, "");
        assert_eq!(order.postal_code, "238801");

        assert!(f.db.orders().exists_by_id(order_id).await.unwrap());
        assert!(f.db.orders().get_by_id(order_id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_reserves_stock() {
        let f = setup(5).await;

        f.db.orders()
            .insert(&new_order(f.product_id, Purchaser::Buyer(f.buyer_id), 3))
            .await
            .unwrap();

        let (_, available) = f
            .db
            .products()
            .price_and_stock(f.product_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(available, 2);
    }

    #[tokio::test]
    async fn test_insert_rejects_oversell() {
        let f = setup(2).await;

        f.db.orders()
            .insert(&new_order(f.product_id, Purchaser::Buyer(f.buyer_id), 2))
            .await
            .unwrap();

        let err = f
            .db
            .orders()
            .insert(&new_order(f.product_id, Purchaser::Guest("g@x.sg".into()), 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::StockExhausted { .. }));

        let product = f.db.products().get_by_id(f.product_id).await.unwrap().unwrap();
        assert_eq!(product.sold_quantity, 2);
    }

    #[tokio::test]
    async fn test_guest_order_round_trip() {
        let f = setup(1).await;
        let mut order = new_order(f.product_id, Purchaser::Guest("g@x.sg".into()), 1);
        order.shipping.address_line_2 = Some("#05-01".to_string());

        let id = f.db.orders().insert(&order).await.unwrap();

        let stored = f.db.orders().get_guest_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.guest_order_id, id);
        assert_eq!(stored.email, "g@x.sg");
        assert_eq!(stored.address_line_2, "#05-01");
        assert_eq!(stored.payment_type, PaymentType::PaynowOnline);
    }
}
