use async_trait::async_trait;
use sqlx::PgPool;

use super::OrderSubmitter;
use crate::domain::aggregates::Order;
use crate::Result;

/// Writes the order and its lines in one transaction.
#[derive(Debug, Clone)]
pub struct PgOrderSubmitter {
    db: PgPool,
}

impl PgOrderSubmitter {
    pub fn new(db: PgPool) -> Self { Self { db } }
}

#[async_trait]
impl OrderSubmitter for PgOrderSubmitter {
    async fn submit(&self, order: &Order) -> Result<()> {
        let mut tx = self.db.begin().await?;
        let customer = order.customer();

        sqlx::query("INSERT INTO orders (id, order_number, customer_name, customer_email, customer_phone, delivery_address, note, total, status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending', $9)")
            .bind(order.id()).bind(order.order_number()).bind(&customer.name).bind(&customer.email)
            .bind(&customer.phone).bind(&customer.address).bind(&customer.note)
            .bind(order.total().amount()).bind(order.created_at())
            .execute(&mut *tx)
            .await?;

        for line in order.lines() {
            sqlx::query("INSERT INTO order_items (order_id, product_id, name, unit_price, quantity, line_total) VALUES ($1, $2, $3, $4, $5, $6)")
                .bind(order.id()).bind(line.product_id).bind(&line.name)
                .bind(line.unit_price.amount()).bind(i64::from(line.quantity.get())).bind(line.line_total.amount())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
