use std::collections::HashMap;

use sqlx::Row;

use storefront_core::domain::customer::CustomerId;
use storefront_core::domain::order::{Order, OrderId, OrderLine};
use storefront_core::domain::product::ProductId;

use super::{decode_err, parse_decimal, parse_timestamp, OrderRepository, RepositoryError};
use crate::DbPool;

pub struct SqlOrderRepository {
    pool: DbPool,
}

impl SqlOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn load_lines(
        &self,
        customer_id: Option<&CustomerId>,
    ) -> Result<HashMap<String, Vec<OrderLine>>, RepositoryError> {
        let rows = match customer_id {
            Some(customer_id) => {
                sqlx::query(
                    "SELECT l.order_id, l.product_id, l.quantity, l.unit_price
                     FROM order_line l
                     JOIN customer_order o ON o.id = l.order_id
                     WHERE o.customer_id = ?
                     ORDER BY l.order_id, l.line_number",
                )
                .bind(&customer_id.0)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT order_id, product_id, quantity, unit_price
                     FROM order_line
                     ORDER BY order_id, line_number",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        let mut lines: HashMap<String, Vec<OrderLine>> = HashMap::new();
        for row in &rows {
            let order_id: String = row.try_get("order_id").map_err(decode_err)?;
            let quantity: i64 = row.try_get("quantity").map_err(decode_err)?;
            let unit_price: String = row.try_get("unit_price").map_err(decode_err)?;
            lines.entry(order_id).or_default().push(OrderLine {
                product_id: ProductId(row.try_get("product_id").map_err(decode_err)?),
                quantity: u32::try_from(quantity).map_err(decode_err)?,
                unit_price: parse_decimal("unit_price", &unit_price)?,
            });
        }
        Ok(lines)
    }

    fn assemble(
        rows: &[sqlx::sqlite::SqliteRow],
        mut lines: HashMap<String, Vec<OrderLine>>,
    ) -> Result<Vec<Order>, RepositoryError> {
        rows.iter()
            .map(|row| {
                let id: String = row.try_get("id").map_err(decode_err)?;
                let total_amount: String = row.try_get("total_amount").map_err(decode_err)?;
                let created_at: String = row.try_get("created_at").map_err(decode_err)?;
                Ok(Order {
                    lines: lines.remove(&id).unwrap_or_default(),
                    id: OrderId(id),
                    customer_id: CustomerId(row.try_get("customer_id").map_err(decode_err)?),
                    total_amount: parse_decimal("total_amount", &total_amount)?,
                    created_at: parse_timestamp("created_at", &created_at)?,
                })
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl OrderRepository for SqlOrderRepository {
    async fn list_for_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, customer_id, total_amount, created_at
             FROM customer_order
             WHERE customer_id = ?
             ORDER BY created_at, id",
        )
        .bind(&customer_id.0)
        .fetch_all(&self.pool)
        .await?;

        let lines = self.load_lines(Some(customer_id)).await?;
        Self::assemble(&rows, lines)
    }

    async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, customer_id, total_amount, created_at
             FROM customer_order
             ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        let lines = self.load_lines(None).await?;
        Self::assemble(&rows, lines)
    }

    async fn save(&self, order: Order) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO customer_order (id, customer_id, total_amount, created_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                customer_id = excluded.customer_id,
                total_amount = excluded.total_amount,
                created_at = excluded.created_at",
        )
        .bind(&order.id.0)
        .bind(&order.customer_id.0)
        .bind(order.total_amount.to_string())
        .bind(order.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM order_line WHERE order_id = ?")
            .bind(&order.id.0)
            .execute(&mut *tx)
            .await?;

        for (line_number, line) in order.lines.iter().enumerate() {
            sqlx::query(
                "INSERT INTO order_line (order_id, line_number, product_id, quantity, unit_price)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&order.id.0)
            .bind(line_number as i64)
            .bind(&line.product_id.0)
            .bind(i64::from(line.quantity))
            .bind(line.unit_price.to_string())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
