use sqlx::Row;

use storefront_core::domain::customer::CustomerId;
use storefront_core::stats::CustomerStats;

use super::{
    decode_err, parse_decimal, parse_string_list, parse_timestamp, CustomerStatsRepository,
    RepositoryError,
};
use crate::DbPool;

pub struct SqlCustomerStatsRepository {
    pool: DbPool,
}

impl SqlCustomerStatsRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_stats(row: &sqlx::sqlite::SqliteRow) -> Result<CustomerStats, RepositoryError> {
    let order_count: i64 = row.try_get("order_count").map_err(decode_err)?;
    let total_spent: String = row.try_get("total_spent").map_err(decode_err)?;
    let average_order_value: String = row.try_get("average_order_value").map_err(decode_err)?;
    let last_purchase_at: Option<String> = row.try_get("last_purchase_at").map_err(decode_err)?;
    let favorites_json: String = row.try_get("favorite_categories_json").map_err(decode_err)?;
    let refreshed_at: String = row.try_get("refreshed_at").map_err(decode_err)?;

    Ok(CustomerStats {
        customer_id: CustomerId(row.try_get("customer_id").map_err(decode_err)?),
        order_count: u32::try_from(order_count).map_err(decode_err)?,
        total_spent: parse_decimal("total_spent", &total_spent)?,
        average_order_value: parse_decimal("average_order_value", &average_order_value)?,
        last_purchase_at: last_purchase_at
            .as_deref()
            .map(|raw| parse_timestamp("last_purchase_at", raw))
            .transpose()?,
        favorite_categories: parse_string_list("favorite_categories_json", &favorites_json)?,
        refreshed_at: parse_timestamp("refreshed_at", &refreshed_at)?,
    })
}

#[async_trait::async_trait]
impl CustomerStatsRepository for SqlCustomerStatsRepository {
    async fn find(&self, customer_id: &CustomerId) -> Result<Option<CustomerStats>, RepositoryError> {
        let row = sqlx::query(
            "SELECT customer_id, order_count, total_spent, average_order_value,
                    last_purchase_at, favorite_categories_json, refreshed_at
             FROM customer_stats
             WHERE customer_id = ?",
        )
        .bind(&customer_id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_stats).transpose()
    }

    async fn upsert(&self, stats: CustomerStats) -> Result<(), RepositoryError> {
        let favorites_json =
            serde_json::to_string(&stats.favorite_categories).map_err(decode_err)?;

        sqlx::query(
            "INSERT INTO customer_stats
                (customer_id, order_count, total_spent, average_order_value,
                 last_purchase_at, favorite_categories_json, refreshed_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(customer_id) DO UPDATE SET
                order_count = excluded.order_count,
                total_spent = excluded.total_spent,
                average_order_value = excluded.average_order_value,
                last_purchase_at = excluded.last_purchase_at,
                favorite_categories_json = excluded.favorite_categories_json,
                refreshed_at = excluded.refreshed_at",
        )
        .bind(&stats.customer_id.0)
        .bind(i64::from(stats.order_count))
        .bind(stats.total_spent.to_string())
        .bind(stats.average_order_value.to_string())
        .bind(stats.last_purchase_at.map(|value| value.to_rfc3339()))
        .bind(favorites_json)
        .bind(stats.refreshed_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use storefront_core::domain::customer::{CustomerId, CustomerProfile};
    use storefront_core::stats::CustomerStats;

    use super::SqlCustomerStatsRepository;
    use crate::repositories::{CustomerRepository, CustomerStatsRepository, SqlCustomerRepository};
    use crate::{connect_with_settings, migrations};

    #[tokio::test]
    async fn upsert_replaces_previous_snapshot() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        SqlCustomerRepository::new(pool.clone())
            .save(CustomerProfile::new("cust-1", "John Doe"))
            .await
            .expect("save customer");
        let repo = SqlCustomerStatsRepository::new(pool);
        let refreshed_at = Utc.with_ymd_and_hms(2026, 4, 2, 8, 30, 0).single().expect("timestamp");

        let empty = CustomerStats {
            customer_id: CustomerId("cust-1".to_string()),
            order_count: 0,
            total_spent: Decimal::ZERO,
            average_order_value: Decimal::ZERO,
            last_purchase_at: None,
            favorite_categories: Vec::new(),
            refreshed_at,
        };
        repo.upsert(empty).await.expect("upsert empty");

        let updated = CustomerStats {
            order_count: 2,
            total_spent: Decimal::new(27600, 2),
            average_order_value: Decimal::new(13800, 2),
            last_purchase_at: Some(refreshed_at),
            favorite_categories: vec!["bags".to_string(), "shoes".to_string()],
            ..repo
                .find(&CustomerId("cust-1".to_string()))
                .await
                .expect("find")
                .expect("stats present")
        };
        repo.upsert(updated.clone()).await.expect("upsert updated");

        let found = repo.find(&updated.customer_id).await.expect("find");
        assert_eq!(found, Some(updated));
    }

    #[tokio::test]
    async fn missing_stats_is_none() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        let repo = SqlCustomerStatsRepository::new(pool);

        assert!(repo.find(&CustomerId("cust-9".to_string())).await.expect("find").is_none());
    }
}
