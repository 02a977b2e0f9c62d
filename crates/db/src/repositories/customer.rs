use chrono::Utc;
use sqlx::Row;

use storefront_core::domain::customer::{CustomerId, CustomerProfile};

use super::{decode_err, parse_string_list, CustomerRepository, RepositoryError};
use crate::DbPool;

pub struct SqlCustomerRepository {
    pool: DbPool,
}

impl SqlCustomerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_customer(row: &sqlx::sqlite::SqliteRow) -> Result<CustomerProfile, RepositoryError> {
    let age: Option<i64> = row.try_get("age").map_err(decode_err)?;
    let price_range_max: Option<i64> = row.try_get("price_range_max").map_err(decode_err)?;
    let colors_json: String = row.try_get("preferred_colors_json").map_err(decode_err)?;

    Ok(CustomerProfile {
        id: CustomerId(row.try_get("id").map_err(decode_err)?),
        name: row.try_get("name").map_err(decode_err)?,
        age: age.and_then(|value| u32::try_from(value).ok()),
        gender: row.try_get("gender").map_err(decode_err)?,
        location: row.try_get("location").map_err(decode_err)?,
        preferred_size: row.try_get("preferred_size").map_err(decode_err)?,
        preferred_payment_method: row.try_get("preferred_payment_method").map_err(decode_err)?,
        shipping_preference: row.try_get("shipping_preference").map_err(decode_err)?,
        subscription_status: row.try_get("subscription_status").map_err(decode_err)?,
        price_range_max: price_range_max.and_then(|value| u32::try_from(value).ok()),
        preferred_colors: parse_string_list("preferred_colors_json", &colors_json)?,
    })
}

#[async_trait::async_trait]
impl CustomerRepository for SqlCustomerRepository {
    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<CustomerProfile>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, age, gender, location, preferred_size, preferred_payment_method,
                    shipping_preference, subscription_status, price_range_max,
                    preferred_colors_json
             FROM customer
             WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_customer).transpose()
    }

    async fn save(&self, customer: CustomerProfile) -> Result<(), RepositoryError> {
        let colors_json = serde_json::to_string(&customer.preferred_colors).map_err(decode_err)?;

        sqlx::query(
            "INSERT INTO customer
                (id, name, age, gender, location, preferred_size, preferred_payment_method,
                 shipping_preference, subscription_status, price_range_max,
                 preferred_colors_json, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                age = excluded.age,
                gender = excluded.gender,
                location = excluded.location,
                preferred_size = excluded.preferred_size,
                preferred_payment_method = excluded.preferred_payment_method,
                shipping_preference = excluded.shipping_preference,
                subscription_status = excluded.subscription_status,
                price_range_max = excluded.price_range_max,
                preferred_colors_json = excluded.preferred_colors_json",
        )
        .bind(&customer.id.0)
        .bind(&customer.name)
        .bind(customer.age.map(i64::from))
        .bind(&customer.gender)
        .bind(&customer.location)
        .bind(&customer.preferred_size)
        .bind(&customer.preferred_payment_method)
        .bind(&customer.shipping_preference)
        .bind(&customer.subscription_status)
        .bind(customer.price_range_max.map(i64::from))
        .bind(colors_json)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
