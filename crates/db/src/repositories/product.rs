use chrono::Utc;
use sqlx::Row;

use storefront_core::catalog::CatalogQuery;
use storefront_core::domain::product::{Product, ProductId};

use super::{decode_err, parse_decimal, parse_string_list, ProductRepository, RepositoryError};
use crate::DbPool;

const PRODUCT_COLUMNS: &str = "id, name, category, price, colors_json, is_featured";

pub struct SqlProductRepository {
    pool: DbPool,
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_product(row: &sqlx::sqlite::SqliteRow) -> Result<Product, RepositoryError> {
    let price: String = row.try_get("price").map_err(decode_err)?;
    let colors_json: String = row.try_get("colors_json").map_err(decode_err)?;
    let is_featured: i64 = row.try_get("is_featured").map_err(decode_err)?;

    Ok(Product {
        id: ProductId(row.try_get("id").map_err(decode_err)?),
        name: row.try_get("name").map_err(decode_err)?,
        category: row.try_get("category").map_err(decode_err)?,
        price: parse_decimal("price", &price)?,
        colors: parse_string_list("colors_json", &colors_json)?,
        featured: is_featured != 0,
    })
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

#[async_trait::async_trait]
impl ProductRepository for SqlProductRepository {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE id = ?");
        let row = sqlx::query(&sql).bind(&id.0).fetch_optional(&self.pool).await?;
        row.as_ref().map(row_to_product).transpose()
    }

    async fn find_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE id IN ({}) ORDER BY rowid",
            placeholders(ids.len())
        );
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(&id.0);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(row_to_product).collect()
    }

    async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM product ORDER BY rowid");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_product).collect()
    }

    async fn query(&self, query: &CatalogQuery) -> Result<Vec<Product>, RepositoryError> {
        let categories = query.distinct_categories();
        if categories.is_empty() || query.limit == 0 {
            return Ok(Vec::new());
        }

        let order_by = if query.featured_first { "is_featured DESC, rowid" } else { "rowid" };
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE category IN ({}) ORDER BY {order_by} LIMIT ?",
            placeholders(categories.len())
        );
        let mut statement = sqlx::query(&sql);
        for category in categories {
            statement = statement.bind(category);
        }
        let limit = i64::try_from(query.limit).unwrap_or(i64::MAX);

        let rows = statement.bind(limit).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_product).collect()
    }

    async fn save(&self, product: Product) -> Result<(), RepositoryError> {
        let colors_json = serde_json::to_string(&product.colors).map_err(decode_err)?;

        sqlx::query(
            "INSERT INTO product (id, name, category, price, colors_json, is_featured, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                category = excluded.category,
                price = excluded.price,
                colors_json = excluded.colors_json,
                is_featured = excluded.is_featured",
        )
        .bind(&product.id.0)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price.to_string())
        .bind(colors_json)
        .bind(i64::from(product.featured))
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use storefront_core::catalog::CatalogQuery;
    use storefront_core::domain::product::{Product, ProductId};

    use super::SqlProductRepository;
    use crate::repositories::ProductRepository;
    use crate::{connect_with_settings, migrations};

    fn product(id: &str, category: &str, featured: bool, price: Decimal) -> Product {
        Product {
            id: ProductId(id.to_string()),
            name: id.to_string(),
            category: category.to_string(),
            price,
            colors: vec!["Black".to_string()],
            featured,
        }
    }

    async fn seeded() -> SqlProductRepository {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        let repo = SqlProductRepository::new(pool);
        for item in [
            product("canvas", "shoes", false, Decimal::new(65, 0)),
            product("runner", "shoes", true, Decimal::new(129, 0)),
            product("leather", "shoes", false, Decimal::new(159, 0)),
            product("aviator", "glasses", false, Decimal::new(14999, 2)),
            product("round", "glasses", true, Decimal::new(99, 0)),
            product("tote", "bags", false, Decimal::new(49, 0)),
        ] {
            repo.save(item).await.expect("save product");
        }
        repo
    }

    #[tokio::test]
    async fn decimal_prices_survive_storage() {
        let repo = seeded().await;
        let found = repo.find_by_id(&ProductId("aviator".to_string())).await.expect("find");
        assert_eq!(found.map(|product| product.price), Some(Decimal::new(14999, 2)));
    }

    #[tokio::test]
    async fn query_puts_featured_first_and_respects_limit() {
        let repo = seeded().await;
        let query = CatalogQuery {
            categories: vec!["glasses".to_string(), "shoes".to_string(), "glasses".to_string()],
            featured_first: true,
            limit: 3,
        };

        let ids: Vec<String> =
            repo.query(&query).await.expect("query").into_iter().map(|p| p.id.0).collect();

        assert_eq!(ids, vec!["runner", "round", "canvas"]);
    }

    #[tokio::test]
    async fn query_with_no_categories_is_empty() {
        let repo = seeded().await;
        let query = CatalogQuery { categories: Vec::new(), featured_first: true, limit: 8 };
        assert!(repo.query(&query).await.expect("query").is_empty());
    }

    #[tokio::test]
    async fn find_many_skips_unknown_ids() {
        let repo = seeded().await;
        let found = repo
            .find_many(&[ProductId("tote".to_string()), ProductId("gone".to_string())])
            .await
            .expect("find many");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].category, "bags");
        assert_eq!(repo.list_all().await.expect("list").len(), 6);
    }
}
