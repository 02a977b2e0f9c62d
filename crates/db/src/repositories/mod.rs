use async_trait::async_trait;
use thiserror::Error;

use storefront_core::catalog::CatalogQuery;
use storefront_core::domain::customer::{CustomerId, CustomerProfile};
use storefront_core::domain::order::Order;
use storefront_core::domain::product::{Product, ProductId};
use storefront_core::stats::CustomerStats;

pub mod customer;
pub mod customer_stats;
pub mod memory;
pub mod order;
pub mod product;

pub use customer::SqlCustomerRepository;
pub use customer_stats::SqlCustomerStatsRepository;
pub use memory::{
    InMemoryCustomerRepository, InMemoryCustomerStatsRepository, InMemoryOrderRepository,
    InMemoryProductRepository,
};
pub use order::SqlOrderRepository;
pub use product::SqlProductRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<CustomerProfile>, RepositoryError>;
    async fn save(&self, customer: CustomerProfile) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Products for the given ids; unknown ids are skipped.
    async fn find_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError>;

    /// Every product in insertion order.
    async fn list_all(&self) -> Result<Vec<Product>, RepositoryError>;

    /// Products whose category is in the query, featured first when asked,
    /// capped at the query limit.
    async fn query(&self, query: &CatalogQuery) -> Result<Vec<Product>, RepositoryError>;

    async fn save(&self, product: Product) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn list_for_customer(&self, customer_id: &CustomerId)
        -> Result<Vec<Order>, RepositoryError>;
    async fn list_all(&self) -> Result<Vec<Order>, RepositoryError>;
    async fn save(&self, order: Order) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait CustomerStatsRepository: Send + Sync {
    async fn find(&self, customer_id: &CustomerId)
        -> Result<Option<CustomerStats>, RepositoryError>;
    async fn upsert(&self, stats: CustomerStats) -> Result<(), RepositoryError>;
}

pub(crate) fn decode_err(error: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Decode(error.to_string())
}

pub(crate) fn parse_decimal(column: &str, raw: &str) -> Result<rust_decimal::Decimal, RepositoryError> {
    raw.parse::<rust_decimal::Decimal>()
        .map_err(|error| RepositoryError::Decode(format!("column `{column}`: {error}")))
}

pub(crate) fn parse_timestamp(
    column: &str,
    raw: &str,
) -> Result<chrono::DateTime<chrono::Utc>, RepositoryError> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|value| value.with_timezone(&chrono::Utc))
        .map_err(|error| RepositoryError::Decode(format!("column `{column}`: {error}")))
}

pub(crate) fn parse_string_list(column: &str, raw: &str) -> Result<Vec<String>, RepositoryError> {
    serde_json::from_str(raw)
        .map_err(|error| RepositoryError::Decode(format!("column `{column}`: {error}")))
}
