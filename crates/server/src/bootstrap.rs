use std::sync::Arc;

use axum::Router;
use storefront_core::config::{AppConfig, ConfigError};
use storefront_core::prediction::{PredictionError, PredictionGateway};
use storefront_db::repositories::{
    SqlCustomerRepository, SqlCustomerStatsRepository, SqlOrderRepository, SqlProductRepository,
};
use storefront_db::{connect_with_settings, migrations, DbPool};
use thiserror::Error;
use tracing::info;

use crate::api::{self, ApiState};
use crate::health::{self, HealthState};
use crate::predictor::HttpPredictionGateway;
use crate::service::StorefrontService;
use crate::stats::{StatsQueue, StatsRefresher};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub service: StorefrontService,
    pub refresher: StatsRefresher,
}

impl Application {
    /// Health and API routes merged into one router.
    pub fn router(&self, stats_queue: StatsQueue) -> Router {
        let health_state =
            HealthState { db_pool: self.db_pool.clone(), predictor: self.service.predictor() };
        health::router(health_state)
            .merge(api::router(ApiState { service: self.service.clone(), stats_queue }))
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("predictor client could not be built: {0}")]
    Predictor(#[source] PredictionError),
}

/// Loads config and bootstraps in one step. `main` loads config itself so
/// logging can start first.
#[cfg(test)]
pub async fn bootstrap(
    options: storefront_core::config::LoadOptions,
) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let predictor: Arc<dyn PredictionGateway> = Arc::new(
        HttpPredictionGateway::from_config(&config.predictor).map_err(BootstrapError::Predictor)?,
    );
    info!(
        event_name = "system.bootstrap.predictor_configured",
        correlation_id = "bootstrap",
        base_url = %config.predictor.base_url,
        timeout_secs = config.predictor.timeout_secs,
        "predictor gateway configured"
    );

    let customers = Arc::new(SqlCustomerRepository::new(db_pool.clone()));
    let products = Arc::new(SqlProductRepository::new(db_pool.clone()));
    let orders = Arc::new(SqlOrderRepository::new(db_pool.clone()));
    let stats = Arc::new(SqlCustomerStatsRepository::new(db_pool.clone()));

    let refresher = StatsRefresher::new(orders.clone(), products.clone(), stats.clone());
    let service = StorefrontService::new(customers, products, orders, stats, predictor);

    Ok(Application { config, db_pool, service, refresher })
}
