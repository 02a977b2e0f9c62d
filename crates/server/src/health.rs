use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use storefront_core::prediction::PredictionGateway;
use storefront_db::{connection, DbPool};

#[derive(Clone)]
pub struct HealthState {
    pub db_pool: DbPool,
    pub predictor: Arc<dyn PredictionGateway>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: HealthCheck,
    pub predictor: HealthCheck,
    pub checked_at: String,
}

pub fn router(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

/// The database gates readiness. A failing predictor only degrades the
/// service, since insights and forecasts keep working without it.
pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let database = database_check(&state.db_pool).await;
    let predictor = predictor_check(state.predictor.as_ref()).await;

    let (status, status_code) = match (database.status, predictor.status) {
        ("ready", "ready") => ("ready", StatusCode::OK),
        ("ready", _) => ("degraded", StatusCode::OK),
        _ => ("unavailable", StatusCode::SERVICE_UNAVAILABLE),
    };
    if status != "ready" {
        warn!(
            event_name = "system.health.not_ready",
            correlation_id = "health",
            status,
            database = %database.detail,
            predictor = %predictor.detail,
            "health check not ready"
        );
    }

    let payload =
        HealthResponse { status, database, predictor, checked_at: Utc::now().to_rfc3339() };
    (status_code, Json(payload))
}

async fn database_check(pool: &DbPool) -> HealthCheck {
    match connection::ping(pool).await {
        Ok(()) => HealthCheck { status: "ready", detail: "database query succeeded".to_string() },
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("database query failed: {error}") }
        }
    }
}

async fn predictor_check(predictor: &dyn PredictionGateway) -> HealthCheck {
    match predictor.health().await {
        Ok(health) if health.is_healthy() => {
            HealthCheck { status: "ready", detail: "predictor model loaded".to_string() }
        }
        Ok(health) => HealthCheck {
            status: "degraded",
            detail: format!(
                "predictor reported status `{}` (model_loaded={})",
                health.status, health.model_loaded
            ),
        },
        Err(error) => HealthCheck { status: "degraded", detail: error.to_string() },
    }
}
