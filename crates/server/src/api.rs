//! Versioned JSON API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use storefront_core::demand::DemandForecast;
use storefront_core::domain::customer::CustomerId;
use storefront_core::errors::{ApplicationError, InterfaceError};
use storefront_core::insights::CustomerInsights;
use storefront_core::recommendation::RecommendationResponse;
use storefront_core::stats::{CustomerStats, OrderCompleted};
use storefront_core::suggestions::SuggestionOutcome;

use crate::service::{CartItemRequest, StorefrontService};
use crate::stats::StatsQueue;

const PREDICTOR_UNAVAILABLE: &str = "AI service unavailable";

#[derive(Clone)]
pub struct ApiState {
    pub service: StorefrontService,
    pub stats_queue: StatsQueue,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
    pub message: String,
    pub correlation_id: String,
}

#[derive(Debug)]
pub struct ApiError(InterfaceError);

impl ApiError {
    fn from_application(error: ApplicationError, correlation_id: &str) -> Self {
        Self(error.into_interface(correlation_id))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            InterfaceError::BadRequest { message, .. } => (StatusCode::BAD_REQUEST, message),
            InterfaceError::NotFound { message, .. } => (StatusCode::NOT_FOUND, message),
            InterfaceError::ServiceUnavailable { message, .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, message)
            }
            InterfaceError::Internal { message, .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        let body = ApiErrorBody {
            error: self.0.user_message().to_string(),
            message: message.clone(),
            correlation_id: self.0.correlation_id().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CartRequest {
    #[serde(default)]
    pub items: Vec<CartItemRequest>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct OrderCompletedRequest {
    pub customer_id: CustomerId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accepted {
    pub accepted: bool,
    pub correlation_id: String,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/v1/customers/{id}/recommendations", get(recommendations))
        .route("/api/v1/customers/{id}/insights", get(insights))
        .route("/api/v1/customers/{id}/suggestions", post(suggestions))
        .route("/api/v1/customers/{id}/stats", get(customer_stats))
        .route("/api/v1/admin/forecast", get(forecast))
        .route("/api/v1/events/order-completed", post(order_completed))
        .with_state(state)
}

fn correlation_id() -> String {
    Uuid::new_v4().to_string()
}

fn log_failure(event_name: &'static str, correlation_id: &str, error: &ApplicationError) {
    warn!(event_name, correlation_id, error = %error, "request failed");
}

pub async fn recommendations(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<RecommendationResponse>, ApiError> {
    let correlation_id = correlation_id();
    let customer_id = CustomerId(id);
    match state.service.recommendations(&customer_id).await {
        Ok(response) => Ok(Json(response)),
        Err(ApplicationError::Integration(detail)) => {
            let error = ApplicationError::Integration(format!("{PREDICTOR_UNAVAILABLE}: {detail}"));
            log_failure("api.recommendations.failed", &correlation_id, &error);
            Err(ApiError::from_application(error, &correlation_id))
        }
        Err(error) => {
            log_failure("api.recommendations.failed", &correlation_id, &error);
            Err(ApiError::from_application(error, &correlation_id))
        }
    }
}

pub async fn insights(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<CustomerInsights>, ApiError> {
    let correlation_id = correlation_id();
    state.service.insights(&CustomerId(id)).await.map(Json).map_err(|error| {
        log_failure("api.insights.failed", &correlation_id, &error);
        ApiError::from_application(error, &correlation_id)
    })
}

pub async fn suggestions(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(request): Json<CartRequest>,
) -> Result<Json<SuggestionOutcome>, ApiError> {
    let correlation_id = correlation_id();
    state.service.suggestions(&CustomerId(id), &request.items).await.map(Json).map_err(
        |error| {
            log_failure("api.suggestions.failed", &correlation_id, &error);
            ApiError::from_application(error, &correlation_id)
        },
    )
}

pub async fn customer_stats(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<CustomerStats>, ApiError> {
    let correlation_id = correlation_id();
    let customer_id = CustomerId(id);
    match state.service.stats(&customer_id).await {
        Ok(Some(stats)) => Ok(Json(stats)),
        Ok(None) => Err(ApiError(InterfaceError::NotFound {
            message: format!("stats for customer `{customer_id}` have not been computed yet"),
            correlation_id,
        })),
        Err(error) => {
            log_failure("api.stats.failed", &correlation_id, &error);
            Err(ApiError::from_application(error, &correlation_id))
        }
    }
}

pub async fn forecast(State(state): State<ApiState>) -> Result<Json<DemandForecast>, ApiError> {
    let correlation_id = correlation_id();
    state.service.forecast().await.map(Json).map_err(|error| {
        log_failure("api.forecast.failed", &correlation_id, &error);
        ApiError::from_application(error, &correlation_id)
    })
}

pub async fn order_completed(
    State(state): State<ApiState>,
    Json(request): Json<OrderCompletedRequest>,
) -> Result<(StatusCode, Json<Accepted>), ApiError> {
    let correlation_id = correlation_id();
    if let Err(error) = state.service.load_customer(&request.customer_id).await {
        log_failure("api.order_completed.rejected", &correlation_id, &error);
        return Err(ApiError::from_application(error, &correlation_id));
    }

    let event = OrderCompleted { customer_id: request.customer_id };
    let customer_id = event.customer_id.clone();
    match state.stats_queue.try_enqueue(event) {
        Ok(()) => {
            info!(
                event_name = "api.order_completed.accepted",
                correlation_id = %correlation_id,
                customer_id = %customer_id,
                "stats refresh queued"
            );
            Ok((StatusCode::ACCEPTED, Json(Accepted { accepted: true, correlation_id })))
        }
        Err(error) => {
            let error = ApplicationError::Integration(error.to_string());
            log_failure("api.order_completed.rejected", &correlation_id, &error);
            Err(ApiError::from_application(error, &correlation_id))
        }
    }
}
