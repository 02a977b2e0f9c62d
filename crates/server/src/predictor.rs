//! HTTP transport for the purchase predictor.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use storefront_core::config::PredictorConfig;
use storefront_core::features::CustomerFeatures;
use storefront_core::prediction::{
    PredictionError, PredictionGateway, PredictionPayload, PredictionResult, PredictorHealth,
};

const PREDICT_PATH: &str = "api/ai/predict";
const HEALTH_PATH: &str = "api/ai/health";

/// Maximum number of response body bytes kept in a status error.
const ERROR_BODY_LIMIT: usize = 512;

pub struct HttpPredictionGateway {
    client: Client,
    predict_url: String,
    health_url: String,
    timeout_secs: u64,
    api_key: Option<SecretString>,
}

impl HttpPredictionGateway {
    pub fn from_config(config: &PredictorConfig) -> Result<Self, PredictionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| PredictionError::Transport(error.to_string()))?;

        Ok(Self {
            client,
            predict_url: config.endpoint(PREDICT_PATH),
            health_url: config.endpoint(HEALTH_PATH),
            timeout_secs: config.timeout_secs,
            api_key: config.api_key.clone(),
        })
    }

    fn classify(&self, error: reqwest::Error) -> PredictionError {
        if error.is_timeout() {
            PredictionError::Timeout { timeout_secs: self.timeout_secs }
        } else if error.is_decode() {
            PredictionError::Decode(error.to_string())
        } else {
            PredictionError::Transport(error.to_string())
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, PredictionError> {
        let request = match &self.api_key {
            Some(key) => request.bearer_auth(key.expose_secret()),
            None => request,
        };

        let response = request.send().await.map_err(|error| self.classify(error))?;
        let status = response.status();
        if !status.is_success() {
            let body = clip_to_char_boundary(response.text().await.unwrap_or_default());
            return Err(PredictionError::Status { status: status.as_u16(), body });
        }

        let bytes = response.bytes().await.map_err(|error| self.classify(error))?;
        serde_json::from_slice(&bytes).map_err(|error| PredictionError::Decode(error.to_string()))
    }
}

/// Shortens `body` to at most `ERROR_BODY_LIMIT` bytes without splitting a
/// character.
fn clip_to_char_boundary(mut body: String) -> String {
    if body.len() > ERROR_BODY_LIMIT {
        let mut cut = ERROR_BODY_LIMIT;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}

#[async_trait]
impl PredictionGateway for HttpPredictionGateway {
    async fn predict(
        &self,
        features: &CustomerFeatures,
    ) -> Result<PredictionResult, PredictionError> {
        let payload = PredictionPayload::from(features);
        debug!(
            event_name = "predictor.predict.request",
            url = %self.predict_url,
            "calling predictor"
        );

        let result = self.send(self.client.post(&self.predict_url).json(&payload)).await;
        if let Err(error) = &result {
            warn!(event_name = "predictor.predict.failed", error = %error, "prediction failed");
        }
        result
    }

    async fn health(&self) -> Result<PredictorHealth, PredictionError> {
        self.send(self.client.get(&self.health_url)).await
    }
}
