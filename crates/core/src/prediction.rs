//! Contract with the external purchase predictor.
//!
//! The predictor is reached through [`PredictionGateway`]. The transport lives
//! in the server crate; this module owns the request/response shapes and the
//! wire adapter that renames feature fields to the labels the predictor was
//! trained on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::{CustomerFeatures, PurchaseFrequency, Season};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryProbability {
    pub category: String,
    /// Percentage in `0..=100` as reported by the predictor.
    pub probability: f64,
}

/// Predictor response, re-typed but otherwise passed through untouched.
///
/// `top_categories` keeps the order the predictor returned (highest
/// probability first); it is never re-sorted here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_amount: f64,
    pub predicted_category: String,
    pub customer_segment: String,
    #[serde(default)]
    pub top_categories: Vec<CategoryProbability>,
}

impl PredictionResult {
    /// Probability of the first ranked category, or 0 when none was returned.
    pub fn confidence(&self) -> f64 {
        self.top_categories.first().map(|entry| entry.probability).unwrap_or(0.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictorHealth {
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
}

impl PredictorHealth {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy" && self.model_loaded
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PredictionError {
    #[error("prediction service unreachable: {0}")]
    Transport(String),
    #[error("prediction service timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
    #[error("prediction service returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("prediction response could not be decoded: {0}")]
    Decode(String),
}

/// Synchronous request/response boundary to the predictor.
///
/// Implementations make exactly one attempt per call and must bound it with a
/// timeout. Callers treat any error as a degraded, non-fatal condition.
#[async_trait]
pub trait PredictionGateway: Send + Sync {
    async fn predict(
        &self,
        features: &CustomerFeatures,
    ) -> Result<PredictionResult, PredictionError>;

    async fn health(&self) -> Result<PredictorHealth, PredictionError>;
}

/// Wire form of [`CustomerFeatures`] using the predictor's column labels.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PredictionPayload<'a> {
    #[serde(rename = "Age")]
    pub age: u32,
    #[serde(rename = "Gender")]
    pub gender: &'a str,
    #[serde(rename = "Location")]
    pub location: &'a str,
    #[serde(rename = "Category")]
    pub category: &'a str,
    #[serde(rename = "Size")]
    pub size: &'a str,
    #[serde(rename = "Season")]
    pub season: Season,
    #[serde(rename = "Subscription Status")]
    pub subscription_status: &'a str,
    #[serde(rename = "Previous Purchases")]
    pub previous_purchases: u32,
    #[serde(rename = "Frequency of Purchases")]
    pub frequency_of_purchases: PurchaseFrequency,
    #[serde(rename = "Payment Method")]
    pub payment_method: &'a str,
    #[serde(rename = "Shipping Type")]
    pub shipping_type: &'a str,
    #[serde(rename = "Total Spent")]
    pub total_spent: i64,
    #[serde(rename = "Avg Order Value")]
    pub avg_order_value: i64,
    #[serde(rename = "Preferred Color")]
    pub preferred_color: &'a str,
    #[serde(rename = "Price Range Max")]
    pub price_range_max: u32,
}

impl<'a> From<&'a CustomerFeatures> for PredictionPayload<'a> {
    fn from(features: &'a CustomerFeatures) -> Self {
        Self {
            age: features.age,
            gender: &features.gender,
            location: &features.location,
            category: &features.category,
            size: &features.size,
            season: features.season,
            subscription_status: &features.subscription_status,
            previous_purchases: features.previous_purchases,
            frequency_of_purchases: features.frequency_of_purchases,
            payment_method: &features.payment_method,
            shipping_type: &features.shipping_type,
            total_spent: features.total_spent,
            avg_order_value: features.avg_order_value,
            preferred_color: &features.preferred_color,
            price_range_max: features.price_range_max,
        }
    }
}
