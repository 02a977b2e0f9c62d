use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::demand::two_places;
use crate::domain::order::Order;
use crate::prediction::PredictionResult;
use crate::tally::Tally;

/// Number of fine categories reported as a customer's favourites.
pub const TOP_CATEGORY_COUNT: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

/// Ranks fine categories by purchased quantity, keeping first-seen order on ties.
pub fn top_categories(orders: &[Order], catalog: &Catalog, limit: usize) -> Vec<CategoryCount> {
    let mut tally: Tally<String> = Tally::default();
    for order in orders {
        for line in &order.lines {
            if let Some(product) = catalog.find(&line.product_id) {
                tally.add(product.category.clone(), u64::from(line.quantity));
            }
        }
    }

    tally
        .ranked()
        .into_iter()
        .take(limit)
        .map(|(category, count)| CategoryCount { category, count })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NextPurchasePrediction {
    pub amount: f64,
    pub category: String,
    pub confidence: f64,
}

/// Behaviour summary shown to a signed-in customer.
///
/// The order-derived part is always present. The prediction-derived fields
/// are `None` when the predictor could not be reached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomerInsights {
    pub total_orders: usize,
    pub total_spent: Decimal,
    pub avg_order_value: Decimal,
    pub top_categories: Vec<CategoryCount>,
    pub ai_prediction: Option<PredictionResult>,
    pub customer_segment: Option<String>,
    pub next_purchase_prediction: Option<NextPurchasePrediction>,
}

impl CustomerInsights {
    pub fn compute(orders: &[Order], catalog: &Catalog) -> Self {
        let total_spent: Decimal = orders.iter().map(|order| order.total_amount).sum();
        let avg_order_value = if orders.is_empty() {
            Decimal::ZERO
        } else {
            total_spent / Decimal::from(orders.len())
        };

        Self {
            total_orders: orders.len(),
            total_spent: two_places(total_spent),
            avg_order_value: two_places(avg_order_value),
            top_categories: top_categories(orders, catalog, TOP_CATEGORY_COUNT),
            ai_prediction: None,
            customer_segment: None,
            next_purchase_prediction: None,
        }
    }

    pub fn with_prediction(mut self, prediction: PredictionResult) -> Self {
        self.customer_segment = Some(prediction.customer_segment.clone());
        self.next_purchase_prediction = Some(NextPurchasePrediction {
            amount: prediction.predicted_amount,
            category: prediction.predicted_category.clone(),
            confidence: prediction.confidence(),
        });
        self.ai_prediction = Some(prediction);
        self
    }
}
