use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;

use storefront_core::domain::customer::{CustomerId, CustomerProfile};
use storefront_core::domain::order::{Order, OrderLine};
use storefront_core::domain::product::{Product, ProductId};
use storefront_core::features::CustomerFeatures;
use storefront_core::prediction::{
    CategoryProbability, PredictionError, PredictionGateway, PredictionResult, PredictorHealth,
};
use storefront_db::repositories::{
    CustomerRepository, InMemoryCustomerRepository, InMemoryCustomerStatsRepository,
    InMemoryOrderRepository, InMemoryProductRepository, OrderRepository,
};

use crate::service::StorefrontService;

/// Canned predictor: answers with a fixed prediction or fails every call.
pub struct FakePredictor {
    outcome: Result<PredictionResult, PredictionError>,
}

impl FakePredictor {
    pub fn predicting(category: &str, probability: f64) -> Self {
        Self {
            outcome: Ok(PredictionResult {
                predicted_amount: 63.5,
                predicted_category: category.to_string(),
                customer_segment: "Regular".to_string(),
                top_categories: vec![CategoryProbability {
                    category: category.to_string(),
                    probability,
                }],
            }),
        }
    }

    pub fn failing() -> Self {
        Self { outcome: Err(PredictionError::Timeout { timeout_secs: 10 }) }
    }
}

#[async_trait]
impl PredictionGateway for FakePredictor {
    async fn predict(
        &self,
        _features: &CustomerFeatures,
    ) -> Result<PredictionResult, PredictionError> {
        self.outcome.clone()
    }

    async fn health(&self) -> Result<PredictorHealth, PredictionError> {
        self.outcome
            .as_ref()
            .map(|_| PredictorHealth { status: "healthy".to_string(), model_loaded: true })
            .map_err(Clone::clone)
    }
}

pub fn product(id: &str, category: &str, price: i64, featured: bool) -> Product {
    Product {
        id: ProductId(id.to_string()),
        name: id.to_string(),
        category: category.to_string(),
        price: Decimal::new(price, 0),
        colors: vec!["Black".to_string()],
        featured,
    }
}

pub fn catalog() -> Vec<Product> {
    vec![
        product("slim-jeans", "jeans", 80, true),
        product("basic-tee", "t-shirts", 25, false),
        product("runner", "shoes", 120, true),
        product("trail-boot", "shoes", 150, false),
        product("aviators", "glasses", 90, true),
        product("tote", "bags", 40, true),
        product("bomber", "jackets", 160, true),
    ]
}

/// Service over in-memory stores holding one customer with two orders.
pub async fn service(predictor: FakePredictor) -> StorefrontService {
    let customers = Arc::new(InMemoryCustomerRepository::default());
    let mut profile = CustomerProfile::new("cust-1", "Jordan");
    profile.age = Some(34);
    customers.save(profile).await.expect("save customer");

    let orders = Arc::new(InMemoryOrderRepository::default());
    let customer_id = CustomerId("cust-1".to_string());
    let placed = Utc.with_ymd_and_hms(2026, 9, 1, 10, 0, 0).single().expect("timestamp");
    let placements = [("o-1", "slim-jeans", 2, 80), ("o-2", "runner", 1, 120)];
    for (id, product_id, quantity, price) in placements {
        let line = OrderLine {
            product_id: ProductId(product_id.to_string()),
            quantity,
            unit_price: Decimal::new(price, 0),
        };
        orders
            .save(Order::from_lines(id, customer_id.clone(), vec![line], placed))
            .await
            .expect("save order");
    }

    StorefrontService::new(
        customers,
        Arc::new(InMemoryProductRepository::with_products(catalog())),
        orders,
        Arc::new(InMemoryCustomerStatsRepository::default()),
        Arc::new(predictor),
    )
}
