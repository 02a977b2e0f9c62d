//! Request orchestration: loads customer data, runs the core pipeline and
//! calls the predictor.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use storefront_core::catalog::Catalog;
use storefront_core::demand::{DemandAggregator, DemandForecast};
use storefront_core::domain::cart::CartLine;
use storefront_core::domain::customer::{CustomerId, CustomerProfile};
use storefront_core::domain::order::{referenced_product_ids, Order};
use storefront_core::domain::product::ProductId;
use storefront_core::errors::{ApplicationError, DomainError};
use storefront_core::features::CustomerFeatureBuilder;
use storefront_core::insights::CustomerInsights;
use storefront_core::prediction::PredictionGateway;
use storefront_core::recommendation::{RecommendationAssembler, RecommendationResponse};
use storefront_core::stats::CustomerStats;
use storefront_core::suggestions::{SuggestionFilter, SuggestionOutcome};
use storefront_db::repositories::{
    CustomerRepository, CustomerStatsRepository, OrderRepository, ProductRepository,
    RepositoryError,
};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CartItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

#[derive(Clone)]
pub struct StorefrontService {
    customers: Arc<dyn CustomerRepository>,
    products: Arc<dyn ProductRepository>,
    orders: Arc<dyn OrderRepository>,
    stats: Arc<dyn CustomerStatsRepository>,
    predictor: Arc<dyn PredictionGateway>,
}

fn persistence(error: RepositoryError) -> ApplicationError {
    ApplicationError::Persistence(error.to_string())
}

impl StorefrontService {
    pub fn new(
        customers: Arc<dyn CustomerRepository>,
        products: Arc<dyn ProductRepository>,
        orders: Arc<dyn OrderRepository>,
        stats: Arc<dyn CustomerStatsRepository>,
        predictor: Arc<dyn PredictionGateway>,
    ) -> Self {
        Self { customers, products, orders, stats, predictor }
    }

    pub fn predictor(&self) -> Arc<dyn PredictionGateway> {
        self.predictor.clone()
    }

    /// Prediction plus matching catalog products. Fails when the predictor
    /// cannot be reached.
    pub async fn recommendations(
        &self,
        customer_id: &CustomerId,
    ) -> Result<RecommendationResponse, ApplicationError> {
        let profile = self.load_customer(customer_id).await?;
        let orders = self.orders.list_for_customer(customer_id).await.map_err(persistence)?;
        let catalog = self.catalog_for(&orders).await?;

        let features = CustomerFeatureBuilder::build(&profile, &orders, &catalog);
        let prediction = self.predictor.predict(&features).await?;

        let query = RecommendationAssembler::plan(&prediction);
        let products = self.products.query(&query).await.map_err(persistence)?;
        info!(
            event_name = "recommendations.assembled",
            customer_id = %customer_id,
            predicted_category = %prediction.predicted_category,
            product_count = products.len(),
            "recommendations assembled"
        );
        Ok(RecommendationAssembler::assemble(prediction, products))
    }

    /// Order-derived insights. The prediction part is left empty when the
    /// predictor fails.
    pub async fn insights(
        &self,
        customer_id: &CustomerId,
    ) -> Result<CustomerInsights, ApplicationError> {
        let profile = self.load_customer(customer_id).await?;
        let orders = self.orders.list_for_customer(customer_id).await.map_err(persistence)?;
        let catalog = self.catalog_for(&orders).await?;

        let insights = CustomerInsights::compute(&orders, &catalog);
        let features = CustomerFeatureBuilder::build(&profile, &orders, &catalog);
        match self.predictor.predict(&features).await {
            Ok(prediction) => Ok(insights.with_prediction(prediction)),
            Err(error) => {
                warn!(
                    event_name = "insights.prediction.degraded",
                    customer_id = %customer_id,
                    error = %error,
                    "serving insights without prediction"
                );
                Ok(insights)
            }
        }
    }

    /// Cart complements drawn from the featured catalog. Unknown product ids
    /// in the cart are skipped.
    pub async fn suggestions(
        &self,
        customer_id: &CustomerId,
        items: &[CartItemRequest],
    ) -> Result<SuggestionOutcome, ApplicationError> {
        self.load_customer(customer_id).await?;
        if let Some(item) = items.iter().find(|item| item.quantity == 0) {
            return Err(DomainError::InvariantViolation(format!(
                "cart quantity for `{}` must be positive",
                item.product_id.0
            ))
            .into());
        }

        let ids: Vec<ProductId> = items.iter().map(|item| item.product_id.clone()).collect();
        let resolved = self.products.find_many(&ids).await.map_err(persistence)?;
        let by_id: HashMap<&ProductId, _> =
            resolved.iter().map(|product| (&product.id, product)).collect();
        let cart: Vec<CartLine> = items
            .iter()
            .filter_map(|item| {
                by_id.get(&item.product_id).map(|product| CartLine {
                    product: (*product).clone(),
                    quantity: item.quantity,
                })
            })
            .collect();

        let catalog = self.products.list_all().await.map_err(persistence)?;
        Ok(SuggestionFilter::suggest(&cart, &catalog))
    }

    pub async fn forecast(&self) -> Result<DemandForecast, ApplicationError> {
        let orders = self.orders.list_all().await.map_err(persistence)?;
        let catalog = Catalog::new(self.products.list_all().await.map_err(persistence)?);
        Ok(DemandAggregator::forecast(&orders, &catalog))
    }

    /// Cached stats snapshot, `None` until the first refresh has run.
    pub async fn stats(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Option<CustomerStats>, ApplicationError> {
        self.load_customer(customer_id).await?;
        self.stats.find(customer_id).await.map_err(persistence)
    }

    pub async fn load_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<CustomerProfile, ApplicationError> {
        self.customers
            .find_by_id(customer_id)
            .await
            .map_err(persistence)?
            .ok_or_else(|| DomainError::CustomerNotFound(customer_id.clone()).into())
    }

    async fn catalog_for(&self, orders: &[Order]) -> Result<Catalog, ApplicationError> {
        let ids = referenced_product_ids(orders);
        let products = self.products.find_many(&ids).await.map_err(persistence)?;
        Ok(Catalog::new(products))
    }
}
