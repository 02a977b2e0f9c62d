pub mod catalog;
pub mod config;
pub mod demand;
pub mod domain;
pub mod errors;
pub mod features;
pub mod insights;
pub mod prediction;
pub mod recommendation;
pub mod stats;
pub mod suggestions;
pub mod taxonomy;

mod tally;

pub use catalog::{Catalog, CatalogQuery};
pub use demand::{DemandAggregator, DemandForecast, DemandSummary, DemandTrend, GrowthEstimate};
pub use domain::cart::CartLine;
pub use domain::customer::{CustomerId, CustomerProfile};
pub use domain::order::{Order, OrderId, OrderLine};
pub use domain::product::{Product, ProductId};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use features::{CustomerFeatureBuilder, CustomerFeatures, PurchaseFrequency, Season};
pub use insights::{CategoryCount, CustomerInsights, NextPurchasePrediction};
pub use prediction::{
    CategoryProbability, PredictionError, PredictionGateway, PredictionPayload, PredictionResult,
    PredictorHealth,
};
pub use recommendation::{RecommendationAssembler, RecommendationResponse};
pub use stats::{CustomerStats, OrderCompleted};
pub use suggestions::{SuggestionFilter, SuggestionOutcome};
pub use taxonomy::CategoryTaxonomy;
