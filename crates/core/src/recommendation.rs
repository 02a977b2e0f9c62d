use serde::{Deserialize, Serialize};

use crate::catalog::CatalogQuery;
use crate::domain::product::Product;
use crate::prediction::PredictionResult;
use crate::taxonomy::CategoryTaxonomy;

/// Maximum number of products returned with a recommendation.
pub const RECOMMENDATION_LIMIT: usize = 8;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub prediction: PredictionResult,
    pub products: Vec<Product>,
    pub message: String,
}

/// Turns a prediction into a storefront catalog query and a customer message.
#[derive(Clone, Copy, Debug, Default)]
pub struct RecommendationAssembler;

impl RecommendationAssembler {
    /// Catalog query covering every fine category behind the predicted
    /// top categories, featured products first.
    pub fn plan(prediction: &PredictionResult) -> CatalogQuery {
        let categories = CategoryTaxonomy::expand(
            prediction.top_categories.iter().map(|entry| entry.category.as_str()),
        );
        CatalogQuery { categories, featured_first: true, limit: RECOMMENDATION_LIMIT }
    }

    /// An empty product list is a valid outcome; no fallback query is tried.
    pub fn assemble(prediction: PredictionResult, mut products: Vec<Product>) -> RecommendationResponse {
        products.truncate(RECOMMENDATION_LIMIT);
        let message = Self::message(prediction.predicted_amount);
        RecommendationResponse { prediction, products, message }
    }

    pub fn message(predicted_amount: f64) -> String {
        format!("Based on your profile, we predict you'll spend around ${predicted_amount}")
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::catalog::Catalog;
    use crate::domain::product::{Product, ProductId};
    use crate::prediction::{CategoryProbability, PredictionResult};

    use super::{RecommendationAssembler, RECOMMENDATION_LIMIT};

    fn prediction(top: &[(&str, f64)]) -> PredictionResult {
        PredictionResult {
            predicted_amount: 63.5,
            predicted_category: "Footwear".to_string(),
            customer_segment: "Regular".to_string(),
            top_categories: top
                .iter()
                .map(|(category, probability)| CategoryProbability {
                    category: category.to_string(),
                    probability: *probability,
                })
                .collect(),
        }
    }

    fn product(id: &str, category: &str, featured: bool) -> Product {
        Product {
            id: ProductId(id.to_string()),
            name: id.to_string(),
            category: category.to_string(),
            price: Decimal::new(99, 0),
            colors: Vec::new(),
            featured,
        }
    }

    #[test]
    fn footwear_prediction_queries_only_shoes() {
        let query = RecommendationAssembler::plan(&prediction(&[("Footwear", 80.0)]));

        assert_eq!(query.categories, vec!["shoes"]);
        assert_eq!(query.limit, 8);
        assert!(query.featured_first);
    }

    #[test]
    fn footwear_query_returns_featured_shoes_first_and_caps_at_eight() {
        let mut products = vec![product("jacket", "jackets", true)];
        for n in 0..10 {
            products.push(product(&format!("shoe-{n}"), "shoes", n == 7));
        }
        let catalog = Catalog::new(products);

        let query = RecommendationAssembler::plan(&prediction(&[("Footwear", 80.0)]));
        let found = catalog.query(&query);

        assert_eq!(found.len(), RECOMMENDATION_LIMIT);
        assert_eq!(found[0].id.0, "shoe-7");
        assert!(found.iter().all(|product| product.category == "shoes"));
    }

    #[test]
    fn plan_flattens_all_top_categories_with_duplicates() {
        let query = RecommendationAssembler::plan(&prediction(&[
            ("Clothing", 45.0),
            ("Mystery", 30.0),
            ("Accessories", 25.0),
        ]));

        assert_eq!(query.categories, vec!["jeans", "t-shirts", "jeans", "glasses", "bags"]);
    }

    #[test]
    fn assemble_embeds_predicted_amount_in_message() {
        let response = RecommendationAssembler::assemble(prediction(&[("Footwear", 80.0)]), vec![]);

        assert!(response.products.is_empty());
        assert_eq!(
            response.message,
            "Based on your profile, we predict you'll spend around $63.5"
        );
    }

    #[test]
    fn whole_amounts_render_without_decimal_point() {
        assert_eq!(
            RecommendationAssembler::message(64.0),
            "Based on your profile, we predict you'll spend around $64"
        );
    }
}
