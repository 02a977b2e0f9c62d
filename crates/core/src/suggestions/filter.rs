//! Suggestion filter implementation

use std::collections::HashSet;

use rust_decimal::Decimal;

use super::types::SuggestionOutcome;
use super::{EMPTY_CART_MESSAGE, MAX_SUGGESTIONS, SUGGESTIONS_MESSAGE};
use crate::demand::two_places;
use crate::domain::cart::CartLine;
use crate::domain::product::Product;

/// Picks featured products from categories the cart does not already cover.
#[derive(Clone, Copy, Debug, Default)]
pub struct SuggestionFilter;

impl SuggestionFilter {
    pub fn suggest(cart: &[CartLine], catalog: &[Product]) -> SuggestionOutcome {
        if cart.is_empty() {
            return SuggestionOutcome::EmptyCart {
                suggestions: Vec::new(),
                message: EMPTY_CART_MESSAGE.to_string(),
            };
        }

        let cart_categories: HashSet<&str> =
            cart.iter().map(|line| line.product.category.as_str()).collect();

        let suggestions = catalog
            .iter()
            .filter(|product| product.featured)
            .filter(|product| !cart_categories.contains(product.category.as_str()))
            .take(MAX_SUGGESTIONS)
            .cloned()
            .collect();

        let cart_value: Decimal = cart.iter().map(CartLine::line_value).sum();

        SuggestionOutcome::Suggestions {
            suggestions,
            message: SUGGESTIONS_MESSAGE.to_string(),
            cart_value: two_places(cart_value),
        }
    }
}
