//! Types for the suggestion filter

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::Product;

/// Result of filtering a cart into complementary suggestions.
///
/// An empty cart and a cart with no complementary featured products are
/// different outcomes and serialize with different `status` tags.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SuggestionOutcome {
    /// Nothing in the cart to base suggestions on
    EmptyCart { suggestions: Vec<Product>, message: String },
    /// Suggestions computed for a non-empty cart (may still be empty)
    Suggestions { suggestions: Vec<Product>, message: String, cart_value: Decimal },
}

impl SuggestionOutcome {
    pub fn suggestions(&self) -> &[Product] {
        match self {
            Self::EmptyCart { suggestions, .. } | Self::Suggestions { suggestions, .. } => {
                suggestions
            }
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::EmptyCart { message, .. } | Self::Suggestions { message, .. } => message,
        }
    }

    pub fn is_empty_cart(&self) -> bool {
        matches!(self, Self::EmptyCart { .. })
    }
}
