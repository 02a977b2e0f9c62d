//! Complementary product suggestions for the current cart.

mod filter;
mod types;

pub use filter::SuggestionFilter;
pub use types::*;

/// Maximum suggestions returned for one cart.
pub const MAX_SUGGESTIONS: usize = 4;

/// Message returned when there is nothing in the cart to complement.
pub const EMPTY_CART_MESSAGE: &str = "Add items to cart for smart suggestions";

/// Message accompanying suggestions for a non-empty cart.
pub const SUGGESTIONS_MESSAGE: &str = "Customers who bought these items also liked:";
