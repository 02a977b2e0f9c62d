//! Category reconciliation between the storefront and the prediction service.
//!
//! The storefront sells products in *fine* categories (`jeans`, `shoes`, ...)
//! while the predictor reasons about *coarse* categories (`Clothing`,
//! `Footwear`, ...). Both directions are closed, hand-maintained tables. The
//! inverse table is declared on its own and must never be derived from the
//! forward one: additions to one side are not automatically mirrored.

/// Coarse category reported for fine categories the table does not know.
pub const FALLBACK_COARSE_CATEGORY: &str = "Clothing";

/// Fine categories queried for coarse labels the table does not know.
pub const FALLBACK_FINE_CATEGORIES: &[&str] = &["jeans"];

const FINE_TO_COARSE: &[(&str, &str)] = &[
    ("jeans", "Clothing"),
    ("t-shirts", "Clothing"),
    ("shoes", "Footwear"),
    ("glasses", "Accessories"),
    ("bags", "Accessories"),
    ("jackets", "Outerwear"),
    ("suits", "Outerwear"),
];

const COARSE_TO_FINE: &[(&str, &[&str])] = &[
    ("Clothing", &["jeans", "t-shirts"]),
    ("Footwear", &["shoes"]),
    ("Accessories", &["glasses", "bags"]),
    ("Outerwear", &["jackets", "suits"]),
];

#[derive(Clone, Copy, Debug, Default)]
pub struct CategoryTaxonomy;

impl CategoryTaxonomy {
    /// Maps a fine storefront category onto the predictor taxonomy.
    pub fn to_coarse(fine: &str) -> &'static str {
        FINE_TO_COARSE
            .iter()
            .find(|(candidate, _)| *candidate == fine)
            .map(|(_, coarse)| *coarse)
            .unwrap_or(FALLBACK_COARSE_CATEGORY)
    }

    /// Maps a predictor category back onto the storefront categories it covers.
    pub fn to_fine(coarse: &str) -> &'static [&'static str] {
        COARSE_TO_FINE
            .iter()
            .find(|(candidate, _)| *candidate == coarse)
            .map(|(_, fine)| *fine)
            .unwrap_or(FALLBACK_FINE_CATEGORIES)
    }

    /// Expands a sequence of coarse labels and flattens the result.
    ///
    /// Duplicates are kept: two coarse labels that share a fallback both
    /// contribute their fine categories.
    pub fn expand<'a, I>(coarse: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        coarse
            .into_iter()
            .flat_map(|label| Self::to_fine(label).iter().map(|fine| (*fine).to_string()))
            .collect()
    }
}
