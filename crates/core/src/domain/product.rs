use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Fine (storefront) category, e.g. `jeans`.
    pub category: String,
    pub price: Decimal,
    #[serde(default)]
    pub colors: Vec<String>,
    pub featured: bool,
}
