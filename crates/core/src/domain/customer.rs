use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub String);

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Demographic and preference fields owned by the customer profile store.
///
/// Every attribute is optional. Blank strings and zero numbers are treated the
/// same as absent values when features are derived.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub id: CustomerId,
    pub name: String,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub location: Option<String>,
    pub preferred_size: Option<String>,
    pub preferred_payment_method: Option<String>,
    pub shipping_preference: Option<String>,
    pub subscription_status: Option<String>,
    pub price_range_max: Option<u32>,
    #[serde(default)]
    pub preferred_colors: Vec<String>,
}

impl CustomerProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: CustomerId(id.into()), name: name.into(), ..Self::default() }
    }

    /// First declared preferred color that is not blank.
    pub fn first_preferred_color(&self) -> Option<&str> {
        self.preferred_colors.iter().map(|color| color.trim()).find(|color| !color.is_empty())
    }
}
