//! Customer feature derivation.
//!
//! Turns a customer profile plus order history into the flat record the
//! prediction service scores. The record is recomputed on every request and
//! never persisted from here.

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::Catalog;
use crate::domain::customer::CustomerProfile;
use crate::domain::order::Order;
use crate::tally::Tally;
use crate::taxonomy::{CategoryTaxonomy, FALLBACK_COARSE_CATEGORY};

pub const DEFAULT_AGE: u32 = 30;
pub const DEFAULT_GENDER: &str = "Male";
pub const DEFAULT_LOCATION: &str = "California";
pub const DEFAULT_SIZE: &str = "M";
pub const DEFAULT_PAYMENT_METHOD: &str = "Credit Card";
pub const DEFAULT_SHIPPING_TYPE: &str = "Standard";
pub const DEFAULT_SUBSCRIPTION_STATUS: &str = "No";
pub const DEFAULT_PREFERRED_COLOR: &str = "Black";
pub const DEFAULT_PRICE_RANGE_MAX: u32 = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    /// Season for a calendar month (1 = January).
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Self::Spring,
            6..=8 => Self::Summer,
            9..=11 => Self::Fall,
            _ => Self::Winter,
        }
    }

    pub fn on(date: NaiveDate) -> Self {
        Self::from_month(date.month())
    }

    pub fn current() -> Self {
        Self::on(Utc::now().date_naive())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Fall => "Fall",
            Self::Winter => "Winter",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurchaseFrequency {
    Weekly,
    #[serde(rename = "Bi-Weekly")]
    BiWeekly,
    Monthly,
    Quarterly,
    Annually,
}

impl PurchaseFrequency {
    pub fn from_order_count(order_count: usize) -> Self {
        match order_count {
            0 => Self::Annually,
            count if count >= 20 => Self::Weekly,
            count if count >= 10 => Self::BiWeekly,
            count if count >= 5 => Self::Monthly,
            _ => Self::Quarterly,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "Weekly",
            Self::BiWeekly => "Bi-Weekly",
            Self::Monthly => "Monthly",
            Self::Quarterly => "Quarterly",
            Self::Annually => "Annually",
        }
    }
}

/// Fixed-schema feature record consumed by the prediction service.
///
/// Field names here are ordinary identifiers; the wire labels the predictor
/// expects are applied by [`crate::prediction::PredictionPayload`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerFeatures {
    pub age: u32,
    pub gender: String,
    pub location: String,
    /// Coarse category with the largest purchased quantity.
    pub category: String,
    pub size: String,
    pub season: Season,
    pub subscription_status: String,
    pub previous_purchases: u32,
    pub frequency_of_purchases: PurchaseFrequency,
    pub payment_method: String,
    pub shipping_type: String,
    pub total_spent: i64,
    pub avg_order_value: i64,
    pub preferred_color: String,
    pub price_range_max: u32,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CustomerFeatureBuilder;

impl CustomerFeatureBuilder {
    /// Derives features using today's date for the season.
    pub fn build(profile: &CustomerProfile, orders: &[Order], catalog: &Catalog) -> CustomerFeatures {
        Self::build_on(profile, orders, catalog, Utc::now().date_naive())
    }

    /// Derives features as of `today`.
    ///
    /// Line items whose product no longer resolves in `catalog` are left out
    /// of the category and color tallies; the order still counts toward
    /// purchase count and spend.
    pub fn build_on(
        profile: &CustomerProfile,
        orders: &[Order],
        catalog: &Catalog,
        today: NaiveDate,
    ) -> CustomerFeatures {
        let mut categories: Tally<&'static str> = Tally::default();
        let mut colors: Tally<String> = Tally::default();
        let mut skipped_lines = 0usize;

        for order in orders {
            for line in &order.lines {
                let Some(product) = catalog.find(&line.product_id) else {
                    skipped_lines += 1;
                    continue;
                };
                categories.add(CategoryTaxonomy::to_coarse(&product.category), u64::from(line.quantity));
                for color in &product.colors {
                    colors.add(color.clone(), 1);
                }
            }
        }

        if skipped_lines > 0 {
            debug!(
                event_name = "features.build.unresolved_lines",
                customer_id = %profile.id,
                skipped_lines,
                "skipped order lines whose product could not be resolved"
            );
        }

        let total_spent: Decimal = orders.iter().map(|order| order.total_amount).sum();
        let avg_order_value = if orders.is_empty() {
            Decimal::ZERO
        } else {
            total_spent / Decimal::from(orders.len())
        };

        let category = categories.leader().copied().unwrap_or(FALLBACK_COARSE_CATEGORY).to_string();
        let preferred_color = colors
            .leader()
            .cloned()
            .or_else(|| profile.first_preferred_color().map(str::to_string))
            .unwrap_or_else(|| DEFAULT_PREFERRED_COLOR.to_string());

        CustomerFeatures {
            age: profile.age.filter(|age| *age > 0).unwrap_or(DEFAULT_AGE),
            gender: text_or(&profile.gender, DEFAULT_GENDER),
            location: text_or(&profile.location, DEFAULT_LOCATION),
            category,
            size: text_or(&profile.preferred_size, DEFAULT_SIZE),
            season: Season::on(today),
            subscription_status: text_or(&profile.subscription_status, DEFAULT_SUBSCRIPTION_STATUS),
            previous_purchases: u32::try_from(orders.len()).unwrap_or(u32::MAX),
            frequency_of_purchases: PurchaseFrequency::from_order_count(orders.len()),
            payment_method: text_or(&profile.preferred_payment_method, DEFAULT_PAYMENT_METHOD),
            shipping_type: text_or(&profile.shipping_preference, DEFAULT_SHIPPING_TYPE),
            total_spent: round_whole(total_spent),
            avg_order_value: round_whole(avg_order_value),
            preferred_color,
            price_range_max: profile
                .price_range_max
                .filter(|max| *max > 0)
                .unwrap_or(DEFAULT_PRICE_RANGE_MAX),
        }
    }
}

fn text_or(value: &Option<String>, default: &str) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Rounds to the nearest whole unit, halves away from zero.
pub(crate) fn round_whole(amount: Decimal) -> i64 {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero).to_i64().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;

    use crate::catalog::Catalog;
    use crate::domain::customer::{CustomerId, CustomerProfile};
    use crate::domain::order::{Order, OrderId, OrderLine};
    use crate::domain::product::{Product, ProductId};

    use super::{CustomerFeatureBuilder, PurchaseFrequency, Season};

    fn product(id: &str, category: &str, colors: &[&str]) -> Product {
        Product {
            id: ProductId(id.to_string()),
            name: id.to_string(),
            category: category.to_string(),
            price: Decimal::new(50, 0),
            colors: colors.iter().map(|color| color.to_string()).collect(),
            featured: false,
        }
    }

    fn order(id: &str, lines: &[(&str, u32)], total: i64) -> Order {
        Order {
            id: OrderId(id.to_string()),
            customer_id: CustomerId("cust-1".to_string()),
            lines: lines
                .iter()
                .map(|(product_id, quantity)| OrderLine {
                    product_id: ProductId(product_id.to_string()),
                    quantity: *quantity,
                    unit_price: Decimal::new(10, 0),
                })
                .collect(),
            total_amount: Decimal::new(total, 0),
            created_at: Utc.with_ymd_and_hms(2026, 4, 2, 10, 0, 0).single().expect("timestamp"),
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            product("jeans-slim", "jeans", &["Blue", "Black"]),
            product("runner", "shoes", &["White", "Blue"]),
            product("tote", "bags", &[]),
            product("bomber", "jackets", &["Olive"]),
        ])
    }

    fn july() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 7, 15).expect("date")
    }

    #[test]
    fn zero_orders_produce_fully_defaulted_record() {
        let profile = CustomerProfile::new("cust-1", "New Customer");

        let features = CustomerFeatureBuilder::build_on(&profile, &[], &catalog(), july());

        assert_eq!(features.previous_purchases, 0);
        assert_eq!(features.frequency_of_purchases, PurchaseFrequency::Annually);
        assert_eq!(features.total_spent, 0);
        assert_eq!(features.avg_order_value, 0);
        assert_eq!(features.category, "Clothing");
        assert_eq!(features.age, 30);
        assert_eq!(features.gender, "Male");
        assert_eq!(features.location, "California");
        assert_eq!(features.size, "M");
        assert_eq!(features.payment_method, "Credit Card");
        assert_eq!(features.shipping_type, "Standard");
        assert_eq!(features.subscription_status, "No");
        assert_eq!(features.preferred_color, "Black");
        assert_eq!(features.price_range_max, 500);
        assert_eq!(features.season, Season::Summer);
    }

    #[test]
    fn category_uses_coarse_mapping_of_largest_quantity() {
        let profile = CustomerProfile::new("cust-1", "Jane");
        let orders = vec![order("o-1", &[("jeans-slim", 3)], 30), order("o-2", &[("runner", 2)], 20)];

        let features = CustomerFeatureBuilder::build_on(&profile, &orders, &catalog(), july());

        assert_eq!(features.category, "Clothing");
    }

    #[test]
    fn category_tie_goes_to_first_encountered_coarse_category() {
        let profile = CustomerProfile::new("cust-1", "Jane");
        let orders = vec![order("o-1", &[("runner", 2)], 20), order("o-2", &[("tote", 2)], 20)];

        let features = CustomerFeatureBuilder::build_on(&profile, &orders, &catalog(), july());

        assert_eq!(features.category, "Footwear");
    }

    #[test]
    fn average_order_value_is_exact_for_even_totals() {
        let profile = CustomerProfile::new("cust-1", "Jane");
        let orders = vec![order("o-1", &[], 100), order("o-2", &[], 300)];

        let features = CustomerFeatureBuilder::build_on(&profile, &orders, &catalog(), july());

        assert_eq!(features.total_spent, 400);
        assert_eq!(features.avg_order_value, 200);
    }

    #[test]
    fn rounding_applies_only_to_reported_values() {
        let profile = CustomerProfile::new("cust-1", "Jane");
        let mut first = order("o-1", &[], 0);
        first.total_amount = Decimal::new(1004, 1);
        let mut second = order("o-2", &[], 0);
        second.total_amount = Decimal::new(1004, 1);

        let features =
            CustomerFeatureBuilder::build_on(&profile, &[first, second], &catalog(), july());

        // 100.4 + 100.4 = 200.8 rounds to 201; rounding each order first would give 200.
        assert_eq!(features.total_spent, 201);
        assert_eq!(features.avg_order_value, 100);
    }

    #[test]
    fn preferred_color_counts_one_per_line_and_breaks_ties_by_first_seen() {
        let profile = CustomerProfile::new("cust-1", "Jane");
        let orders = vec![order("o-1", &[("jeans-slim", 5)], 50), order("o-2", &[("runner", 1)], 10)];

        let features = CustomerFeatureBuilder::build_on(&profile, &orders, &catalog(), july());

        // Blue appears on both lines; Black and White once each.
        assert_eq!(features.preferred_color, "Blue");

        let orders = vec![order("o-1", &[("bomber", 1)], 50), order("o-2", &[("jeans-slim", 1)], 10)];
        let features = CustomerFeatureBuilder::build_on(&profile, &orders, &catalog(), july());
        assert_eq!(features.preferred_color, "Olive");
    }

    #[test]
    fn preferred_color_falls_back_to_declared_preference() {
        let mut profile = CustomerProfile::new("cust-1", "Jane");
        profile.preferred_colors = vec!["Navy".to_string()];
        let orders = vec![order("o-1", &[("tote", 1)], 49)];

        let features = CustomerFeatureBuilder::build_on(&profile, &orders, &catalog(), july());

        assert_eq!(features.preferred_color, "Navy");
    }

    #[test]
    fn unresolvable_lines_are_skipped_without_failing() {
        let profile = CustomerProfile::new("cust-1", "Jane");
        let orders = vec![order("o-1", &[("discontinued", 9), ("runner", 1)], 100)];

        let features = CustomerFeatureBuilder::build_on(&profile, &orders, &catalog(), july());

        assert_eq!(features.category, "Footwear");
        assert_eq!(features.previous_purchases, 1);
        assert_eq!(features.total_spent, 100);
    }

    #[test]
    fn declared_profile_values_override_defaults_and_blank_values_do_not() {
        let profile = CustomerProfile {
            id: CustomerId("cust-9".to_string()),
            name: "John".to_string(),
            age: Some(28),
            gender: Some("   ".to_string()),
            location: Some("New York".to_string()),
            preferred_size: Some("L".to_string()),
            preferred_payment_method: Some("PayPal".to_string()),
            shipping_preference: Some("Express".to_string()),
            subscription_status: Some("Yes".to_string()),
            price_range_max: Some(0),
            preferred_colors: Vec::new(),
        };

        let features = CustomerFeatureBuilder::build_on(&profile, &[], &catalog(), july());

        assert_eq!(features.age, 28);
        assert_eq!(features.gender, "Male");
        assert_eq!(features.location, "New York");
        assert_eq!(features.size, "L");
        assert_eq!(features.payment_method, "PayPal");
        assert_eq!(features.shipping_type, "Express");
        assert_eq!(features.subscription_status, "Yes");
        assert_eq!(features.price_range_max, 500);
    }

    #[test]
    fn frequency_thresholds_are_inclusive_lower_bounds() {
        assert_eq!(PurchaseFrequency::from_order_count(0), PurchaseFrequency::Annually);
        assert_eq!(PurchaseFrequency::from_order_count(1), PurchaseFrequency::Quarterly);
        assert_eq!(PurchaseFrequency::from_order_count(4), PurchaseFrequency::Quarterly);
        assert_eq!(PurchaseFrequency::from_order_count(5), PurchaseFrequency::Monthly);
        assert_eq!(PurchaseFrequency::from_order_count(10), PurchaseFrequency::BiWeekly);
        assert_eq!(PurchaseFrequency::from_order_count(19), PurchaseFrequency::BiWeekly);
        assert_eq!(PurchaseFrequency::from_order_count(20), PurchaseFrequency::Weekly);
    }

    #[test]
    fn season_follows_calendar_month() {
        let seasons: Vec<Season> = (1..=12).map(Season::from_month).collect();
        assert_eq!(
            seasons,
            vec![
                Season::Winter,
                Season::Winter,
                Season::Spring,
                Season::Spring,
                Season::Spring,
                Season::Summer,
                Season::Summer,
                Season::Summer,
                Season::Fall,
                Season::Fall,
                Season::Fall,
                Season::Winter,
            ]
        );
    }
}
