//! Store-wide demand aggregation for the admin forecast.
//!
//! Demand is aggregated per *fine* storefront category, straight from each
//! line item's product. Unlike customer features it is not coarsened through
//! the taxonomy, so restocking advice names the categories merchandisers
//! actually stock.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::domain::order::Order;
use crate::features::Season;

/// Number of top summaries surfaced as restocking hints.
pub const RESTOCK_HINT_COUNT: usize = 3;

const HIGH_DEMAND_ABOVE: u64 = 50;
const MEDIUM_DEMAND_ABOVE: u64 = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DemandTrend {
    High,
    Medium,
    Low,
}

impl DemandTrend {
    pub fn from_quantity(quantity: u64) -> Self {
        if quantity > HIGH_DEMAND_ABOVE {
            Self::High
        } else if quantity > MEDIUM_DEMAND_ABOVE {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

/// Growth projection for a category.
///
/// No time-series model exists yet, so the only value is an explicit marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthEstimate {
    #[default]
    NotImplemented,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandSummary {
    pub category: String,
    pub current_demand: u64,
    pub revenue: Decimal,
    /// Distinct orders with at least one line in the category. Two lines of
    /// one order count once, unlike a per-line count, so `avg_order_size`
    /// is units per order rather than units per line.
    pub order_count: u32,
    pub avg_order_size: Decimal,
    pub trend: DemandTrend,
    pub predicted_growth: GrowthEstimate,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandForecast {
    pub forecast: Vec<DemandSummary>,
    pub total_orders: usize,
    pub season: Season,
    pub recommendations: Vec<String>,
}

#[derive(Default)]
struct CategoryAccumulator {
    quantity: u64,
    revenue: Decimal,
    order_count: u32,
    last_order: Option<usize>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DemandAggregator;

impl DemandAggregator {
    /// Summaries ordered by descending quantity; categories with equal
    /// quantity keep the order in which they were first encountered.
    pub fn aggregate(orders: &[Order], catalog: &Catalog) -> Vec<DemandSummary> {
        let mut order_of_first_seen: Vec<String> = Vec::new();
        let mut by_category: HashMap<String, CategoryAccumulator> = HashMap::new();

        for (order_index, order) in orders.iter().enumerate() {
            for line in &order.lines {
                let Some(product) = catalog.find(&line.product_id) else {
                    continue;
                };
                let entry = by_category.entry(product.category.clone()).or_insert_with(|| {
                    order_of_first_seen.push(product.category.clone());
                    CategoryAccumulator::default()
                });
                entry.quantity += u64::from(line.quantity);
                entry.revenue += line.line_total();
                if entry.last_order != Some(order_index) {
                    entry.order_count += 1;
                    entry.last_order = Some(order_index);
                }
            }
        }

        let mut summaries: Vec<DemandSummary> = order_of_first_seen
            .into_iter()
            .filter_map(|category| {
                let accumulator = by_category.remove(&category)?;
                Some(summarize(category, accumulator))
            })
            .collect();
        summaries.sort_by(|left, right| right.current_demand.cmp(&left.current_demand));
        summaries
    }

    pub fn forecast(orders: &[Order], catalog: &Catalog) -> DemandForecast {
        Self::forecast_on(orders, catalog, Utc::now().date_naive())
    }

    pub fn forecast_on(orders: &[Order], catalog: &Catalog, today: NaiveDate) -> DemandForecast {
        let forecast = Self::aggregate(orders, catalog);
        let recommendations = Self::restock_hints(&forecast);
        DemandForecast {
            forecast,
            total_orders: orders.len(),
            season: Season::on(today),
            recommendations,
        }
    }

    /// Natural-language restocking advice for the leading categories.
    pub fn restock_hints(summaries: &[DemandSummary]) -> Vec<String> {
        summaries
            .iter()
            .take(RESTOCK_HINT_COUNT)
            .map(|summary| {
                format!(
                    "Stock up on {} - {} demand (growth forecast not yet available)",
                    summary.category,
                    summary.trend.as_str()
                )
            })
            .collect()
    }
}

fn summarize(category: String, accumulator: CategoryAccumulator) -> DemandSummary {
    let avg_order_size = if accumulator.order_count == 0 {
        Decimal::ZERO
    } else {
        Decimal::from(accumulator.quantity) / Decimal::from(accumulator.order_count)
    };

    DemandSummary {
        category,
        current_demand: accumulator.quantity,
        revenue: two_places(accumulator.revenue),
        order_count: accumulator.order_count,
        avg_order_size: two_places(avg_order_size),
        trend: DemandTrend::from_quantity(accumulator.quantity),
        predicted_growth: GrowthEstimate::NotImplemented,
    }
}

pub(crate) fn two_places(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
