use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::demand::two_places;
use crate::domain::customer::CustomerId;
use crate::domain::order::Order;
use crate::insights::{top_categories, TOP_CATEGORY_COUNT};

/// Signals that a customer's order history changed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCompleted {
    pub customer_id: CustomerId,
}

/// Cached summary of a customer's purchasing behaviour.
///
/// This is a materialized view refreshed after order completion. It is never
/// read by the feature builder, which always works from live order history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerStats {
    pub customer_id: CustomerId,
    pub order_count: u32,
    pub total_spent: Decimal,
    pub average_order_value: Decimal,
    pub last_purchase_at: Option<DateTime<Utc>>,
    pub favorite_categories: Vec<String>,
    pub refreshed_at: DateTime<Utc>,
}

impl CustomerStats {
    pub fn compute(
        customer_id: CustomerId,
        orders: &[Order],
        catalog: &Catalog,
        refreshed_at: DateTime<Utc>,
    ) -> Self {
        let total_spent: Decimal = orders.iter().map(|order| order.total_amount).sum();
        let average_order_value = if orders.is_empty() {
            Decimal::ZERO
        } else {
            total_spent / Decimal::from(orders.len())
        };

        Self {
            customer_id,
            order_count: u32::try_from(orders.len()).unwrap_or(u32::MAX),
            total_spent: two_places(total_spent),
            average_order_value: two_places(average_order_value),
            last_purchase_at: orders.iter().map(|order| order.created_at).max(),
            favorite_categories: top_categories(orders, catalog, TOP_CATEGORY_COUNT)
                .into_iter()
                .map(|entry| entry.category)
                .collect(),
            refreshed_at,
        }
    }
}
