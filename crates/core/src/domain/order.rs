use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::customer::CustomerId;
use crate::domain::product::ProductId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Unit price captured at purchase time.
    pub unit_price: Decimal,
}

impl OrderLine {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Immutable snapshot of a completed order.
///
/// `total_amount` is whatever the checkout recorded; it is not recomputed from
/// the lines when catalog prices change later.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub lines: Vec<OrderLine>,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Builds an order whose total is the sum of its lines.
    pub fn from_lines(
        id: impl Into<String>,
        customer_id: CustomerId,
        lines: Vec<OrderLine>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let total_amount = lines.iter().map(OrderLine::line_total).sum();
        Self { id: OrderId(id.into()), customer_id, lines, total_amount, created_at }
    }

    pub fn lines_total(&self) -> Decimal {
        self.lines.iter().map(OrderLine::line_total).sum()
    }
}

/// Distinct product ids referenced by any line of `orders`, sorted.
pub fn referenced_product_ids(orders: &[Order]) -> Vec<ProductId> {
    let mut ids: Vec<ProductId> = orders
        .iter()
        .flat_map(|order| order.lines.iter().map(|line| line.product_id.clone()))
        .collect();
    ids.sort_by(|left, right| left.0.cmp(&right.0));
    ids.dedup();
    ids
}
