//! Background refresh of the `customer_stats` materialized view.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use storefront_core::catalog::Catalog;
use storefront_core::domain::customer::CustomerId;
use storefront_core::domain::order::referenced_product_ids;
use storefront_core::stats::{CustomerStats, OrderCompleted};
use storefront_db::repositories::{
    CustomerStatsRepository, OrderRepository, ProductRepository, RepositoryError,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatsQueueError {
    #[error("stats refresh queue is full")]
    Full,
    #[error("stats refresh worker has stopped")]
    Closed,
}

/// Producer half handed to request handlers.
#[derive(Clone)]
pub struct StatsQueue {
    sender: mpsc::Sender<OrderCompleted>,
}

impl StatsQueue {
    /// Enqueues without waiting; a full queue is reported to the caller.
    pub fn try_enqueue(&self, event: OrderCompleted) -> Result<(), StatsQueueError> {
        self.sender.try_send(event).map_err(|error| match error {
            mpsc::error::TrySendError::Full(_) => StatsQueueError::Full,
            mpsc::error::TrySendError::Closed(_) => StatsQueueError::Closed,
        })
    }
}

#[derive(Clone)]
pub struct StatsRefresher {
    orders: Arc<dyn OrderRepository>,
    products: Arc<dyn ProductRepository>,
    stats: Arc<dyn CustomerStatsRepository>,
}

impl StatsRefresher {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        products: Arc<dyn ProductRepository>,
        stats: Arc<dyn CustomerStatsRepository>,
    ) -> Self {
        Self { orders, products, stats }
    }

    /// Recomputes one customer's snapshot from live order history.
    pub async fn refresh(
        &self,
        customer_id: &CustomerId,
    ) -> Result<CustomerStats, RepositoryError> {
        let orders = self.orders.list_for_customer(customer_id).await?;
        let product_ids = referenced_product_ids(&orders);
        let catalog = Catalog::new(self.products.find_many(&product_ids).await?);

        let snapshot = CustomerStats::compute(customer_id.clone(), &orders, &catalog, Utc::now());
        self.stats.upsert(snapshot.clone()).await?;
        Ok(snapshot)
    }

    /// Starts the worker. It drains the queue and exits once every
    /// [`StatsQueue`] clone has been dropped.
    pub fn spawn(self, capacity: usize) -> (StatsQueue, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(capacity);
        let handle = tokio::spawn(self.run(receiver));
        (StatsQueue { sender }, handle)
    }

    async fn run(self, mut receiver: mpsc::Receiver<OrderCompleted>) {
        while let Some(event) = receiver.recv().await {
            match self.refresh(&event.customer_id).await {
                Ok(snapshot) => info!(
                    event_name = "stats.refresh.completed",
                    customer_id = %event.customer_id,
                    order_count = snapshot.order_count,
                    "customer stats refreshed"
                ),
                Err(error) => warn!(
                    event_name = "stats.refresh.failed",
                    customer_id = %event.customer_id,
                    error = %error,
                    "customer stats refresh failed"
                ),
            }
        }
        info!(event_name = "stats.worker.stopped", "stats refresh worker stopped");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use storefront_core::domain::customer::CustomerId;
    use storefront_core::domain::order::{Order, OrderLine};
    use storefront_core::domain::product::{Product, ProductId};
    use storefront_core::stats::OrderCompleted;
    use storefront_db::repositories::{
        CustomerStatsRepository, InMemoryCustomerStatsRepository, InMemoryOrderRepository,
        InMemoryProductRepository, OrderRepository,
    };

    use super::{StatsQueueError, StatsRefresher};

    fn product(id: &str, category: &str) -> Product {
        Product {
            id: ProductId(id.to_string()),
            name: id.to_string(),
            category: category.to_string(),
            price: Decimal::new(50, 0),
            colors: Vec::new(),
            featured: false,
        }
    }

    async fn fixture() -> (StatsRefresher, Arc<InMemoryCustomerStatsRepository>) {
        let orders = Arc::new(InMemoryOrderRepository::default());
        let customer = CustomerId("cust-1".to_string());
        for (id, day, product_id, price) in
            [("o-1", 1, "runner", 120), ("o-2", 5, "tote", 40), ("o-3", 3, "runner", 80)]
        {
            let created_at = Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).single().expect("date");
            let line = OrderLine {
                product_id: ProductId(product_id.to_string()),
                quantity: 1,
                unit_price: Decimal::new(price, 0),
            };
            orders
                .save(Order::from_lines(id, customer.clone(), vec![line], created_at))
                .await
                .expect("save order");
        }
        let products = Arc::new(InMemoryProductRepository::with_products(vec![
            product("runner", "shoes"),
            product("tote", "bags"),
        ]));
        let stats = Arc::new(InMemoryCustomerStatsRepository::default());
        (StatsRefresher::new(orders, products, stats.clone()), stats)
    }

    #[tokio::test]
    async fn refresh_upserts_snapshot_from_order_history() {
        let (refresher, stats) = fixture().await;
        let customer = CustomerId("cust-1".to_string());

        let snapshot = refresher.refresh(&customer).await.expect("refresh");

        assert_eq!(snapshot.order_count, 3);
        assert_eq!(snapshot.total_spent, Decimal::new(24000, 2));
        assert_eq!(snapshot.average_order_value, Decimal::new(8000, 2));
        assert_eq!(snapshot.favorite_categories, vec!["shoes", "bags"]);
        assert_eq!(
            snapshot.last_purchase_at,
            Utc.with_ymd_and_hms(2026, 3, 5, 12, 0, 0).single()
        );
        let stored = stats.find(&customer).await.expect("find").expect("stored snapshot");
        assert_eq!(stored, snapshot);
    }

    #[tokio::test]
    async fn worker_drains_queue_and_stops_when_producers_drop() {
        let (refresher, stats) = fixture().await;
        let (queue, handle) = refresher.spawn(4);

        queue
            .try_enqueue(OrderCompleted { customer_id: CustomerId("cust-1".to_string()) })
            .expect("enqueue");
        drop(queue);
        handle.await.expect("worker join");

        let stored = stats
            .find(&CustomerId("cust-1".to_string()))
            .await
            .expect("find")
            .expect("snapshot written");
        assert_eq!(stored.order_count, 3);
    }

    #[tokio::test]
    async fn closed_queue_is_reported() {
        let (refresher, _) = fixture().await;
        let (queue, handle) = refresher.spawn(1);
        handle.abort();
        let _ = handle.await;

        let error = queue
            .try_enqueue(OrderCompleted { customer_id: CustomerId("cust-1".to_string()) })
            .expect_err("worker gone");

        assert_eq!(error, StatsQueueError::Closed);
    }
}
