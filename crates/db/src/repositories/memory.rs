use std::collections::HashMap;

use tokio::sync::RwLock;

use storefront_core::catalog::{Catalog, CatalogQuery};
use storefront_core::domain::customer::{CustomerId, CustomerProfile};
use storefront_core::domain::order::Order;
use storefront_core::domain::product::{Product, ProductId};
use storefront_core::stats::CustomerStats;

use super::{
    CustomerRepository, CustomerStatsRepository, OrderRepository, ProductRepository,
    RepositoryError,
};

#[derive(Default)]
pub struct InMemoryCustomerRepository {
    customers: RwLock<HashMap<String, CustomerProfile>>,
}

#[async_trait::async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<CustomerProfile>, RepositoryError> {
        let customers = self.customers.read().await;
        Ok(customers.get(&id.0).cloned())
    }

    async fn save(&self, customer: CustomerProfile) -> Result<(), RepositoryError> {
        let mut customers = self.customers.write().await;
        customers.insert(customer.id.0.clone(), customer);
        Ok(())
    }
}

/// Keeps insertion order so featured-first queries match the SQL store.
#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<Vec<Product>>,
}

impl InMemoryProductRepository {
    pub fn with_products(products: Vec<Product>) -> Self {
        Self { products: RwLock::new(products) }
    }
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.iter().find(|product| &product.id == id).cloned())
    }

    async fn find_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.iter().filter(|product| ids.contains(&product.id)).cloned().collect())
    }

    async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.products.read().await.clone())
    }

    async fn query(&self, query: &CatalogQuery) -> Result<Vec<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(Catalog::new(products.clone()).query(query))
    }

    async fn save(&self, product: Product) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        match products.iter_mut().find(|existing| existing.id == product.id) {
            Some(existing) => *existing = product,
            None => products.push(product),
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<Vec<Order>>,
}

#[async_trait::async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn list_for_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<Order>, RepositoryError> {
        let orders = self.orders.read().await;
        let mut matching: Vec<Order> =
            orders.iter().filter(|order| &order.customer_id == customer_id).cloned().collect();
        matching.sort_by(|left, right| {
            left.created_at.cmp(&right.created_at).then_with(|| left.id.0.cmp(&right.id.0))
        });
        Ok(matching)
    }

    async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let mut orders = self.orders.read().await.clone();
        orders.sort_by(|left, right| {
            left.created_at.cmp(&right.created_at).then_with(|| left.id.0.cmp(&right.id.0))
        });
        Ok(orders)
    }

    async fn save(&self, order: Order) -> Result<(), RepositoryError> {
        let mut orders = self.orders.write().await;
        match orders.iter_mut().find(|existing| existing.id == order.id) {
            Some(existing) => *existing = order,
            None => orders.push(order),
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryCustomerStatsRepository {
    stats: RwLock<HashMap<String, CustomerStats>>,
}

#[async_trait::async_trait]
impl CustomerStatsRepository for InMemoryCustomerStatsRepository {
    async fn find(&self, customer_id: &CustomerId) -> Result<Option<CustomerStats>, RepositoryError> {
        let stats = self.stats.read().await;
        Ok(stats.get(&customer_id.0).cloned())
    }

    async fn upsert(&self, stats: CustomerStats) -> Result<(), RepositoryError> {
        let mut all = self.stats.write().await;
        all.insert(stats.customer_id.0.clone(), stats);
        Ok(())
    }
}
