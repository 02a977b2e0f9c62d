use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use storefront_core::domain::customer::{CustomerId, CustomerProfile};
use storefront_core::domain::order::{Order, OrderLine};
use storefront_core::domain::product::{Product, ProductId};

use crate::connection::DbPool;
use crate::repositories::{
    CustomerRepository, OrderRepository, ProductRepository, RepositoryError,
    SqlCustomerRepository, SqlOrderRepository, SqlProductRepository,
};

struct ProductSeed {
    id: &'static str,
    name: &'static str,
    category: &'static str,
    price: i64,
    featured: bool,
    colors: &'static [&'static str],
}

const PRODUCTS: &[ProductSeed] = &[
    ProductSeed { id: "slim-fit-jeans", name: "Slim Fit Jeans", category: "jeans", price: 79, featured: true, colors: &["Blue", "Black", "Gray"] },
    ProductSeed { id: "ripped-skinny-jeans", name: "Ripped Skinny Jeans", category: "jeans", price: 89, featured: false, colors: &["Black", "Gray"] },
    ProductSeed { id: "classic-white-tshirt", name: "Classic White T-Shirt", category: "t-shirts", price: 29, featured: true, colors: &["White", "Black", "Gray"] },
    ProductSeed { id: "graphic-print-tshirt", name: "Graphic Print T-Shirt", category: "t-shirts", price: 39, featured: false, colors: &["Black", "Navy", "White"] },
    ProductSeed { id: "v-neck-tshirt", name: "V-Neck T-Shirt", category: "t-shirts", price: 32, featured: false, colors: &["Navy", "Gray", "Burgundy"] },
    ProductSeed { id: "running-shoes", name: "Running Shoes", category: "shoes", price: 129, featured: true, colors: &["Black", "White", "Blue"] },
    ProductSeed { id: "leather-sneakers", name: "Leather Sneakers", category: "shoes", price: 159, featured: false, colors: &["White", "Black", "Brown"] },
    ProductSeed { id: "canvas-sneakers", name: "Canvas Sneakers", category: "shoes", price: 65, featured: false, colors: &["White", "Navy", "Red"] },
    ProductSeed { id: "aviator-sunglasses", name: "Aviator Sunglasses", category: "glasses", price: 149, featured: false, colors: &["Gold", "Silver", "Black"] },
    ProductSeed { id: "round-frame-glasses", name: "Round Frame Glasses", category: "glasses", price: 99, featured: true, colors: &["Black", "Tortoise", "Clear"] },
    ProductSeed { id: "leather-backpack", name: "Leather Backpack", category: "bags", price: 189, featured: false, colors: &["Brown", "Black", "Tan"] },
    ProductSeed { id: "canvas-tote-bag", name: "Canvas Tote Bag", category: "bags", price: 49, featured: false, colors: &["Beige", "Navy", "Black"] },
    ProductSeed { id: "messenger-bag", name: "Messenger Bag", category: "bags", price: 129, featured: true, colors: &["Black", "Brown", "Gray"] },
    ProductSeed { id: "leather-jacket", name: "Leather Jacket", category: "jackets", price: 299, featured: true, colors: &["Black", "Brown"] },
    ProductSeed { id: "denim-jacket", name: "Denim Jacket", category: "jackets", price: 119, featured: false, colors: &["Blue", "Black", "Light Blue"] },
    ProductSeed { id: "bomber-jacket", name: "Bomber Jacket", category: "jackets", price: 159, featured: false, colors: &["Black", "Olive", "Navy"] },
    ProductSeed { id: "business-suit", name: "Business Suit", category: "suits", price: 499, featured: false, colors: &["Charcoal", "Navy", "Black"] },
    ProductSeed { id: "slim-fit-suit", name: "Slim Fit Suit", category: "suits", price: 449, featured: true, colors: &["Navy", "Charcoal", "Black"] },
];

struct CustomerSeed {
    id: &'static str,
    name: &'static str,
    age: u32,
    gender: &'static str,
    location: &'static str,
    size: &'static str,
    subscribed: bool,
    payment: &'static str,
    shipping: &'static str,
    colors: &'static [&'static str],
    price_range_max: u32,
}

const CUSTOMERS: &[CustomerSeed] = &[
    CustomerSeed { id: "cust-admin", name: "Admin User", age: 35, gender: "Male", location: "California", size: "L", subscribed: true, payment: "Credit Card", shipping: "Express", colors: &["Black", "Gray", "Navy"], price_range_max: 500 },
    CustomerSeed { id: "cust-john", name: "John Doe", age: 28, gender: "Male", location: "New York", size: "M", subscribed: true, payment: "PayPal", shipping: "Standard", colors: &["Blue", "White", "Black"], price_range_max: 200 },
    CustomerSeed { id: "cust-jane", name: "Jane Smith", age: 32, gender: "Female", location: "Texas", size: "S", subscribed: true, payment: "Credit Card", shipping: "Express", colors: &["Pink", "White", "Beige"], price_range_max: 400 },
    CustomerSeed { id: "cust-mike", name: "Mike Johnson", age: 45, gender: "Male", location: "Florida", size: "XL", subscribed: false, payment: "Debit Card", shipping: "Free Shipping", colors: &["Brown", "Green", "Black"], price_range_max: 300 },
    CustomerSeed { id: "cust-sarah", name: "Sarah Williams", age: 26, gender: "Female", location: "Washington", size: "M", subscribed: true, payment: "Venmo", shipping: "2-Day Shipping", colors: &["Navy", "White", "Gray"], price_range_max: 600 },
    CustomerSeed { id: "cust-david", name: "David Brown", age: 38, gender: "Male", location: "Illinois", size: "L", subscribed: false, payment: "Cash", shipping: "Standard", colors: &["Black", "Red", "White"], price_range_max: 250 },
    CustomerSeed { id: "cust-emily", name: "Emily Davis", age: 29, gender: "Female", location: "Oregon", size: "S", subscribed: true, payment: "PayPal", shipping: "Express", colors: &["Purple", "Pink", "Black"], price_range_max: 350 },
    CustomerSeed { id: "cust-robert", name: "Robert Wilson", age: 52, gender: "Male", location: "Arizona", size: "XL", subscribed: false, payment: "Bank Transfer", shipping: "Free Shipping", colors: &["Charcoal", "Navy", "Black"], price_range_max: 800 },
];

/// Each entry is a customer index and `(product index, quantity)` lines.
const ORDERS: &[(usize, &[(usize, u32)])] = &[
    (1, &[(0, 2), (2, 3)]),
    (1, &[(1, 1), (3, 2)]),
    (1, &[(2, 4), (4, 1)]),
    (1, &[(0, 1), (5, 1)]),
    (1, &[(3, 3)]),
    (2, &[(5, 1), (13, 1)]),
    (2, &[(9, 1), (10, 1)]),
    (2, &[(8, 1), (11, 1)]),
    (2, &[(2, 2), (12, 1)]),
    (3, &[(14, 1), (6, 1)]),
    (3, &[(0, 2)]),
    (3, &[(15, 1)]),
    (4, &[(17, 1), (9, 1)]),
    (4, &[(2, 3), (10, 1)]),
    (4, &[(16, 1), (8, 1)]),
    (4, &[(5, 1), (11, 1)]),
    (4, &[(3, 2), (12, 1)]),
    (5, &[(5, 2)]),
    (5, &[(6, 1), (7, 1)]),
    (5, &[(5, 1), (2, 2)]),
    (6, &[(13, 1), (11, 1)]),
    (6, &[(14, 1), (2, 2)]),
    (6, &[(15, 1), (12, 1)]),
    (6, &[(9, 1), (3, 1)]),
    (7, &[(16, 1), (17, 1)]),
    (7, &[(17, 1)]),
    (7, &[(16, 1), (8, 1)]),
];

/// Orders are spread back from the anchor so the dataset covers about 80 days.
const ORDER_SPACING_DAYS: i64 = 3;

/// Demo storefront: the launch catalog, sample shoppers, and their orders.
///
/// Loading is idempotent; every row has a fixed id and is upserted.
pub struct DemoDataset;

impl DemoDataset {
    pub fn products() -> Vec<Product> {
        PRODUCTS
            .iter()
            .map(|seed| Product {
                id: ProductId(seed.id.to_string()),
                name: seed.name.to_string(),
                category: seed.category.to_string(),
                price: Decimal::from(seed.price),
                colors: seed.colors.iter().map(|color| color.to_string()).collect(),
                featured: seed.featured,
            })
            .collect()
    }

    pub fn customers() -> Vec<CustomerProfile> {
        CUSTOMERS
            .iter()
            .map(|seed| CustomerProfile {
                id: CustomerId(seed.id.to_string()),
                name: seed.name.to_string(),
                age: Some(seed.age),
                gender: Some(seed.gender.to_string()),
                location: Some(seed.location.to_string()),
                preferred_size: Some(seed.size.to_string()),
                preferred_payment_method: Some(seed.payment.to_string()),
                shipping_preference: Some(seed.shipping.to_string()),
                subscription_status: Some(if seed.subscribed { "Yes" } else { "No" }.to_string()),
                price_range_max: Some(seed.price_range_max),
                preferred_colors: seed.colors.iter().map(|color| color.to_string()).collect(),
            })
            .collect()
    }

    /// Orders priced at catalog prices, the newest placed at `anchor`.
    pub fn orders(anchor: DateTime<Utc>) -> Vec<Order> {
        let newest = ORDERS.len() as i64 - 1;
        ORDERS
            .iter()
            .enumerate()
            .map(|(index, (customer_index, lines))| {
                let lines = lines
                    .iter()
                    .map(|(product_index, quantity)| {
                        let product = &PRODUCTS[*product_index];
                        OrderLine {
                            product_id: ProductId(product.id.to_string()),
                            quantity: *quantity,
                            unit_price: Decimal::from(product.price),
                        }
                    })
                    .collect();
                let age_days = (newest - index as i64) * ORDER_SPACING_DAYS;
                Order::from_lines(
                    format!("order-{:03}", index + 1),
                    CustomerId(CUSTOMERS[*customer_index].id.to_string()),
                    lines,
                    anchor - Duration::days(age_days),
                )
            })
            .collect()
    }

    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        Self::load_at(pool, Utc::now()).await
    }

    pub async fn load_at(
        pool: &DbPool,
        anchor: DateTime<Utc>,
    ) -> Result<SeedResult, RepositoryError> {
        let customers = SqlCustomerRepository::new(pool.clone());
        let products = SqlProductRepository::new(pool.clone());
        let orders = SqlOrderRepository::new(pool.clone());

        for customer in Self::customers() {
            customers.save(customer).await?;
        }
        for product in Self::products() {
            products.save(product).await?;
        }
        let seeded_orders = Self::orders(anchor);
        let order_count = seeded_orders.len();
        for order in seeded_orders {
            orders.save(order).await?;
        }

        let result = SeedResult {
            customers: CUSTOMERS.len(),
            products: PRODUCTS.len(),
            orders: order_count,
        };
        info!(
            event_name = "db.fixtures.demo_loaded",
            customers = result.customers,
            products = result.products,
            orders = result.orders,
            "demo dataset loaded"
        );
        Ok(result)
    }

    /// Checks that every demo row is present with its expected shape.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        let customer_ids: Vec<&str> = CUSTOMERS.iter().map(|seed| seed.id).collect();
        let customer_count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(1) FROM customer WHERE id IN {}",
            sql_array_from_ids(&customer_ids)
        ))
        .fetch_one(pool)
        .await?;
        checks.push(SeedCheck::new("customers", customer_count == CUSTOMERS.len() as i64));

        let product_ids: Vec<&str> = PRODUCTS.iter().map(|seed| seed.id).collect();
        let product_count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(1) FROM product WHERE id IN {}",
            sql_array_from_ids(&product_ids)
        ))
        .fetch_one(pool)
        .await?;
        checks.push(SeedCheck::new("products", product_count == PRODUCTS.len() as i64));

        let featured_count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(1) FROM product WHERE is_featured = 1 AND id IN {}",
            sql_array_from_ids(&product_ids)
        ))
        .fetch_one(pool)
        .await?;
        let expected_featured = PRODUCTS.iter().filter(|seed| seed.featured).count() as i64;
        checks.push(SeedCheck::new("featured-products", featured_count == expected_featured));

        let order_ids = demo_order_ids();
        let order_id_refs: Vec<&str> = order_ids.iter().map(String::as_str).collect();
        let order_count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(1) FROM customer_order WHERE id IN {}",
            sql_array_from_ids(&order_id_refs)
        ))
        .fetch_one(pool)
        .await?;
        checks.push(SeedCheck::new("orders", order_count == ORDERS.len() as i64));

        let line_count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(1) FROM order_line WHERE order_id IN {}",
            sql_array_from_ids(&order_id_refs)
        ))
        .fetch_one(pool)
        .await?;
        let expected_lines: usize = ORDERS.iter().map(|(_, lines)| lines.len()).sum();
        checks.push(SeedCheck::new("order-lines", line_count == expected_lines as i64));

        let all_present = checks.iter().all(|check| check.passed);
        Ok(VerificationResult { all_present, checks })
    }

    /// Removes demo rows; stats rows cascade with their customers.
    pub async fn clean(pool: &DbPool) -> Result<(), RepositoryError> {
        let mut tx = pool.begin().await?;

        let order_ids = demo_order_ids();
        let order_id_refs: Vec<&str> = order_ids.iter().map(String::as_str).collect();
        let customer_ids: Vec<&str> = CUSTOMERS.iter().map(|seed| seed.id).collect();
        let product_ids: Vec<&str> = PRODUCTS.iter().map(|seed| seed.id).collect();

        sqlx::query(&format!(
            "DELETE FROM customer_order WHERE id IN {}",
            sql_array_from_ids(&order_id_refs)
        ))
        .execute(&mut *tx)
        .await?;
        sqlx::query(&format!(
            "DELETE FROM customer WHERE id IN {}",
            sql_array_from_ids(&customer_ids)
        ))
        .execute(&mut *tx)
        .await?;
        sqlx::query(&format!("DELETE FROM product WHERE id IN {}", sql_array_from_ids(&product_ids)))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

fn demo_order_ids() -> Vec<String> {
    (1..=ORDERS.len()).map(|number| format!("order-{number:03}")).collect()
}

fn sql_array_from_ids(ids: &[&str]) -> String {
    let quoted = ids.iter().map(|id| format!("'{id}'")).collect::<Vec<_>>().join(",");
    format!("({quoted})")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedResult {
    pub customers: usize,
    pub products: usize,
    pub orders: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedCheck {
    pub name: &'static str,
    pub passed: bool,
}

impl SeedCheck {
    fn new(name: &'static str, passed: bool) -> Self {
        Self { name, passed }
    }
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<SeedCheck>,
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use storefront_core::catalog::Catalog;
    use storefront_core::domain::customer::CustomerId;
    use storefront_core::features::CustomerFeatureBuilder;

    use super::DemoDataset;
    use crate::repositories::{OrderRepository, SqlOrderRepository};
    use crate::{connect_with_settings, migrations};

    #[test]
    fn order_totals_follow_catalog_prices() {
        let anchor = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).single().expect("anchor");
        let orders = DemoDataset::orders(anchor);

        assert_eq!(orders.len(), 27);
        assert_eq!(orders[0].id.0, "order-001");
        // 2 x Slim Fit Jeans + 3 x Classic White T-Shirt
        assert_eq!(orders[0].total_amount, Decimal::from(245));
        assert_eq!(orders[26].created_at, anchor);
        assert!(orders.iter().all(|order| order.total_amount == order.lines_total()));
    }

    #[test]
    fn every_order_line_resolves_against_the_catalog() {
        let catalog = Catalog::new(DemoDataset::products());
        let orders = DemoDataset::orders(Utc::now());

        assert!(orders
            .iter()
            .flat_map(|order| order.lines.iter())
            .all(|line| catalog.find(&line.product_id).is_some()));
    }

    #[test]
    fn john_is_a_clothing_shopper() {
        let catalog = Catalog::new(DemoDataset::products());
        let john = DemoDataset::customers()
            .into_iter()
            .find(|customer| customer.id.0 == "cust-john")
            .expect("john exists");
        let orders: Vec<_> = DemoDataset::orders(Utc::now())
            .into_iter()
            .filter(|order| order.customer_id == john.id)
            .collect();

        let features = CustomerFeatureBuilder::build(&john, &orders, &catalog);

        assert_eq!(features.previous_purchases, 5);
        assert_eq!(features.category, "Clothing");
        assert_eq!(features.location, "New York");
    }

    #[tokio::test]
    async fn load_is_idempotent_and_verifiable() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("run migrations");

        let first = DemoDataset::load(&pool).await.expect("load demo data");
        let second = DemoDataset::load(&pool).await.expect("reload demo data");
        assert_eq!(first, second);

        let verification = DemoDataset::verify(&pool).await.expect("verify");
        assert!(verification.all_present, "{:?}", verification.checks);
        assert_eq!(verification.checks.len(), 5);

        let john_orders = SqlOrderRepository::new(pool.clone())
            .list_for_customer(&CustomerId("cust-john".to_string()))
            .await
            .expect("john orders");
        assert_eq!(john_orders.len(), 5);
    }

    #[tokio::test]
    async fn clean_removes_demo_rows() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("run migrations");

        DemoDataset::load(&pool).await.expect("load demo data");
        DemoDataset::clean(&pool).await.expect("clean demo data");

        let verification = DemoDataset::verify(&pool).await.expect("verify");
        assert!(!verification.all_present);
        assert!(verification.checks.iter().all(|check| !check.passed));
    }
}
