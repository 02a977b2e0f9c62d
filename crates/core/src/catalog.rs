use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::product::{Product, ProductId};

/// Category-membership query against the product store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogQuery {
    /// Fine categories to match. May contain duplicates.
    pub categories: Vec<String>,
    pub featured_first: bool,
    pub limit: usize,
}

impl CatalogQuery {
    /// Categories with duplicates removed, first occurrence order kept.
    pub fn distinct_categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.categories
            .iter()
            .map(String::as_str)
            .filter(|category| seen.insert(*category))
            .collect()
    }
}

/// In-memory snapshot of product detail used to resolve order and cart lines.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    products: Vec<Product>,
    index: HashMap<ProductId, usize>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        let mut index = HashMap::with_capacity(products.len());
        for (position, product) in products.iter().enumerate() {
            index.entry(product.id.clone()).or_insert(position);
        }
        Self { products, index }
    }

    pub fn find(&self, product_id: &ProductId) -> Option<&Product> {
        self.index.get(product_id).map(|&position| &self.products[position])
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Runs a category query the same way the SQL product store does.
    pub fn query(&self, query: &CatalogQuery) -> Vec<Product> {
        let wanted: HashSet<&str> = query.categories.iter().map(String::as_str).collect();
        let mut matches: Vec<&Product> = self
            .products
            .iter()
            .filter(|product| wanted.contains(product.category.as_str()))
            .collect();
        if query.featured_first {
            matches.sort_by_key(|product| !product.featured);
        }
        matches.into_iter().take(query.limit).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::product::{Product, ProductId};

    use super::{Catalog, CatalogQuery};

    fn product(id: &str, category: &str, featured: bool) -> Product {
        Product {
            id: ProductId(id.to_string()),
            name: id.to_string(),
            category: category.to_string(),
            price: Decimal::new(50, 0),
            colors: Vec::new(),
            featured,
        }
    }

    #[test]
    fn query_filters_by_category_and_sorts_featured_first() {
        let catalog = Catalog::new(vec![
            product("canvas", "shoes", false),
            product("jacket", "jackets", true),
            product("runner", "shoes", true),
            product("sneaker", "shoes", false),
        ]);

        let results = catalog.query(&CatalogQuery {
            categories: vec!["shoes".to_string()],
            featured_first: true,
            limit: 8,
        });

        let ids: Vec<&str> = results.iter().map(|product| product.id.0.as_str()).collect();
        assert_eq!(ids, vec!["runner", "canvas", "sneaker"]);
    }

    #[test]
    fn query_applies_limit() {
        let products = (0..12).map(|n| product(&format!("tee-{n}"), "t-shirts", false)).collect();
        let catalog = Catalog::new(products);

        let results = catalog.query(&CatalogQuery {
            categories: vec!["t-shirts".to_string()],
            featured_first: true,
            limit: 8,
        });

        assert_eq!(results.len(), 8);
    }

    #[test]
    fn find_returns_first_product_for_duplicate_ids() {
        let catalog = Catalog::new(vec![product("dup", "bags", true), product("dup", "suits", false)]);
        let found = catalog.find(&ProductId("dup".to_string())).expect("product");
        assert_eq!(found.category, "bags");
    }

    #[test]
    fn distinct_categories_keeps_first_occurrence_order() {
        let query = CatalogQuery {
            categories: vec!["jeans".into(), "shoes".into(), "jeans".into()],
            featured_first: true,
            limit: 8,
        };
        assert_eq!(query.distinct_categories(), vec!["jeans", "shoes"]);
    }
}
