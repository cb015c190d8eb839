//! Catalog access: the read-only boundary the register depends on.

use rust_decimal_macros::dec;
use uuid::Uuid;

use tillpoint_core::AggregateId;

use crate::product::{Product, ProductId};

/// Search filter for the catalog grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Case-insensitive substring match over the product name.
    pub term: Option<String>,
    /// Exact category label; `None` means all categories.
    pub category: Option<String>,
}

/// Read-only catalog boundary.
///
/// The grid path (`search`) only offers in-stock products; the scanner path
/// (`by_sku`) matches regardless of stock, mirroring the original terminal
/// behavior.
pub trait CatalogProvider {
    /// Every product in the catalog, in catalog order.
    fn products(&self) -> &[Product];

    fn by_id(&self, id: &ProductId) -> Option<&Product> {
        self.products().iter().find(|p| p.id == *id)
    }

    /// Exact SKU match; no partial matching. Leading/trailing whitespace in
    /// the scanned code is ignored.
    fn by_sku(&self, code: &str) -> Option<&Product> {
        let code = code.trim();
        if code.is_empty() {
            return None;
        }
        self.products()
            .iter()
            .find(|p| p.sku.as_deref() == Some(code))
    }

    /// Distinct category labels in first-appearance order.
    fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();
        for product in self.products() {
            if !categories.contains(&product.category) {
                categories.push(product.category.clone());
            }
        }
        categories
    }

    /// In-stock products matching the filter, in catalog order.
    fn search(&self, filter: &ProductFilter) -> Vec<&Product> {
        let term = filter.term.as_deref().unwrap_or("").to_lowercase();
        self.products()
            .iter()
            .filter(|p| p.in_stock)
            .filter(|p| term.is_empty() || p.name.to_lowercase().contains(&term))
            .filter(|p| {
                filter
                    .category
                    .as_deref()
                    .is_none_or(|c| p.category == c)
            })
            .collect()
    }
}

/// Fixed in-memory catalog.
#[derive(Debug, Clone)]
pub struct InMemoryCatalog {
    products: Vec<Product>,
}

impl InMemoryCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// The sample coffee-shop catalog the demo terminal ships with.
    ///
    /// IDs are deterministic so repeated sessions agree on them.
    pub fn sample() -> Self {
        let rows: &[(u128, &str, &str, &str, &str)] = &[
            (1, "Espresso", "2.50", "Coffee", "1001"),
            (2, "Cappuccino", "4.25", "Coffee", "1002"),
            (3, "Latte", "4.75", "Coffee", "1003"),
            (4, "Americano", "3.00", "Coffee", "1004"),
            (5, "Croissant", "3.50", "Pastry", "2001"),
            (6, "Muffin", "2.75", "Pastry", "2002"),
            (7, "Bagel", "2.25", "Pastry", "2003"),
            (8, "Green Tea", "2.00", "Tea", "3001"),
            (9, "Earl Grey", "2.25", "Tea", "3002"),
            (10, "Chamomile", "2.50", "Tea", "3003"),
            (11, "Sandwich", "8.50", "Food", "4001"),
            (12, "Salad", "9.25", "Food", "4002"),
        ];

        let products = rows
            .iter()
            .map(|(n, name, price, category, sku)| Product {
                id: ProductId::new(AggregateId::from_uuid(Uuid::from_u128(*n))),
                name: (*name).to_string(),
                price: price.parse().unwrap_or(dec!(0)),
                category: (*category).to_string(),
                sku: Some((*sku).to_string()),
                in_stock: true,
            })
            .collect();

        Self { products }
    }
}

impl CatalogProvider for InMemoryCatalog {
    fn products(&self) -> &[Product] {
        &self.products
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::sample()
    }

    #[test]
    fn sample_catalog_has_twelve_products_all_in_stock() {
        let catalog = catalog();
        assert_eq!(catalog.products().len(), 12);
        assert!(catalog.products().iter().all(|p| p.in_stock));
    }

    #[test]
    fn by_sku_matches_exactly() {
        let catalog = catalog();
        let product = catalog.by_sku("1001").unwrap();
        assert_eq!(product.name, "Espresso");
        assert_eq!(product.price, dec!(2.50));
    }

    #[test]
    fn by_sku_trims_scanned_whitespace() {
        let catalog = catalog();
        assert_eq!(catalog.by_sku("  4001 ").unwrap().name, "Sandwich");
    }

    #[test]
    fn by_sku_does_no_partial_matching() {
        let catalog = catalog();
        assert!(catalog.by_sku("100").is_none());
        assert!(catalog.by_sku("10011").is_none());
        assert!(catalog.by_sku("").is_none());
    }

    #[test]
    fn by_sku_ignores_stock() {
        let mut products = catalog().products().to_vec();
        products[0].in_stock = false;
        let catalog = InMemoryCatalog::new(products);

        // Grid path hides it, scanner path still finds it.
        let filter = ProductFilter {
            term: Some("espresso".to_string()),
            category: None,
        };
        assert!(catalog.search(&filter).is_empty());
        assert_eq!(catalog.by_sku("1001").unwrap().name, "Espresso");
    }

    #[test]
    fn categories_are_distinct_in_first_appearance_order() {
        assert_eq!(
            catalog().categories(),
            vec!["Coffee", "Pastry", "Tea", "Food"]
        );
    }

    #[test]
    fn search_filters_by_term_case_insensitively() {
        let catalog = catalog();
        let filter = ProductFilter {
            term: Some("TEA".to_string()),
            category: None,
        };
        let names: Vec<&str> = catalog
            .search(&filter)
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Green Tea"]);
    }

    #[test]
    fn search_filters_by_category() {
        let catalog = catalog();
        let filter = ProductFilter {
            term: None,
            category: Some("Pastry".to_string()),
        };
        let names: Vec<&str> = catalog
            .search(&filter)
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Croissant", "Muffin", "Bagel"]);
    }

    #[test]
    fn search_combines_term_and_category() {
        let catalog = catalog();
        let filter = ProductFilter {
            term: Some("an".to_string()),
            category: Some("Coffee".to_string()),
        };
        let names: Vec<&str> = catalog
            .search(&filter)
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Americano"]);
    }
}
