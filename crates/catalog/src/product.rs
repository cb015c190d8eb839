use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tillpoint_core::{AggregateId, DomainError, DomainResult, Entity};

/// Product identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub AggregateId);

impl ProductId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Catalog product: immutable reference data for the session.
///
/// `sku` is the exact-match lookup key used by the barcode scanner path;
/// products without a SKU simply cannot be scanned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub category: String,
    pub sku: Option<String>,
    pub in_stock: bool,
}

impl Product {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        price: Decimal,
        category: impl Into<String>,
        sku: Option<String>,
        in_stock: bool,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        if price.is_sign_negative() {
            return Err(DomainError::validation("product price cannot be negative"));
        }

        Ok(Self {
            id,
            name,
            price,
            category: category.into(),
            sku,
            in_stock,
        })
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn test_product_id() -> ProductId {
        ProductId::new(AggregateId::new())
    }

    #[test]
    fn new_accepts_zero_price() {
        let product = Product::new(
            test_product_id(),
            "Tap Water",
            dec!(0.00),
            "Drinks",
            None,
            true,
        );
        assert!(product.is_ok());
    }

    #[test]
    fn new_rejects_negative_price() {
        let err = Product::new(
            test_product_id(),
            "Espresso",
            dec!(-2.50),
            "Coffee",
            Some("1001".to_string()),
            true,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn new_rejects_blank_name() {
        let err = Product::new(test_product_id(), "   ", dec!(1.00), "Coffee", None, true)
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
