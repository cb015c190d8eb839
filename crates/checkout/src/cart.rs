//! Shopping cart state.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tillpoint_catalog::{Product, ProductId};

/// Cart line: one product plus a positive quantity.
///
/// Uniqueness invariant: at most one line per distinct product id in the cart
/// at any time. The line remembers the product it was created from, so a cart
/// is self-contained for display and totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: i64,
}

impl CartLine {
    /// Line amount: unit price times quantity, exact.
    pub fn amount(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// Insertion-ordered collection of cart lines (first added, first shown).
///
/// `Cart` is plain state; the decision logic that governs when mutations are
/// allowed lives in the [`Register`](crate::register::Register) aggregate,
/// which calls these primitives from its event application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product.id == *product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Σ price × quantity, exact (no rounding).
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::amount).sum()
    }

    /// Append a new line with quantity 1 at the end of the cart.
    pub(crate) fn push_line(&mut self, product: Product) {
        self.lines.push(CartLine {
            product,
            quantity: 1,
        });
    }

    /// Set the quantity of an existing line. Absent lines are left alone.
    pub(crate) fn set_quantity(&mut self, product_id: &ProductId, quantity: i64) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == *product_id) {
            line.quantity = quantity;
        }
    }

    /// Remove the line for a product. Absent lines are a no-op.
    pub(crate) fn remove(&mut self, product_id: &ProductId) {
        self.lines.retain(|l| l.product.id != *product_id);
    }

    pub(crate) fn clear(&mut self) {
        self.lines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tillpoint_core::AggregateId;

    fn product(name: &str, price: Decimal) -> Product {
        Product {
            id: ProductId::new(AggregateId::new()),
            name: name.to_string(),
            price,
            category: "Test".to_string(),
            sku: None,
            in_stock: true,
        }
    }

    #[test]
    fn subtotal_sums_price_times_quantity() {
        let espresso = product("Espresso", dec!(2.50));
        let sandwich = product("Sandwich", dec!(8.50));

        let mut cart = Cart::new();
        cart.push_line(espresso.clone());
        cart.set_quantity(&espresso.id, 3);
        cart.push_line(sandwich);

        assert_eq!(cart.subtotal(), dec!(16.00));
        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn lines_keep_insertion_order() {
        let first = product("First", dec!(1.00));
        let second = product("Second", dec!(2.00));

        let mut cart = Cart::new();
        cart.push_line(first.clone());
        cart.push_line(second);
        cart.set_quantity(&first.id, 9);

        let names: Vec<&str> = cart.lines().iter().map(|l| l.product.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn remove_is_silent_for_absent_line() {
        let mut cart = Cart::new();
        cart.remove(&ProductId::new(AggregateId::new()));
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), dec!(0));
    }
}
