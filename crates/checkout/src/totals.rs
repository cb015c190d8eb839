//! Order totals.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use tillpoint_core::ValueObject;

use crate::cart::Cart;

/// Fixed sales tax rate (8.5%). Not configurable.
pub const TAX_RATE: Decimal = dec!(0.085);

/// Derived order totals.
///
/// All three amounts are exact; rounding to two places happens only at
/// presentation time (see `tillpoint_core::money`), so repeated computation
/// never compounds rounding error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl Totals {
    /// Pure computation over the cart: `tax = subtotal × 0.085`,
    /// `total = subtotal × 1.085`.
    pub fn for_cart(cart: &Cart) -> Self {
        let subtotal = cart.subtotal();
        Self {
            subtotal,
            tax: subtotal * TAX_RATE,
            total: subtotal * (Decimal::ONE + TAX_RATE),
        }
    }
}

impl ValueObject for Totals {}
