//! Display-time money rounding.
//!
//! Monetary amounts are carried as exact `Decimal` values end to end; the
//! 8.5% tax produces sub-cent amounts (e.g. 0.425) that must not be rounded
//! internally, or repeated total computations would compound the error.
//! Rounding to two places happens here, at the presentation edge only.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round an exact amount to two decimal places for display.
///
/// Half-cent amounts round away from zero (0.425 shows as 0.43), matching
/// conventional receipt rounding.
pub fn to_display(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an exact amount as a dollar string, e.g. `$5.43`.
pub fn format_usd(amount: Decimal) -> String {
    format!("${:.2}", to_display(amount))
}
