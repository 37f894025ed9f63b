//! Totals calculator.
//!
//! Totals are always recomputed from the full line set, never patched
//! incrementally. The only rounding applied is to `quantity * unit_price`,
//! brought to the stored scale so that the persisted columns satisfy the
//! line and header identities exactly.

use rust_decimal::Decimal;

use almacen_shared::types::round_money;

use super::types::{OrderLine, OrderTotals};

/// `quantity * unit_price` at the stored scale.
#[must_use]
pub fn line_gross(quantity: Decimal, unit_price: Decimal) -> Decimal {
    round_money(quantity * unit_price)
}

/// `quantity * unit_price - discount + tax`.
#[must_use]
pub fn line_total(quantity: Decimal, unit_price: Decimal, discount: Decimal, tax: Decimal) -> Decimal {
    line_gross(quantity, unit_price) - discount + tax
}

/// Recomputes `line_total` on every line in place.
pub fn recompute_lines(lines: &mut [OrderLine]) {
    for line in lines {
        line.line_total = line_total(line.quantity, line.unit_price, line.discount, line.tax);
    }
}

/// Calculates header totals from a line set.
#[must_use]
pub fn calculate_totals(lines: &[OrderLine]) -> OrderTotals {
    let subtotal: Decimal = lines
        .iter()
        .map(|l| line_gross(l.quantity, l.unit_price))
        .sum();
    let discount_total: Decimal = lines.iter().map(|l| l.discount).sum();
    let tax_total: Decimal = lines.iter().map(|l| l.tax).sum();

    OrderTotals {
        subtotal,
        discount_total,
        tax_total,
        grand_total: subtotal - discount_total + tax_total,
    }
}
