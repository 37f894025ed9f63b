//! Moving weighted-average cost.

use rust_decimal::Decimal;

use almacen_shared::types::round_money;

/// Blends the current average with an incoming receipt.
///
/// `new_avg = (old_avg * old_stock + unit_cost * quantity) / (old_stock + quantity)`,
/// rounded to the stored scale. When the resulting stock is zero the
/// current average is returned unchanged. When nothing is on hand (stock
/// at or below zero) the receipt sets the average to its own unit cost.
#[must_use]
pub fn weighted_average_cost(
    old_avg: Decimal,
    old_stock: Decimal,
    unit_cost: Decimal,
    quantity: Decimal,
) -> Decimal {
    let new_stock = old_stock + quantity;
    if new_stock.is_zero() {
        return old_avg;
    }
    if old_stock <= Decimal::ZERO {
        return round_money(unit_cost);
    }

    let value = old_avg * old_stock + unit_cost * quantity;
    round_money(value / new_stock)
}
