//! Decimal scale helpers for money and quantity columns.
//!
//! CRITICAL: Never use floating-point for money or stock calculations.
//! Every monetary and quantity column is stored as `NUMERIC(14, 4)`, so
//! values handled by the domain must fit that shape exactly.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of fractional digits stored for money and quantities.
pub const MONEY_SCALE: u32 = 4;

/// Total significant digits of the `NUMERIC` columns.
pub const MONEY_PRECISION: u32 = 14;

/// Exclusive upper bound on the magnitude of a storable value (10^10).
fn magnitude_limit() -> Decimal {
    Decimal::from(10_i64.pow(MONEY_PRECISION - MONEY_SCALE))
}

/// Returns true if the value is storable in `NUMERIC(14, 4)` without
/// rounding or overflow.
#[must_use]
pub fn fits_numeric_column(value: Decimal) -> bool {
    value.normalize().scale() <= MONEY_SCALE && value.abs() < magnitude_limit()
}

/// Rounds a value to the stored scale.
///
/// Uses half-away-from-zero, which is what PostgreSQL applies when a
/// `NUMERIC` with more digits is cast to the column type.
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}
