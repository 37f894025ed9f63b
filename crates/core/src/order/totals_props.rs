//! Property-based tests for the totals calculator.
//!
//! *For any* valid line set, the persisted line and header identities hold
//! exactly and every derived value fits the stored column scale.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use almacen_shared::types::{ProductId, fits_numeric_column};

use super::totals::{calculate_totals, line_gross};
use super::types::LineInput;
use super::validation::validate_lines;

/// Quantity from 0.0001 to 10,000.0000.
fn quantity() -> impl Strategy<Value = Decimal> {
    (1i64..=100_000_000i64).prop_map(|n| Decimal::new(n, 4))
}

/// Non-negative amount from 0.0000 to 10,000.0000.
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..=100_000_000i64).prop_map(|n| Decimal::new(n, 4))
}

fn line_input() -> impl Strategy<Value = LineInput> {
    (any::<u128>(), quantity(), amount(), amount(), amount()).prop_map(
        |(id, quantity, unit_price, discount, tax)| {
            LineInput::new(ProductId::from_uuid(Uuid::from_u128(id)), quantity, unit_price)
                .with_discount(discount)
                .with_tax(tax)
        },
    )
}

fn line_set() -> impl Strategy<Value = Vec<LineInput>> {
    prop::collection::vec(line_input(), 1..8)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every line satisfies `line_total == quantity * price - discount + tax`.
    #[test]
    fn prop_line_identity_holds(inputs in line_set()) {
        let lines = validate_lines(&inputs).unwrap();
        for line in &lines {
            prop_assert_eq!(
                line.line_total,
                line_gross(line.quantity, line.unit_price) - line.discount + line.tax
            );
            prop_assert!(fits_numeric_column(line.line_total));
        }
    }

    /// Header satisfies `grand_total == subtotal - discount_total + tax_total`
    /// and the sums match the lines.
    #[test]
    fn prop_header_identity_holds(inputs in line_set()) {
        let lines = validate_lines(&inputs).unwrap();
        let totals = calculate_totals(&lines);

        prop_assert_eq!(
            totals.grand_total,
            totals.subtotal - totals.discount_total + totals.tax_total
        );
        prop_assert_eq!(
            totals.grand_total,
            lines.iter().map(|l| l.line_total).sum::<Decimal>()
        );
        prop_assert_eq!(
            totals.discount_total,
            inputs.iter().filter_map(|l| l.discount).sum::<Decimal>()
        );
        prop_assert!(fits_numeric_column(totals.subtotal));
        prop_assert!(fits_numeric_column(totals.grand_total));
    }

    /// Totals do not depend on line order.
    #[test]
    fn prop_totals_order_independent(inputs in line_set()) {
        let forward = calculate_totals(&validate_lines(&inputs).unwrap());

        let mut reversed = inputs.clone();
        reversed.reverse();
        let backward = calculate_totals(&validate_lines(&reversed).unwrap());

        prop_assert_eq!(forward, backward);
    }

    /// A single non-positive quantity anywhere rejects the whole set.
    #[test]
    fn prop_bad_quantity_rejects_set(
        mut inputs in line_set(),
        pick in any::<prop::sample::Index>(),
        bad in -100_000i64..=0i64,
    ) {
        let index = pick.index(inputs.len());
        inputs[index].quantity = Decimal::new(bad, 2);

        let expected = format!("lines[{index}].quantity");
        let err = validate_lines(&inputs).unwrap_err();
        prop_assert_eq!(err.field(), Some(expected.as_str()));
    }
}
