//! Line item validation.
//!
//! Every rule is checked for every line before anything is persisted, and
//! the first violation fails the whole line set with a field-scoped error.

use std::collections::HashSet;

use rust_decimal::Decimal;

use almacen_shared::types::fits_numeric_column;

use super::error::OrderError;
use super::totals::{calculate_totals, line_gross, line_total};
use super::types::{LineInput, OrderLine};

/// Validates a line set and returns the normalized lines with their totals.
///
/// Missing discount and tax default to zero. Missing line numbers default
/// to the 1-based insertion position.
///
/// # Errors
///
/// Returns `OrderError::Validation` naming the first offending field.
pub fn validate_lines(inputs: &[LineInput]) -> Result<Vec<OrderLine>, OrderError> {
    if inputs.is_empty() {
        return Err(OrderError::validation(
            "lines",
            "an order needs at least one line",
        ));
    }

    let mut seen = HashSet::with_capacity(inputs.len());
    let mut lines = Vec::with_capacity(inputs.len());

    for (index, input) in inputs.iter().enumerate() {
        let line = validate_line(index, input)?;
        if !seen.insert(line.line_no) {
            return Err(OrderError::line_validation(
                index,
                Some(line.line_no),
                "line_no",
                format!("line number {} is used more than once", line.line_no),
            ));
        }
        lines.push(line);
    }

    let totals = calculate_totals(&lines);
    for (field, value) in [
        ("subtotal", totals.subtotal),
        ("discount_total", totals.discount_total),
        ("tax_total", totals.tax_total),
        ("grand_total", totals.grand_total),
    ] {
        if !fits_numeric_column(value) {
            return Err(OrderError::validation(field, "order total is out of range"));
        }
    }

    Ok(lines)
}

fn validate_line(index: usize, input: &LineInput) -> Result<OrderLine, OrderError> {
    let line_no = match input.line_no {
        Some(n) if n < 1 => {
            return Err(OrderError::line_validation(
                index,
                Some(n),
                "line_no",
                "must be 1 or greater",
            ));
        }
        Some(n) => n,
        None => i32::try_from(index + 1).map_err(|_| {
            OrderError::line_validation(index, None, "line_no", "too many lines")
        })?,
    };

    let discount = input.discount.unwrap_or(Decimal::ZERO);
    let tax = input.tax.unwrap_or(Decimal::ZERO);

    let fields = [
        ("quantity", input.quantity),
        ("unit_price", input.unit_price),
        ("discount", discount),
        ("tax", tax),
    ];
    for (field, value) in fields {
        if !fits_numeric_column(value) {
            return Err(OrderError::line_validation(
                index,
                Some(line_no),
                field,
                "must have at most 4 decimal places and fewer than 11 integer digits",
            ));
        }
    }

    if input.quantity <= Decimal::ZERO {
        return Err(OrderError::line_validation(
            index,
            Some(line_no),
            "quantity",
            "must be greater than zero",
        ));
    }
    for (field, value) in &fields[1..] {
        if *value < Decimal::ZERO {
            return Err(OrderError::line_validation(
                index,
                Some(line_no),
                field,
                "must not be negative",
            ));
        }
    }

    let gross = line_gross(input.quantity, input.unit_price);
    let total = line_total(input.quantity, input.unit_price, discount, tax);
    if !fits_numeric_column(gross) || !fits_numeric_column(total) {
        return Err(OrderError::line_validation(
            index,
            Some(line_no),
            "line_total",
            "line total is out of range",
        ));
    }

    Ok(OrderLine {
        line_no,
        product_id: input.product_id,
        quantity: input.quantity,
        unit_price: input.unit_price,
        discount,
        tax,
        line_total: total,
    })
}
