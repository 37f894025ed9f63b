//! Order domain types shared by purchases and sales.
//!
//! A purchase and a sale are structurally identical. They differ only in
//! the direction of their inventory effect, captured by [`OrderKind`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use almacen_shared::types::{LocalId, OrderId, ProductId};

/// Which side of the counter an order sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    /// Goods received from a provider. Confirming adds stock.
    Purchase,
    /// Goods sold to a customer. Confirming removes stock.
    Sale,
}

impl OrderKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Sale => "sale",
        }
    }

    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "purchase" => Some(Self::Purchase),
            "sale" => Some(Self::Sale),
            _ => None,
        }
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Order lifecycle status.
///
/// The only valid transitions are:
/// - Draft → Confirmed (confirm)
/// - Confirmed → Annulled (annul)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Editable, no effect on inventory yet.
    Draft,
    /// Inventory effect applied, totals frozen.
    Confirmed,
    /// Inventory effect reversed (terminal).
    Annulled,
}

impl OrderStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Confirmed => "confirmed",
            Self::Annulled => "annulled",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "confirmed" => Some(Self::Confirmed),
            "annulled" => Some(Self::Annulled),
            _ => None,
        }
    }

    /// Returns true if header and lines may still be changed.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true if no further transition is possible.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Annulled)
    }

    /// Check if a status transition is valid.
    #[must_use]
    pub fn can_transition_to(&self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Draft, Self::Confirmed) | (Self::Confirmed, Self::Annulled)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Client-supplied line item, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineInput {
    /// Requested 1-based position; defaults to insertion order.
    #[serde(default)]
    pub line_no: Option<i32>,
    /// Referenced product.
    pub product_id: ProductId,
    /// Quantity, must be > 0.
    pub quantity: Decimal,
    /// Unit price (sale) or unit cost (purchase), must be >= 0.
    #[serde(alias = "unit_cost")]
    pub unit_price: Decimal,
    /// Line discount, defaults to zero.
    #[serde(default)]
    pub discount: Option<Decimal>,
    /// Line tax, defaults to zero.
    #[serde(default)]
    pub tax: Option<Decimal>,
}

impl LineInput {
    /// Creates a line with no discount or tax and an implicit line number.
    #[must_use]
    pub fn new(product_id: ProductId, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            line_no: None,
            product_id,
            quantity,
            unit_price,
            discount: None,
            tax: None,
        }
    }

    /// Sets the line discount.
    #[must_use]
    pub fn with_discount(mut self, discount: Decimal) -> Self {
        self.discount = Some(discount);
        self
    }

    /// Sets the line tax.
    #[must_use]
    pub fn with_tax(mut self, tax: Decimal) -> Self {
        self.tax = Some(tax);
        self
    }

    /// Sets an explicit line number.
    #[must_use]
    pub fn with_line_no(mut self, line_no: i32) -> Self {
        self.line_no = Some(line_no);
        self
    }
}

/// A validated line with its derived total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// 1-based position, unique within the order.
    pub line_no: i32,
    /// Referenced product.
    pub product_id: ProductId,
    /// Quantity (> 0).
    pub quantity: Decimal,
    /// Unit price or unit cost (>= 0).
    pub unit_price: Decimal,
    /// Discount (>= 0).
    pub discount: Decimal,
    /// Tax (>= 0).
    pub tax: Decimal,
    /// `quantity * unit_price - discount + tax`.
    pub line_total: Decimal,
}

/// Header totals derived from the full line set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderTotals {
    /// Sum of `quantity * unit_price` over all lines.
    pub subtotal: Decimal,
    /// Sum of line discounts.
    pub discount_total: Decimal,
    /// Sum of line taxes.
    pub tax_total: Decimal,
    /// `subtotal - discount_total + tax_total`.
    pub grand_total: Decimal,
}

/// The parts of a persisted order the state machine reads.
#[derive(Debug, Clone)]
pub struct OrderSnapshot {
    /// Order id.
    pub id: OrderId,
    /// Owning Local.
    pub local_id: LocalId,
    /// Purchase or sale.
    pub kind: OrderKind,
    /// Current status.
    pub status: OrderStatus,
    /// Persisted lines.
    pub lines: Vec<OrderLine>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(OrderStatus::Draft, "draft")]
    #[case(OrderStatus::Confirmed, "confirmed")]
    #[case(OrderStatus::Annulled, "annulled")]
    fn test_status_string_forms(#[case] status: OrderStatus, #[case] raw: &str) {
        assert_eq!(status.as_str(), raw);
        assert_eq!(status.to_string(), raw);
        assert_eq!(OrderStatus::parse(raw), Some(status));
        assert_eq!(OrderStatus::parse(&raw.to_uppercase()), Some(status));
    }

    #[test]
    fn test_status_parse_unknown() {
        assert_eq!(OrderStatus::parse("posted"), None);
        assert_eq!(OrderKind::parse("refund"), None);
    }

    #[rstest]
    #[case(OrderStatus::Draft, OrderStatus::Confirmed, true)]
    #[case(OrderStatus::Confirmed, OrderStatus::Annulled, true)]
    #[case(OrderStatus::Draft, OrderStatus::Annulled, false)]
    #[case(OrderStatus::Confirmed, OrderStatus::Draft, false)]
    #[case(OrderStatus::Annulled, OrderStatus::Draft, false)]
    #[case(OrderStatus::Annulled, OrderStatus::Confirmed, false)]
    #[case(OrderStatus::Confirmed, OrderStatus::Confirmed, false)]
    fn test_transitions(#[case] from: OrderStatus, #[case] to: OrderStatus, #[case] ok: bool) {
        assert_eq!(from.can_transition_to(to), ok);
    }

    #[test]
    fn test_only_draft_is_editable() {
        assert!(OrderStatus::Draft.is_editable());
        assert!(!OrderStatus::Confirmed.is_editable());
        assert!(!OrderStatus::Annulled.is_editable());
        assert!(OrderStatus::Annulled.is_terminal());
    }

    #[test]
    fn test_line_input_accepts_unit_cost_alias() {
        let json = r#"{
            "product_id": "550e8400-e29b-41d4-a716-446655440000",
            "quantity": "5",
            "unit_cost": "200"
        }"#;
        let line: LineInput = serde_json::from_str(json).unwrap();
        assert_eq!(line.unit_price, Decimal::from(200));
        assert_eq!(line.discount, None);
        assert_eq!(line.line_no, None);
    }
}
