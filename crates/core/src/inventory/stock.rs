//! Locked product state and the stock movements applied to it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use almacen_shared::types::{LocalId, ProductId};

use super::costing::weighted_average_cost;
use crate::order::error::OrderError;

/// Stock and cost of a product, as read under its row lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductStock {
    /// Product id.
    pub id: ProductId,
    /// Owning Local.
    pub local_id: LocalId,
    /// Units on hand.
    pub stock_on_hand: Decimal,
    /// Weighted-average unit cost.
    pub avg_cost: Decimal,
}

impl ProductStock {
    /// Returns `requested - stock_on_hand` if the request exceeds stock.
    #[must_use]
    pub fn shortfall(&self, requested: Decimal) -> Option<Decimal> {
        (requested > self.stock_on_hand).then(|| requested - self.stock_on_hand)
    }

    /// Takes units out of stock for a sale.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::InsufficientStock` if fewer than `quantity`
    /// units are on hand; stock is left untouched.
    pub fn issue(&mut self, quantity: Decimal) -> Result<(), OrderError> {
        if let Some(shortfall) = self.shortfall(quantity) {
            return Err(OrderError::InsufficientStock {
                product_id: self.id.into_inner(),
                available: self.stock_on_hand,
                requested: quantity,
                shortfall,
            });
        }
        self.stock_on_hand -= quantity;
        Ok(())
    }

    /// Puts units back after a sale is annulled.
    pub fn return_issue(&mut self, quantity: Decimal) {
        self.stock_on_hand += quantity;
    }

    /// Receives units from a purchase and re-averages the unit cost.
    pub fn receive(&mut self, quantity: Decimal, unit_cost: Decimal) {
        self.avg_cost =
            weighted_average_cost(self.avg_cost, self.stock_on_hand, unit_cost, quantity);
        self.stock_on_hand += quantity;
    }

    /// Removes units received by a purchase that is being annulled.
    ///
    /// The average cost is not reversed, and stock may go negative.
    pub fn reverse_receipt(&mut self, quantity: Decimal) {
        self.stock_on_hand -= quantity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product(stock: Decimal, avg: Decimal) -> ProductStock {
        ProductStock {
            id: ProductId::new(),
            local_id: LocalId::new(),
            stock_on_hand: stock,
            avg_cost: avg,
        }
    }

    #[test]
    fn test_issue_within_stock() {
        let mut p = product(dec!(10), dec!(1));
        p.issue(dec!(2)).unwrap();
        assert_eq!(p.stock_on_hand, dec!(8));
        p.issue(dec!(8)).unwrap();
        assert_eq!(p.stock_on_hand, dec!(0));
    }

    #[test]
    fn test_issue_beyond_stock_leaves_stock() {
        let mut p = product(dec!(3), dec!(1));
        let err = p.issue(dec!(5)).unwrap_err();

        match err {
            OrderError::InsufficientStock {
                available,
                requested,
                shortfall,
                ..
            } => {
                assert_eq!(available, dec!(3));
                assert_eq!(requested, dec!(5));
                assert_eq!(shortfall, dec!(2));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(p.stock_on_hand, dec!(3));
    }

    #[test]
    fn test_receive_and_reverse() {
        let mut p = product(dec!(10), dec!(100));
        p.receive(dec!(5), dec!(200));
        assert_eq!(p.stock_on_hand, dec!(15));
        assert_eq!(p.avg_cost, dec!(133.3333));

        p.reverse_receipt(dec!(5));
        assert_eq!(p.stock_on_hand, dec!(10));
        // Average cost stays blended after the reversal.
        assert_eq!(p.avg_cost, dec!(133.3333));
    }

    #[test]
    fn test_return_issue_restores_exactly() {
        let mut p = product(dec!(7.25), dec!(1));
        p.issue(dec!(0.125)).unwrap();
        p.return_issue(dec!(0.125));
        assert_eq!(p.stock_on_hand, dec!(7.25));
    }
}
