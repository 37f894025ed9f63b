//! Order state machine.
//!
//! Pure transition logic: the caller loads and locks rows, hands their
//! current state in, and persists the returned plan inside the same
//! transaction. Nothing here touches storage, so a rejected plan leaves
//! every row exactly as it was read.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use almacen_shared::types::{LocalId, ProductId};

use super::error::{OrderError, ResourceKind};
use super::totals::{calculate_totals, recompute_lines};
use super::types::{
    LineInput, OrderKind, OrderLine, OrderSnapshot, OrderStatus, OrderTotals,
};
use super::validation::validate_lines;
use crate::inventory::ProductStock;

/// Information about a product needed to accept it on a line.
#[derive(Debug, Clone)]
pub struct ProductInfo {
    /// The product ID.
    pub id: ProductId,
    /// Owning Local.
    pub local_id: LocalId,
    /// Whether the product may be referenced by new lines.
    pub active: bool,
}

/// One purchase receipt to record in the product's cost history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostEntry {
    /// Received product.
    pub product_id: ProductId,
    /// Unit cost paid on the line.
    pub unit_cost: Decimal,
    /// Units received.
    pub quantity: Decimal,
}

/// The full effect of a confirm or annul, ready to persist.
#[derive(Debug, Clone)]
pub struct TransitionPlan {
    /// Status to write on the order.
    pub new_status: OrderStatus,
    /// Lines with re-derived totals.
    pub lines: Vec<OrderLine>,
    /// Header totals re-derived from `lines`.
    pub totals: OrderTotals,
    /// Mutated products, in ascending id order.
    pub products: Vec<ProductStock>,
    /// Cost history rows (purchase confirm only).
    pub cost_entries: Vec<CostEntry>,
}

/// Stateless service for order validation and state transitions.
pub struct OrderService;

impl OrderService {
    /// Fails unless the order can still be edited.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::InvalidState` for any status other than Draft.
    pub fn ensure_editable(status: OrderStatus) -> Result<(), OrderError> {
        if status.is_editable() {
            Ok(())
        } else {
            Err(OrderError::InvalidState {
                current: status,
                expected: OrderStatus::Draft,
            })
        }
    }

    /// Validates a line set for create or update and resolves its products.
    ///
    /// Every line is validated, then every referenced product must exist,
    /// belong to `local_id`, and be active.
    ///
    /// # Errors
    ///
    /// Returns `Validation`, `NotFound` or `CrossTenant` for the first
    /// offending line.
    pub fn prepare_lines<P>(
        local_id: LocalId,
        inputs: &[LineInput],
        product_lookup: P,
    ) -> Result<(Vec<OrderLine>, OrderTotals), OrderError>
    where
        P: Fn(ProductId) -> Option<ProductInfo>,
    {
        let lines = validate_lines(inputs)?;

        for (index, line) in lines.iter().enumerate() {
            let product = product_lookup(line.product_id)
                .ok_or_else(|| OrderError::not_found(ResourceKind::Product, line.product_id))?;

            if product.local_id != local_id {
                return Err(OrderError::cross_tenant(ResourceKind::Product, product.id));
            }
            if !product.active {
                return Err(OrderError::line_validation(
                    index,
                    Some(line.line_no),
                    "product_id",
                    format!("product {} is inactive", product.id),
                ));
            }
        }

        let totals = calculate_totals(&lines);
        Ok((lines, totals))
    }

    /// Checks that a counterparty exists and belongs to the order's Local.
    ///
    /// `owner` is the counterparty's Local, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `CrossTenant`.
    pub fn check_counterparty(
        local_id: LocalId,
        resource: ResourceKind,
        id: uuid::Uuid,
        owner: Option<LocalId>,
    ) -> Result<(), OrderError> {
        match owner {
            None => Err(OrderError::not_found(resource, id)),
            Some(owner) if owner != local_id => Err(OrderError::cross_tenant(resource, id)),
            Some(_) => Ok(()),
        }
    }

    /// Distinct products referenced by the lines, in the order their rows
    /// must be locked (ascending id).
    #[must_use]
    pub fn product_lock_order(lines: &[OrderLine]) -> Vec<ProductId> {
        let mut ids: Vec<ProductId> = lines.iter().map(|l| l.product_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Plans Draft → Confirmed.
    ///
    /// `products` must hold the locked state of every product in
    /// [`Self::product_lock_order`]. For a sale, stock is checked for all
    /// lines (summed per product) before any product is touched.
    ///
    /// # Errors
    ///
    /// - `InvalidState` unless the order is Draft
    /// - `NotFound` if a referenced product was not supplied
    /// - `CrossTenant` if a product belongs to another Local
    /// - `InsufficientStock` for the first short product (sale only)
    pub fn plan_confirm(
        order: &OrderSnapshot,
        products: impl IntoIterator<Item = ProductStock>,
    ) -> Result<TransitionPlan, OrderError> {
        Self::check_transition(order.status, OrderStatus::Confirmed)?;
        if order.lines.is_empty() {
            return Err(OrderError::validation(
                "lines",
                "an order needs at least one line",
            ));
        }

        let mut stock = Self::locked_products(order, products)?;

        if order.kind == OrderKind::Sale {
            let mut requested: BTreeMap<ProductId, Decimal> = BTreeMap::new();
            for line in &order.lines {
                *requested.entry(line.product_id).or_default() += line.quantity;
            }
            for (product_id, quantity) in requested {
                let product = stock
                    .get(&product_id)
                    .ok_or_else(|| OrderError::not_found(ResourceKind::Product, product_id))?;
                if let Some(shortfall) = product.shortfall(quantity) {
                    return Err(OrderError::InsufficientStock {
                        product_id: product_id.into_inner(),
                        available: product.stock_on_hand,
                        requested: quantity,
                        shortfall,
                    });
                }
            }
        }

        let mut cost_entries = Vec::new();
        for line in &order.lines {
            let product = stock
                .get_mut(&line.product_id)
                .ok_or_else(|| OrderError::not_found(ResourceKind::Product, line.product_id))?;
            match order.kind {
                OrderKind::Sale => product.issue(line.quantity)?,
                OrderKind::Purchase => {
                    product.receive(line.quantity, line.unit_price);
                    cost_entries.push(CostEntry {
                        product_id: line.product_id,
                        unit_cost: line.unit_price,
                        quantity: line.quantity,
                    });
                }
            }
        }

        let mut lines = order.lines.clone();
        recompute_lines(&mut lines);
        let totals = calculate_totals(&lines);

        Ok(TransitionPlan {
            new_status: OrderStatus::Confirmed,
            lines,
            totals,
            products: stock.into_values().collect(),
            cost_entries,
        })
    }

    /// Plans Confirmed → Annulled.
    ///
    /// Reverses the stock effect of the confirmation. The average cost
    /// blended in by a purchase is left as is.
    ///
    /// # Errors
    ///
    /// - `InvalidState` unless the order is Confirmed
    /// - `NotFound` if a referenced product was not supplied
    /// - `CrossTenant` if a product belongs to another Local
    pub fn plan_annul(
        order: &OrderSnapshot,
        products: impl IntoIterator<Item = ProductStock>,
    ) -> Result<TransitionPlan, OrderError> {
        Self::check_transition(order.status, OrderStatus::Annulled)?;

        let mut stock = Self::locked_products(order, products)?;

        for line in &order.lines {
            let product = stock
                .get_mut(&line.product_id)
                .ok_or_else(|| OrderError::not_found(ResourceKind::Product, line.product_id))?;
            match order.kind {
                OrderKind::Sale => product.return_issue(line.quantity),
                OrderKind::Purchase => product.reverse_receipt(line.quantity),
            }
        }

        let lines = order.lines.clone();
        let totals = calculate_totals(&lines);

        Ok(TransitionPlan {
            new_status: OrderStatus::Annulled,
            lines,
            totals,
            products: stock.into_values().collect(),
            cost_entries: Vec::new(),
        })
    }

    /// Fails unless `current` may move to `to`.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::InvalidState` naming the status `to` requires.
    pub fn check_transition(current: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
        if current.can_transition_to(to) {
            return Ok(());
        }
        let expected = match to {
            OrderStatus::Annulled => OrderStatus::Confirmed,
            OrderStatus::Draft | OrderStatus::Confirmed => OrderStatus::Draft,
        };
        Err(OrderError::InvalidState { current, expected })
    }

    /// Indexes the supplied products, keeping only those the order
    /// references, and tenant-checks them in lock order.
    fn locked_products(
        order: &OrderSnapshot,
        products: impl IntoIterator<Item = ProductStock>,
    ) -> Result<BTreeMap<ProductId, ProductStock>, OrderError> {
        let mut supplied: BTreeMap<ProductId, ProductStock> =
            products.into_iter().map(|p| (p.id, p)).collect();

        let mut locked = BTreeMap::new();
        for id in Self::product_lock_order(&order.lines) {
            let product = supplied
                .remove(&id)
                .ok_or_else(|| OrderError::not_found(ResourceKind::Product, id))?;
            if product.local_id != order.local_id {
                return Err(OrderError::cross_tenant(ResourceKind::Product, id));
            }
            locked.insert(id, product);
        }
        Ok(locked)
    }
}
