//! Property-based tests for the order state machine.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use almacen_shared::types::{LocalId, OrderId, ProductId};

use super::error::OrderError;
use super::service::OrderService;
use super::types::{LineInput, OrderKind, OrderSnapshot, OrderStatus};
use super::validation::validate_lines;
use crate::inventory::ProductStock;

fn arb_kind() -> impl Strategy<Value = OrderKind> {
    prop_oneof![Just(OrderKind::Purchase), Just(OrderKind::Sale)]
}

fn arb_non_draft() -> impl Strategy<Value = OrderStatus> {
    prop_oneof![Just(OrderStatus::Confirmed), Just(OrderStatus::Annulled)]
}

/// Quantity from 0.0001 to 1,000.0000.
fn quantity() -> impl Strategy<Value = Decimal> {
    (1i64..=10_000_000i64).prop_map(|n| Decimal::new(n, 4))
}

/// Lines over a small product pool so products repeat across lines.
fn arb_lines() -> impl Strategy<Value = Vec<(u8, Decimal, Decimal)>> {
    prop::collection::vec(
        (0u8..4, quantity(), (0i64..=10_000_000i64).prop_map(|n| Decimal::new(n, 4))),
        1..6,
    )
}

fn pid(n: u8) -> ProductId {
    ProductId::from_uuid(Uuid::from_u128(u128::from(n) + 1))
}

fn snapshot(
    kind: OrderKind,
    status: OrderStatus,
    local_id: LocalId,
    raw: &[(u8, Decimal, Decimal)],
) -> OrderSnapshot {
    let inputs: Vec<LineInput> = raw
        .iter()
        .map(|(p, q, price)| LineInput::new(pid(*p), *q, *price))
        .collect();
    OrderSnapshot {
        id: OrderId::new(),
        local_id,
        kind,
        status,
        lines: validate_lines(&inputs).unwrap(),
    }
}

/// Every product in the pool with the given stock and average cost.
fn pool(local_id: LocalId, on_hand: Decimal, avg: Decimal) -> Vec<ProductStock> {
    (0u8..4)
        .map(|n| ProductStock {
            id: pid(n),
            local_id,
            stock_on_hand: on_hand,
            avg_cost: avg,
        })
        .collect()
}

fn stock_of(products: &[ProductStock], id: ProductId) -> Option<Decimal> {
    products.iter().find(|p| p.id == id).map(|p| p.stock_on_hand)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Confirming a non-Draft order always fails with InvalidState.
    #[test]
    fn prop_confirm_non_draft_rejected(
        kind in arb_kind(),
        status in arb_non_draft(),
        raw in arb_lines(),
        attempts in 1usize..5,
    ) {
        let local = LocalId::new();
        let order = snapshot(kind, status, local, &raw);

        for _ in 0..attempts {
            let err = OrderService::plan_confirm(&order, pool(local, Decimal::from(100_000), Decimal::ONE))
                .unwrap_err();
            let is_invalid_state = matches!(
                err,
                OrderError::InvalidState { current, expected: OrderStatus::Draft } if current == status
            );
            prop_assert!(is_invalid_state);
        }
    }

    /// Sale confirm then annul restores every product's stock exactly.
    #[test]
    fn prop_sale_round_trip_restores_stock(
        raw in arb_lines(),
        extra in (0i64..=1_000_000i64).prop_map(|n| Decimal::new(n, 4)),
    ) {
        let local = LocalId::new();
        let order = snapshot(OrderKind::Sale, OrderStatus::Draft, local, &raw);
        let total_requested: Decimal = order.lines.iter().map(|l| l.quantity).sum();
        let before = pool(local, total_requested + extra, Decimal::ONE);

        let confirmed = OrderService::plan_confirm(&order, before.clone()).unwrap();
        prop_assert_eq!(confirmed.new_status, OrderStatus::Confirmed);

        let mut after_confirm = order.clone();
        after_confirm.status = confirmed.new_status;
        let annulled = OrderService::plan_annul(&after_confirm, confirmed.products).unwrap();

        for product in &annulled.products {
            prop_assert_eq!(Some(product.stock_on_hand), stock_of(&before, product.id));
        }
    }

    /// Purchase annul restores stock but keeps the blended average cost.
    #[test]
    fn prop_purchase_annul_keeps_average(
        raw in arb_lines(),
        on_hand in (0i64..=10_000_000i64).prop_map(|n| Decimal::new(n, 4)),
    ) {
        let local = LocalId::new();
        let order = snapshot(OrderKind::Purchase, OrderStatus::Draft, local, &raw);
        let before = pool(local, on_hand, Decimal::from(100));

        let confirmed = OrderService::plan_confirm(&order, before.clone()).unwrap();
        prop_assert_eq!(confirmed.cost_entries.len(), order.lines.len());

        let mut after_confirm = order.clone();
        after_confirm.status = confirmed.new_status;
        let blended = confirmed.products.clone();
        let annulled = OrderService::plan_annul(&after_confirm, confirmed.products).unwrap();

        for product in &annulled.products {
            prop_assert_eq!(Some(product.stock_on_hand), stock_of(&before, product.id));
            let avg_after_confirm = blended.iter().find(|p| p.id == product.id).map(|p| p.avg_cost);
            prop_assert_eq!(Some(product.avg_cost), avg_after_confirm);
        }
    }

    /// Receiving into any stock level, negative included, never yields a negative average.
    #[test]
    fn prop_purchase_average_non_negative(
        raw in arb_lines(),
        on_hand in (-10_000_000i64..=10_000_000i64).prop_map(|n| Decimal::new(n, 4)),
        avg in (0i64..=10_000_000i64).prop_map(|n| Decimal::new(n, 4)),
    ) {
        let local = LocalId::new();
        let order = snapshot(OrderKind::Purchase, OrderStatus::Draft, local, &raw);

        let confirmed = OrderService::plan_confirm(&order, pool(local, on_hand, avg)).unwrap();

        for product in &confirmed.products {
            prop_assert!(product.avg_cost >= Decimal::ZERO);
        }
    }

    /// A sale short on any product yields InsufficientStock for a short product.
    #[test]
    fn prop_short_sale_rejected(raw in arb_lines(), short in 0u8..4) {
        let local = LocalId::new();
        let order = snapshot(OrderKind::Sale, OrderStatus::Draft, local, &raw);
        let total_requested: Decimal = order.lines.iter().map(|l| l.quantity).sum();
        let short_id = pid(short);
        prop_assume!(order.lines.iter().any(|l| l.product_id == short_id));

        let products: Vec<ProductStock> = pool(local, total_requested, Decimal::ONE)
            .into_iter()
            .map(|mut p| {
                if p.id == short_id {
                    p.stock_on_hand = Decimal::ZERO;
                }
                p
            })
            .collect();

        let err = OrderService::plan_confirm(&order, products).unwrap_err();
        let names_short = matches!(
            err,
            OrderError::InsufficientStock { product_id, .. } if product_id == short_id.into_inner()
        );
        prop_assert!(names_short);
    }
}
