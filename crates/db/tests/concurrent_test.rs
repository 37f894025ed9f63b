//! Concurrent confirmation tests.
//!
//! These verify that:
//! - Competing sales never drive stock below zero
//! - Orders touching the same products in opposite line order do not deadlock
//! - A bounded lock wait surfaces as a retryable `LockConflict`

#![allow(clippy::uninlined_format_args)]

mod common;

use std::time::Duration;

use futures::future::join_all;
use rust_decimal_macros::dec;
use sea_orm::{EntityTrait, QuerySelect, TransactionTrait};

use almacen_core::order::{LineInput, OrderError, OrderKind};
use almacen_db::entities::products;
use almacen_db::repositories::{CreateOrderInput, OrderRepository};
use almacen_shared::types::OrderId;

use common::{connect, create_product, create_tenant};

#[tokio::test]
async fn test_competing_sales_never_oversell() {
    let Some(db) = connect().await else { return };
    let tenant = create_tenant(&db).await.unwrap();
    let product_id = create_product(&db, tenant.local_id, dec!(5), dec!(1))
        .await
        .unwrap();
    let repo = OrderRepository::new(db.clone());

    let mut ids = Vec::new();
    for _ in 0..10 {
        let sale = repo
            .create(CreateOrderInput {
                local_id: tenant.local_id,
                kind: OrderKind::Sale,
                counterparty_id: None,
                occurred_at: None,
                lines: vec![LineInput::new(product_id, dec!(1), dec!(10))],
            })
            .await
            .unwrap();
        ids.push(OrderId::from_uuid(sale.order.id));
    }

    let results = join_all(ids.iter().map(|id| {
        let repo = repo.clone();
        let local_id = tenant.local_id;
        let id = *id;
        tokio::spawn(async move { repo.confirm(OrderKind::Sale, local_id, id).await })
    }))
    .await;

    let mut confirmed = 0;
    let mut short = 0;
    for result in results {
        match result.unwrap() {
            Ok(_) => confirmed += 1,
            Err(OrderError::InsufficientStock { .. }) => short += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(confirmed, 5);
    assert_eq!(short, 5);

    let product = products::Entity::find_by_id(product_id.into_inner())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(product.stock_on_hand, dec!(0));
}

#[tokio::test]
async fn test_opposite_line_order_does_not_deadlock() {
    let Some(db) = connect().await else { return };
    let tenant = create_tenant(&db).await.unwrap();
    let a = create_product(&db, tenant.local_id, dec!(0), dec!(0))
        .await
        .unwrap();
    let b = create_product(&db, tenant.local_id, dec!(0), dec!(0))
        .await
        .unwrap();
    let repo = OrderRepository::new(db.clone());

    let mut ids = Vec::new();
    for i in 0..20 {
        let lines = if i % 2 == 0 {
            vec![
                LineInput::new(a, dec!(1), dec!(10)),
                LineInput::new(b, dec!(1), dec!(20)),
            ]
        } else {
            vec![
                LineInput::new(b, dec!(1), dec!(20)),
                LineInput::new(a, dec!(1), dec!(10)),
            ]
        };
        let purchase = repo
            .create(CreateOrderInput {
                local_id: tenant.local_id,
                kind: OrderKind::Purchase,
                counterparty_id: Some(tenant.provider_id),
                occurred_at: None,
                lines,
            })
            .await
            .unwrap();
        ids.push(OrderId::from_uuid(purchase.order.id));
    }

    let results = join_all(ids.iter().map(|id| {
        let repo = repo.clone();
        let local_id = tenant.local_id;
        let id = *id;
        tokio::spawn(async move { repo.confirm(OrderKind::Purchase, local_id, id).await })
    }))
    .await;

    for result in results {
        result.unwrap().unwrap();
    }

    for (id, cost) in [(a, dec!(10)), (b, dec!(20))] {
        let product = products::Entity::find_by_id(id.into_inner())
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(product.stock_on_hand, dec!(20));
        assert_eq!(product.avg_cost, cost);
    }
}

#[tokio::test]
async fn test_lock_timeout_is_lock_conflict() {
    let Some(db) = connect().await else { return };
    let tenant = create_tenant(&db).await.unwrap();
    let product_id = create_product(&db, tenant.local_id, dec!(5), dec!(1))
        .await
        .unwrap();
    let repo =
        OrderRepository::new(db.clone()).with_lock_timeout(Some(Duration::from_millis(100)));

    let sale = repo
        .create(CreateOrderInput {
            local_id: tenant.local_id,
            kind: OrderKind::Sale,
            counterparty_id: None,
            occurred_at: None,
            lines: vec![LineInput::new(product_id, dec!(1), dec!(10))],
        })
        .await
        .unwrap();

    // Hold the product row lock in another transaction.
    let holder = db.begin().await.unwrap();
    products::Entity::find_by_id(product_id.into_inner())
        .lock_exclusive()
        .one(&holder)
        .await
        .unwrap();

    let err = repo
        .confirm(
            OrderKind::Sale,
            tenant.local_id,
            OrderId::from_uuid(sale.order.id),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::LockConflict(_)), "got {err:?}");
    assert!(err.is_retryable());

    holder.rollback().await.unwrap();

    repo.confirm(
        OrderKind::Sale,
        tenant.local_id,
        OrderId::from_uuid(sale.order.id),
    )
    .await
    .unwrap();
}
