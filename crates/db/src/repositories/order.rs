//! Order repository for purchase and sale persistence and transitions.
//!
//! Every mutating method runs in a single database transaction. Any error
//! returns early with `?`, dropping the transaction and rolling back every
//! write made so far.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use almacen_core::order::{
    LineInput, OrderError, OrderKind, OrderLine, OrderService, OrderSnapshot, OrderStatus,
    OrderTotals, ResourceKind, TransitionPlan,
};
use almacen_shared::types::{LocalId, OrderId, PageRequest, ProductId};

use crate::entities::{cost_history, order_lines, orders, products, sea_orm_active_enums};
use crate::locking::{begin_with_lock_timeout, db_err};

use super::catalog::{counterparty_owner, lock_products, product_infos};

/// Input for creating an order.
#[derive(Debug, Clone)]
pub struct CreateOrderInput {
    /// Owning Local.
    pub local_id: LocalId,
    /// Purchase or sale.
    pub kind: OrderKind,
    /// Provider (purchase, required) or customer (sale, optional).
    pub counterparty_id: Option<Uuid>,
    /// Business timestamp; defaults to now.
    pub occurred_at: Option<DateTime<Utc>>,
    /// Line items, at least one.
    pub lines: Vec<LineInput>,
}

/// Input for updating a Draft order. `None` fields are left unchanged.
///
/// A sale's customer is removed with `clear_counterparty`; a purchase
/// cannot drop its provider.
#[derive(Debug, Clone, Default)]
pub struct UpdateOrderInput {
    /// New provider or customer.
    pub counterparty_id: Option<Uuid>,
    /// Removes the counterparty when `counterparty_id` is `None`.
    pub clear_counterparty: bool,
    /// New business timestamp.
    pub occurred_at: Option<DateTime<Utc>>,
    /// Replacement line set.
    pub lines: Option<Vec<LineInput>>,
}

/// Filter options for listing orders.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Filter by status.
    pub status: Option<OrderStatus>,
    /// Filter by occurred_at range start (inclusive).
    pub occurred_from: Option<DateTime<Utc>>,
    /// Filter by occurred_at range end (inclusive).
    pub occurred_to: Option<DateTime<Utc>>,
}

/// Order header with its lines, ordered by line number.
#[derive(Debug, Clone)]
pub struct OrderWithLines {
    /// Order header.
    pub order: orders::Model,
    /// Order lines.
    pub lines: Vec<order_lines::Model>,
}

/// Which transition to run.
#[derive(Debug, Clone, Copy)]
enum Transition {
    Confirm,
    Annul,
}

impl Transition {
    const fn target(self) -> OrderStatus {
        match self {
            Self::Confirm => OrderStatus::Confirmed,
            Self::Annul => OrderStatus::Annulled,
        }
    }
}

/// Order repository for purchases and sales.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    db: DatabaseConnection,
    lock_timeout: Option<Duration>,
}

impl OrderRepository {
    /// Creates a new order repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            lock_timeout: None,
        }
    }

    /// Bounds row-lock waits in confirm, annul and update.
    #[must_use]
    pub const fn with_lock_timeout(mut self, lock_timeout: Option<Duration>) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    /// Creates a Draft order with its lines and totals.
    ///
    /// # Errors
    ///
    /// - `Validation` for a bad line, a missing provider on a purchase
    /// - `NotFound` for an unknown product or counterparty
    /// - `CrossTenant` for a product or counterparty of another Local
    pub async fn create(&self, input: CreateOrderInput) -> Result<OrderWithLines, OrderError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let (lines, totals) = prepare_lines(&txn, input.local_id, &input.lines).await?;
        let (provider_id, customer_id) =
            resolve_counterparty(&txn, input.local_id, input.kind, input.counterparty_id).await?;

        let now = Utc::now();
        let order_id = OrderId::new().into_inner();
        let order = orders::ActiveModel {
            id: Set(order_id),
            local_id: Set(input.local_id.into_inner()),
            kind: Set(input.kind.into()),
            provider_id: Set(provider_id),
            customer_id: Set(customer_id),
            status: Set(sea_orm_active_enums::OrderStatus::Draft),
            occurred_at: Set(input.occurred_at.unwrap_or(now).into()),
            subtotal: Set(totals.subtotal),
            discount_total: Set(totals.discount_total),
            tax_total: Set(totals.tax_total),
            grand_total: Set(totals.grand_total),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        let lines = insert_lines(&txn, order_id, &lines).await?;

        txn.commit().await.map_err(db_err)?;

        Ok(OrderWithLines { order, lines })
    }

    /// Gets an order of the given kind and Local.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such order exists in this Local.
    pub async fn get(
        &self,
        kind: OrderKind,
        local_id: LocalId,
        order_id: OrderId,
    ) -> Result<OrderWithLines, OrderError> {
        let order = scoped(kind, local_id, order_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| OrderError::not_found(ResourceKind::Order, order_id))?;
        let lines = load_lines(&self.db, order.id).await?;

        Ok(OrderWithLines { order, lines })
    }

    /// Lists order headers of a Local, newest first.
    ///
    /// Returns the requested page and the total number of matching orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(
        &self,
        kind: OrderKind,
        local_id: LocalId,
        filter: &OrderFilter,
        page: &PageRequest,
    ) -> Result<(Vec<orders::Model>, u64), OrderError> {
        let page = page.clamped();
        let mut query = orders::Entity::find()
            .filter(orders::Column::LocalId.eq(local_id.into_inner()))
            .filter(orders::Column::Kind.eq(sea_orm_active_enums::OrderKind::from(kind)));

        if let Some(status) = filter.status {
            query = query.filter(
                orders::Column::Status.eq(sea_orm_active_enums::OrderStatus::from(status)),
            );
        }
        if let Some(from) = filter.occurred_from {
            query = query.filter(orders::Column::OccurredAt.gte(from));
        }
        if let Some(to) = filter.occurred_to {
            query = query.filter(orders::Column::OccurredAt.lte(to));
        }

        let paginator = query
            .order_by_desc(orders::Column::OccurredAt)
            .order_by_desc(orders::Column::Id)
            .paginate(&self.db, page.limit());

        let total = paginator.num_items().await.map_err(db_err)?;
        let orders = paginator.fetch_page(page.index()).await.map_err(db_err)?;

        Ok((orders, total))
    }

    /// Updates the header and optionally replaces the lines of a Draft order.
    ///
    /// The order row is locked for the duration. A supplied line set
    /// replaces the previous one entirely and totals are recomputed.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the order does not exist in this Local
    /// - `InvalidState` unless the order is Draft
    /// - the same line and counterparty errors as [`Self::create`]
    pub async fn update(
        &self,
        kind: OrderKind,
        local_id: LocalId,
        order_id: OrderId,
        input: UpdateOrderInput,
    ) -> Result<OrderWithLines, OrderError> {
        let txn = begin_with_lock_timeout(&self.db, self.lock_timeout)
            .await
            .map_err(db_err)?;

        let order = lock_order(&txn, kind, local_id, order_id).await?;
        OrderService::ensure_editable(order.status.into())?;

        let mut header: orders::ActiveModel = order.clone().into();

        if input.counterparty_id.is_some() || input.clear_counterparty {
            let (provider_id, customer_id) =
                resolve_counterparty(&txn, local_id, kind, input.counterparty_id).await?;
            header.provider_id = Set(provider_id);
            header.customer_id = Set(customer_id);
        }
        if let Some(occurred_at) = input.occurred_at {
            header.occurred_at = Set(occurred_at.into());
        }

        let lines = if let Some(inputs) = input.lines {
            let (lines, totals) = prepare_lines(&txn, local_id, &inputs).await?;
            order_lines::Entity::delete_many()
                .filter(order_lines::Column::OrderId.eq(order.id))
                .exec(&txn)
                .await
                .map_err(db_err)?;
            set_totals(&mut header, &totals);
            insert_lines(&txn, order.id, &lines).await?
        } else {
            load_lines(&txn, order.id).await?
        };

        header.updated_at = Set(Utc::now().into());
        let order = header.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        Ok(OrderWithLines { order, lines })
    }

    /// Replaces every line of a Draft order and recomputes its totals.
    ///
    /// # Errors
    ///
    /// See [`Self::update`].
    pub async fn replace_lines(
        &self,
        kind: OrderKind,
        local_id: LocalId,
        order_id: OrderId,
        lines: Vec<LineInput>,
    ) -> Result<OrderWithLines, OrderError> {
        self.update(
            kind,
            local_id,
            order_id,
            UpdateOrderInput {
                lines: Some(lines),
                ..Default::default()
            },
        )
        .await
    }

    /// Confirms a Draft order, applying its inventory effect.
    ///
    /// Locks the order, then every referenced product in ascending id
    /// order. A sale is checked for stock on all lines before any product
    /// is written. Purchases also blend the average cost and record cost
    /// history.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the order or a product does not exist
    /// - `InvalidState` unless the order is Draft
    /// - `CrossTenant` if a product belongs to another Local
    /// - `InsufficientStock` if a sale needs more than is on hand
    /// - `LockConflict` if a lock wait timed out or deadlocked
    pub async fn confirm(
        &self,
        kind: OrderKind,
        local_id: LocalId,
        order_id: OrderId,
    ) -> Result<OrderWithLines, OrderError> {
        self.transition(kind, local_id, order_id, Transition::Confirm)
            .await
    }

    /// Annuls a Confirmed order, reversing its stock effect.
    ///
    /// Average cost is not reversed.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the order or a product does not exist
    /// - `InvalidState` unless the order is Confirmed
    /// - `CrossTenant` if a product belongs to another Local
    /// - `LockConflict` if a lock wait timed out or deadlocked
    pub async fn annul(
        &self,
        kind: OrderKind,
        local_id: LocalId,
        order_id: OrderId,
    ) -> Result<OrderWithLines, OrderError> {
        self.transition(kind, local_id, order_id, Transition::Annul)
            .await
    }

    async fn transition(
        &self,
        kind: OrderKind,
        local_id: LocalId,
        order_id: OrderId,
        transition: Transition,
    ) -> Result<OrderWithLines, OrderError> {
        let txn = begin_with_lock_timeout(&self.db, self.lock_timeout)
            .await
            .map_err(db_err)?;

        let order = lock_order(&txn, kind, local_id, order_id).await?;
        OrderService::check_transition(order.status.into(), transition.target())?;

        let line_rows = load_lines(&txn, order.id).await?;
        let snapshot = OrderSnapshot {
            id: order_id,
            local_id,
            kind,
            status: order.status.into(),
            lines: line_rows.iter().map(to_order_line).collect(),
        };

        let lock_order_ids = OrderService::product_lock_order(&snapshot.lines);
        debug!(order_id = %order_id, products = lock_order_ids.len(), "locking products");
        let products = lock_products(&txn, &lock_order_ids).await.map_err(db_err)?;

        let plan = match transition {
            Transition::Confirm => OrderService::plan_confirm(&snapshot, products)?,
            Transition::Annul => OrderService::plan_annul(&snapshot, products)?,
        };

        let result = apply_plan(&txn, order, line_rows, plan).await?;

        txn.commit().await.map_err(db_err)?;

        Ok(result)
    }
}

/// Orders of one kind in one Local, by id.
fn scoped(
    kind: OrderKind,
    local_id: LocalId,
    order_id: OrderId,
) -> sea_orm::Select<orders::Entity> {
    orders::Entity::find_by_id(order_id.into_inner())
        .filter(orders::Column::LocalId.eq(local_id.into_inner()))
        .filter(orders::Column::Kind.eq(sea_orm_active_enums::OrderKind::from(kind)))
}

/// Locks the order row with `FOR UPDATE`.
async fn lock_order(
    txn: &DatabaseTransaction,
    kind: OrderKind,
    local_id: LocalId,
    order_id: OrderId,
) -> Result<orders::Model, OrderError> {
    scoped(kind, local_id, order_id)
        .lock_exclusive()
        .one(txn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| OrderError::not_found(ResourceKind::Order, order_id))
}

async fn load_lines<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
) -> Result<Vec<order_lines::Model>, OrderError> {
    order_lines::Entity::find()
        .filter(order_lines::Column::OrderId.eq(order_id))
        .order_by_asc(order_lines::Column::LineNo)
        .all(conn)
        .await
        .map_err(db_err)
}

/// Validates lines and resolves their products against the database.
async fn prepare_lines(
    txn: &DatabaseTransaction,
    local_id: LocalId,
    inputs: &[LineInput],
) -> Result<(Vec<OrderLine>, OrderTotals), OrderError> {
    let ids: Vec<ProductId> = inputs.iter().map(|l| l.product_id).collect();
    let known = product_infos(txn, &ids).await.map_err(db_err)?;

    OrderService::prepare_lines(local_id, inputs, |id| known.get(&id).cloned())
}

/// Returns `(provider_id, customer_id)` for the order header.
async fn resolve_counterparty(
    txn: &DatabaseTransaction,
    local_id: LocalId,
    kind: OrderKind,
    counterparty_id: Option<Uuid>,
) -> Result<(Option<Uuid>, Option<Uuid>), OrderError> {
    let resource = match kind {
        OrderKind::Purchase => ResourceKind::Provider,
        OrderKind::Sale => ResourceKind::Customer,
    };

    let Some(id) = counterparty_id else {
        return match kind {
            OrderKind::Purchase => Err(OrderError::validation(
                "provider_id",
                "a purchase needs a provider",
            )),
            OrderKind::Sale => Ok((None, None)),
        };
    };

    let owner = counterparty_owner(txn, resource, id)
        .await
        .map_err(db_err)?;
    OrderService::check_counterparty(local_id, resource, id, owner)?;

    Ok(match kind {
        OrderKind::Purchase => (Some(id), None),
        OrderKind::Sale => (None, Some(id)),
    })
}

async fn insert_lines(
    txn: &DatabaseTransaction,
    order_id: Uuid,
    lines: &[OrderLine],
) -> Result<Vec<order_lines::Model>, OrderError> {
    let now = Utc::now();
    let mut inserted = Vec::with_capacity(lines.len());

    for line in lines {
        let row = order_lines::ActiveModel {
            id: Set(Uuid::now_v7()),
            order_id: Set(order_id),
            line_no: Set(line.line_no),
            product_id: Set(line.product_id.into_inner()),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
            discount: Set(line.discount),
            tax: Set(line.tax),
            line_total: Set(line.line_total),
            created_at: Set(now.into()),
        }
        .insert(txn)
        .await
        .map_err(db_err)?;
        inserted.push(row);
    }

    inserted.sort_by_key(|l| l.line_no);
    Ok(inserted)
}

fn set_totals(header: &mut orders::ActiveModel, totals: &OrderTotals) {
    header.subtotal = Set(totals.subtotal);
    header.discount_total = Set(totals.discount_total);
    header.tax_total = Set(totals.tax_total);
    header.grand_total = Set(totals.grand_total);
}

fn to_order_line(row: &order_lines::Model) -> OrderLine {
    OrderLine {
        line_no: row.line_no,
        product_id: ProductId::from_uuid(row.product_id),
        quantity: row.quantity,
        unit_price: row.unit_price,
        discount: row.discount,
        tax: row.tax,
        line_total: row.line_total,
    }
}

/// Writes a transition plan: products, line totals, cost history, header.
async fn apply_plan(
    txn: &DatabaseTransaction,
    order: orders::Model,
    line_rows: Vec<order_lines::Model>,
    plan: TransitionPlan,
) -> Result<OrderWithLines, OrderError> {
    let now = Utc::now();

    for product in &plan.products {
        products::ActiveModel {
            id: Set(product.id.into_inner()),
            stock_on_hand: Set(product.stock_on_hand),
            avg_cost: Set(product.avg_cost),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .update(txn)
        .await
        .map_err(db_err)?;
    }

    let mut lines = Vec::with_capacity(line_rows.len());
    for (row, line) in line_rows.into_iter().zip(&plan.lines) {
        if row.line_total == line.line_total {
            lines.push(row);
            continue;
        }
        let mut active: order_lines::ActiveModel = row.into();
        active.line_total = Set(line.line_total);
        lines.push(active.update(txn).await.map_err(db_err)?);
    }

    for entry in &plan.cost_entries {
        cost_history::ActiveModel {
            id: Set(Uuid::now_v7()),
            product_id: Set(entry.product_id.into_inner()),
            provider_id: Set(order.provider_id),
            order_id: Set(order.id),
            unit_cost: Set(entry.unit_cost),
            quantity: Set(entry.quantity),
            occurred_at: Set(order.occurred_at),
            created_at: Set(now.into()),
        }
        .insert(txn)
        .await
        .map_err(db_err)?;
    }

    let mut header: orders::ActiveModel = order.into();
    header.status = Set(plan.new_status.into());
    set_totals(&mut header, &plan.totals);
    header.updated_at = Set(now.into());
    let order = header.update(txn).await.map_err(db_err)?;

    Ok(OrderWithLines { order, lines })
}
