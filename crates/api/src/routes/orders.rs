//! Purchase and sale routes.
//!
//! Both kinds share these handlers; the router layers an `OrderKind`
//! extension over each path prefix so handlers know which one they serve.

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use almacen_core::order::{LineInput, OrderKind, OrderStatus};
use almacen_db::entities::{order_lines, orders};
use almacen_db::repositories::{CreateOrderInput, OrderFilter, OrderWithLines, UpdateOrderInput};
use almacen_shared::types::{OrderId, PageRequest, PageResponse};

use crate::{
    AppState,
    error::ApiError,
    extractors::{AppJson, LocalContext},
};

/// Creates the purchase and sale routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(kind_routes("/purchases", OrderKind::Purchase))
        .merge(kind_routes("/sales", OrderKind::Sale))
}

fn kind_routes(base: &str, kind: OrderKind) -> Router<AppState> {
    Router::new()
        .route(base, get(list_orders).post(create_order))
        .route(&format!("{base}/{{id}}"), get(get_order).patch(update_order))
        .route(&format!("{base}/{{id}}/lines"), put(replace_lines))
        .route(&format!("{base}/{{id}}/confirm"), post(confirm_order))
        .route(&format!("{base}/{{id}}/annul"), post(annul_order))
        .layer(Extension(kind))
}

/// Request body for creating an order.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// Provider (purchase) or customer (sale).
    #[serde(default, alias = "provider_id", alias = "customer_id")]
    pub counterparty_id: Option<Uuid>,
    /// Business timestamp; defaults to now.
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
    /// Line items.
    pub lines: Vec<LineInput>,
}

/// Request body for updating a Draft order.
#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    /// New provider (purchase) or customer (sale).
    #[serde(default, alias = "provider_id", alias = "customer_id")]
    pub counterparty_id: Option<Uuid>,
    /// Removes the customer of a sale.
    #[serde(default)]
    pub clear_counterparty: bool,
    /// New business timestamp.
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
    /// Replacement line set.
    #[serde(default)]
    pub lines: Option<Vec<LineInput>>,
}

/// Request body for replacing the lines of a Draft order.
#[derive(Debug, Deserialize)]
pub struct ReplaceLinesRequest {
    /// Replacement line set.
    pub lines: Vec<LineInput>,
}

/// Query parameters for listing orders.
#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersQuery {
    /// Filter by status.
    pub status: Option<OrderStatus>,
    /// Orders that occurred at or after this instant.
    pub from: Option<DateTime<Utc>>,
    /// Orders that occurred at or before this instant.
    pub to: Option<DateTime<Utc>>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

impl ListOrdersQuery {
    fn page_request(&self) -> PageRequest {
        let default = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(default.page),
            per_page: self.per_page.unwrap_or(default.per_page),
        }
        .clamped()
    }
}

/// Order header as returned by list endpoints.
#[derive(Debug, Serialize)]
pub struct OrderSummary {
    /// Order ID.
    pub id: Uuid,
    /// Owning Local.
    pub local_id: Uuid,
    /// Purchase or sale.
    pub kind: OrderKind,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Provider, for purchases.
    pub provider_id: Option<Uuid>,
    /// Customer, for sales.
    pub customer_id: Option<Uuid>,
    /// Business timestamp.
    pub occurred_at: DateTime<Utc>,
    /// Sum of line gross amounts.
    pub subtotal: Decimal,
    /// Sum of line discounts.
    pub discount_total: Decimal,
    /// Sum of line taxes.
    pub tax_total: Decimal,
    /// `subtotal - discount_total + tax_total`.
    pub grand_total: Decimal,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl From<orders::Model> for OrderSummary {
    fn from(o: orders::Model) -> Self {
        Self {
            id: o.id,
            local_id: o.local_id,
            kind: o.kind.into(),
            status: o.status.into(),
            provider_id: o.provider_id,
            customer_id: o.customer_id,
            occurred_at: o.occurred_at.with_timezone(&Utc),
            subtotal: o.subtotal,
            discount_total: o.discount_total,
            tax_total: o.tax_total,
            grand_total: o.grand_total,
            created_at: o.created_at.with_timezone(&Utc),
            updated_at: o.updated_at.with_timezone(&Utc),
        }
    }
}

/// A line of an order response.
#[derive(Debug, Serialize)]
pub struct OrderLineResponse {
    /// Line number, unique within the order.
    pub line_no: i32,
    /// Product ID.
    pub product_id: Uuid,
    /// Units.
    pub quantity: Decimal,
    /// Unit price (sale) or unit cost (purchase).
    pub unit_price: Decimal,
    /// Discount amount.
    pub discount: Decimal,
    /// Tax amount.
    pub tax: Decimal,
    /// `round(quantity * unit_price) - discount + tax`.
    pub line_total: Decimal,
}

impl From<order_lines::Model> for OrderLineResponse {
    fn from(l: order_lines::Model) -> Self {
        Self {
            line_no: l.line_no,
            product_id: l.product_id,
            quantity: l.quantity,
            unit_price: l.unit_price,
            discount: l.discount,
            tax: l.tax,
            line_total: l.line_total,
        }
    }
}

/// Full order with lines.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    /// Order header.
    #[serde(flatten)]
    pub order: OrderSummary,
    /// Lines ordered by line number.
    pub lines: Vec<OrderLineResponse>,
}

impl From<OrderWithLines> for OrderResponse {
    fn from(o: OrderWithLines) -> Self {
        Self {
            order: o.order.into(),
            lines: o.lines.into_iter().map(Into::into).collect(),
        }
    }
}

/// GET `/{kind}` - List orders of the Local, newest first.
async fn list_orders(
    State(state): State<AppState>,
    Extension(kind): Extension<OrderKind>,
    local: LocalContext,
    Query(query): Query<ListOrdersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = query.page_request();
    let filter = OrderFilter {
        status: query.status,
        occurred_from: query.from,
        occurred_to: query.to,
    };

    let (orders, total) = state
        .orders()
        .list(kind, local.local_id(), &filter, &page)
        .await?;

    let data: Vec<OrderSummary> = orders.into_iter().map(Into::into).collect();
    Ok(Json(PageResponse::new(data, page.page, page.per_page, total)))
}

/// POST `/{kind}` - Create a Draft order.
async fn create_order(
    State(state): State<AppState>,
    Extension(kind): Extension<OrderKind>,
    local: LocalContext,
    AppJson(payload): AppJson<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = CreateOrderInput {
        local_id: local.local_id(),
        kind,
        counterparty_id: payload.counterparty_id,
        occurred_at: payload.occurred_at,
        lines: payload.lines,
    };

    let order = state.orders().create(input).await?;

    info!(
        local_id = %local.local_id(),
        order_id = %order.order.id,
        kind = %kind,
        "Order created"
    );

    Ok((StatusCode::CREATED, Json(OrderResponse::from(order))))
}

/// GET `/{kind}/{id}` - Get an order with its lines.
async fn get_order(
    State(state): State<AppState>,
    Extension(kind): Extension<OrderKind>,
    local: LocalContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .orders()
        .get(kind, local.local_id(), OrderId::from_uuid(id))
        .await?;

    Ok(Json(OrderResponse::from(order)))
}

/// PATCH `/{kind}/{id}` - Update a Draft order.
async fn update_order(
    State(state): State<AppState>,
    Extension(kind): Extension<OrderKind>,
    local: LocalContext,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = UpdateOrderInput {
        counterparty_id: payload.counterparty_id,
        clear_counterparty: payload.clear_counterparty,
        occurred_at: payload.occurred_at,
        lines: payload.lines,
    };

    let order = state
        .orders()
        .update(kind, local.local_id(), OrderId::from_uuid(id), input)
        .await?;

    Ok(Json(OrderResponse::from(order)))
}

/// PUT `/{kind}/{id}/lines` - Replace the lines of a Draft order.
async fn replace_lines(
    State(state): State<AppState>,
    Extension(kind): Extension<OrderKind>,
    local: LocalContext,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<ReplaceLinesRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .orders()
        .replace_lines(kind, local.local_id(), OrderId::from_uuid(id), payload.lines)
        .await?;

    Ok(Json(OrderResponse::from(order)))
}

/// POST `/{kind}/{id}/confirm` - Confirm a Draft order.
async fn confirm_order(
    State(state): State<AppState>,
    Extension(kind): Extension<OrderKind>,
    local: LocalContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .orders()
        .confirm(kind, local.local_id(), OrderId::from_uuid(id))
        .await?;

    info!(
        local_id = %local.local_id(),
        order_id = %id,
        kind = %kind,
        grand_total = %order.order.grand_total,
        "Order confirmed"
    );

    Ok(Json(OrderResponse::from(order)))
}

/// POST `/{kind}/{id}/annul` - Annul a Confirmed order.
async fn annul_order(
    State(state): State<AppState>,
    Extension(kind): Extension<OrderKind>,
    local: LocalContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .orders()
        .annul(kind, local.local_id(), OrderId::from_uuid(id))
        .await?;

    info!(
        local_id = %local.local_id(),
        order_id = %id,
        kind = %kind,
        "Order annulled"
    );

    Ok(Json(OrderResponse::from(order)))
}
