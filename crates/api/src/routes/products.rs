//! Product lookup routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use almacen_db::entities::products;
use almacen_shared::types::ProductId;

use crate::{AppState, error::ApiError, extractors::LocalContext};

/// Creates the product routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/{id}", get(get_product))
}

/// Response for a product.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    /// Product ID.
    pub id: Uuid,
    /// Code, unique within the Local.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Units on hand.
    pub stock_on_hand: Decimal,
    /// Weighted-average unit cost.
    pub avg_cost: Decimal,
    /// List price.
    pub sale_price: Decimal,
    /// Reorder threshold.
    pub min_stock: Decimal,
    /// Whether new lines may reference this product.
    pub active: bool,
}

impl From<products::Model> for ProductResponse {
    fn from(p: products::Model) -> Self {
        Self {
            id: p.id,
            code: p.code,
            name: p.name,
            stock_on_hand: p.stock_on_hand,
            avg_cost: p.avg_cost,
            sale_price: p.sale_price,
            min_stock: p.min_stock,
            active: p.active,
        }
    }
}

/// GET `/products` - List the active products of the Local.
async fn list_products(
    State(state): State<AppState>,
    local: LocalContext,
) -> Result<impl IntoResponse, ApiError> {
    let products = state.catalog().list_products(local.local_id()).await?;
    let data: Vec<ProductResponse> = products.into_iter().map(Into::into).collect();

    Ok(Json(data))
}

/// GET `/products/{id}` - Get a product of the Local.
async fn get_product(
    State(state): State<AppState>,
    local: LocalContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .catalog()
        .product(local.local_id(), ProductId::from_uuid(id))
        .await?;

    Ok(Json(ProductResponse::from(product)))
}
