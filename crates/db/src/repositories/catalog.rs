//! Catalog lookups used by the order flows.
//!
//! Products and counterparties are read here, never created or edited.
//! Every lookup is by id only, without a Local filter, so callers can tell
//! a missing row from one that belongs to another Local.

use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use almacen_core::inventory::ProductStock;
use almacen_core::order::{OrderError, ProductInfo, ResourceKind};
use almacen_shared::types::{LocalId, ProductId};

use crate::entities::{customers, products, providers};
use crate::locking::db_err;

/// Loads acceptance info for the given products.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn product_infos<C: ConnectionTrait>(
    conn: &C,
    ids: &[ProductId],
) -> Result<HashMap<ProductId, ProductInfo>, DbErr> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = products::Entity::find()
        .filter(products::Column::Id.is_in(ids.iter().map(|id| id.into_inner())))
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|p| {
            let id = ProductId::from_uuid(p.id);
            (
                id,
                ProductInfo {
                    id,
                    local_id: LocalId::from_uuid(p.local_id),
                    active: p.active,
                },
            )
        })
        .collect())
}

/// Locks the given product rows with `FOR UPDATE`, in ascending id order.
///
/// `ids` must already be sorted and distinct. Rows are locked as the
/// ordered scan returns them, so two transactions locking overlapping sets
/// always queue in the same order.
///
/// # Errors
///
/// Returns an error if the query fails or a lock cannot be acquired.
pub async fn lock_products<C: ConnectionTrait>(
    conn: &C,
    ids: &[ProductId],
) -> Result<Vec<ProductStock>, DbErr> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = products::Entity::find()
        .filter(products::Column::Id.is_in(ids.iter().map(|id| id.into_inner())))
        .order_by_asc(products::Column::Id)
        .lock_exclusive()
        .all(conn)
        .await?;

    Ok(rows.into_iter().map(to_stock).collect())
}

fn to_stock(p: products::Model) -> ProductStock {
    ProductStock {
        id: ProductId::from_uuid(p.id),
        local_id: LocalId::from_uuid(p.local_id),
        stock_on_hand: p.stock_on_hand,
        avg_cost: p.avg_cost,
    }
}

/// Returns the Local owning a counterparty, or `None` if it does not exist.
///
/// # Errors
///
/// Returns an error if the query fails. `resource` must be a counterparty.
pub async fn counterparty_owner<C: ConnectionTrait>(
    conn: &C,
    resource: ResourceKind,
    id: Uuid,
) -> Result<Option<LocalId>, DbErr> {
    let owner = match resource {
        ResourceKind::Provider => providers::Entity::find_by_id(id)
            .select_only()
            .column(providers::Column::LocalId)
            .into_tuple::<Uuid>()
            .one(conn)
            .await?,
        ResourceKind::Customer => customers::Entity::find_by_id(id)
            .select_only()
            .column(customers::Column::LocalId)
            .into_tuple::<Uuid>()
            .one(conn)
            .await?,
        ResourceKind::Order | ResourceKind::Product => {
            return Err(DbErr::Custom(format!("{resource} is not a counterparty")));
        }
    };

    Ok(owner.map(LocalId::from_uuid))
}

/// Read access to the catalog of a Local.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    db: DatabaseConnection,
}

impl CatalogRepository {
    /// Creates a new catalog repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets a product of the given Local.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist, `CrossTenant` if
    /// it belongs to another Local.
    pub async fn product(
        &self,
        local_id: LocalId,
        id: ProductId,
    ) -> Result<products::Model, OrderError> {
        let product = products::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| OrderError::not_found(ResourceKind::Product, id))?;

        if product.local_id != local_id.into_inner() {
            return Err(OrderError::cross_tenant(ResourceKind::Product, id));
        }
        Ok(product)
    }

    /// Lists the active products of a Local, by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_products(&self, local_id: LocalId) -> Result<Vec<products::Model>, OrderError> {
        products::Entity::find()
            .filter(products::Column::LocalId.eq(local_id.into_inner()))
            .filter(products::Column::Active.eq(true))
            .order_by_asc(products::Column::Code)
            .all(&self.db)
            .await
            .map_err(db_err)
    }
}
