//! `SeaORM` Entity for orders table.
//!
//! Purchases and sales share this table, distinguished by `kind`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{OrderKind, OrderStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub local_id: Uuid,
    pub kind: OrderKind,
    pub provider_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub status: OrderStatus,
    pub occurred_at: DateTimeWithTimeZone,
    #[sea_orm(column_type = "Decimal(Some((14, 4)))")]
    pub subtotal: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 4)))")]
    pub discount_total: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 4)))")]
    pub tax_total: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 4)))")]
    pub grand_total: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// The provider (purchase) or customer (sale) of this order.
    #[must_use]
    pub fn counterparty_id(&self) -> Option<Uuid> {
        match self.kind {
            OrderKind::Purchase => self.provider_id,
            OrderKind::Sale => self.customer_id,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::locals::Entity",
        from = "Column::LocalId",
        to = "super::locals::Column::Id"
    )]
    Locals,
    #[sea_orm(
        belongs_to = "super::providers::Entity",
        from = "Column::ProviderId",
        to = "super::providers::Column::Id"
    )]
    Providers,
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id"
    )]
    Customers,
    #[sea_orm(has_many = "super::order_lines::Entity")]
    OrderLines,
}

impl Related<super::locals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Locals.def()
    }
}

impl Related<super::providers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Providers.def()
    }
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl Related<super::order_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
