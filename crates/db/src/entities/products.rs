//! `SeaORM` Entity for products table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub local_id: Uuid,
    pub code: String,
    pub name: String,
    #[sea_orm(column_type = "Decimal(Some((14, 4)))")]
    pub avg_cost: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 4)))")]
    pub sale_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 4)))")]
    pub stock_on_hand: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 4)))")]
    pub min_stock: Decimal,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::locals::Entity",
        from = "Column::LocalId",
        to = "super::locals::Column::Id"
    )]
    Locals,
    #[sea_orm(has_many = "super::order_lines::Entity")]
    OrderLines,
    #[sea_orm(has_many = "super::cost_history::Entity")]
    CostHistory,
}

impl Related<super::locals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Locals.def()
    }
}

impl Related<super::order_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderLines.def()
    }
}

impl Related<super::cost_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CostHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
