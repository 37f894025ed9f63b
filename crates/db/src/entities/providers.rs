//! `SeaORM` Entity for providers table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "providers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub local_id: Uuid,
    pub name: String,
    pub tax_id: Option<String>,
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
}

impl Related<super::locals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Locals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
