//! Stores table.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// A business listing. `owner_id` points at a store owner, or is empty.
#[derive(Clone, Debug, PartialEq)]
pub struct Store {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub owner_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<Model> for Store {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            address: model.address,
            owner_id: model.owner_id,
            created_at: model.created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "stores")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub address: String,
    pub owner_id: Option<i32>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Owner,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
