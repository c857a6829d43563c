//! Group membership of members, as supplied by the identity provider.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "member_ngroup")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub member_id: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub ngroup_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::member::Entity",
        from = "Column::MemberId",
        to = "super::member::Column::Id",
        on_delete = "Cascade"
    )]
    Member,
    #[sea_orm(
        belongs_to = "super::ngroup::Entity",
        from = "Column::NgroupId",
        to = "super::ngroup::Column::Id",
        on_delete = "Cascade"
    )]
    Ngroup,
}

impl Related<super::member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl Related<super::ngroup::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ngroup.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
