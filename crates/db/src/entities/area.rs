//! Area entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A subject area of a group; issues are raised within an area.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "area")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub ngroup_id: String,

    pub name: String,

    /// Cached number of participants, maintained by the participation service.
    pub participants: i32,
}

impl Model {
    /// Population the quorum is computed from, never below the group's floor.
    #[must_use]
    pub fn population(&self, minimum_population: i32) -> i64 {
        i64::from(self.participants.max(minimum_population).max(0))
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ngroup::Entity",
        from = "Column::NgroupId",
        to = "super::ngroup::Column::Id",
        on_delete = "Cascade"
    )]
    Ngroup,
    #[sea_orm(has_many = "super::issue::Entity")]
    Issue,
}

impl Related<super::ngroup::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ngroup.def()
    }
}

impl Related<super::issue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Issue.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
