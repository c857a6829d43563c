//! Voter entity: which ballot a member votes at in a period.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Keyed by (member, period): a member has at most one ballot per period.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "voter")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub member_id: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub period_id: String,

    #[sea_orm(indexed)]
    pub ballot_id: String,

    /// Whether the member is an agent (poll worker) of the ballot.
    pub agent: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ballot::Entity",
        from = "Column::BallotId",
        to = "super::ballot::Column::Id",
        on_delete = "Cascade"
    )]
    Ballot,
    #[sea_orm(
        belongs_to = "super::member::Entity",
        from = "Column::MemberId",
        to = "super::member::Column::Id",
        on_delete = "Cascade"
    )]
    Member,
}

impl Related<super::ballot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ballot.def()
    }
}

impl Related<super::member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
