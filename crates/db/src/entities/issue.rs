//! Issue entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Phase of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    /// Proposals are being drafted and collect supporters.
    #[sea_orm(string_value = "entry")]
    Entry,
    #[sea_orm(string_value = "debate")]
    Debate,
    #[sea_orm(string_value = "preparation")]
    Preparation,
    #[sea_orm(string_value = "voting")]
    Voting,
    #[sea_orm(string_value = "counting")]
    Counting,
    #[sea_orm(string_value = "finished")]
    Finished,
    #[sea_orm(string_value = "cleared")]
    Cleared,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl Default for IssueState {
    fn default() -> Self {
        Self::Entry
    }
}

impl IssueState {
    /// Whether proposals of the issue may still be cancelled, moved or get proponents.
    #[must_use]
    pub const fn is_open_for_entry(self) -> bool {
        matches!(self, Self::Entry | Self::Debate)
    }
}

/// A bundle of competing proposals.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "issue")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub area_id: String,

    /// Voting period the issue is scheduled for.
    #[sea_orm(nullable, indexed)]
    pub period_id: Option<String>,

    pub state: IssueState,

    /// Whether enough members demanded offline voting.
    pub votingmode_reached: bool,

    #[sea_orm(nullable)]
    pub debate_started: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub cancelled_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::area::Entity",
        from = "Column::AreaId",
        to = "super::area::Column::Id",
        on_delete = "Cascade"
    )]
    Area,
    #[sea_orm(
        belongs_to = "super::period::Entity",
        from = "Column::PeriodId",
        to = "super::period::Column::Id",
        on_delete = "SetNull"
    )]
    Period,
    #[sea_orm(has_many = "super::proposal::Entity")]
    Proposal,
}

impl Related<super::area::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Area.def()
    }
}

impl Related<super::period::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Period.def()
    }
}

impl Related<super::proposal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Proposal.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
