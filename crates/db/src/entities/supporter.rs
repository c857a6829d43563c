//! Supporter entity: support and proponency of a member for a proposal.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A row with a `proponent` name is a proponency application (confirmed or
/// pending); a row without one is a plain supporter.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "supporter")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub proposal_id: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub member_id: String,

    /// When the support was given or last renewed.
    #[sea_orm(indexed)]
    pub created_at: DateTimeWithTimeZone,

    pub anonymous: bool,

    /// Display name of the proponent.
    #[sea_orm(nullable)]
    pub proponent: Option<String>,

    pub proponent_confirmed: bool,
}

impl Model {
    /// Whether the member applied as proponent (confirmed or not).
    #[must_use]
    pub const fn is_proponent(&self) -> bool {
        self.proponent.is_some()
    }

    /// Whether the member is a confirmed proponent.
    #[must_use]
    pub const fn is_confirmed_proponent(&self) -> bool {
        self.proponent.is_some() && self.proponent_confirmed
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::proposal::Entity",
        from = "Column::ProposalId",
        to = "super::proposal::Column::Id",
        on_delete = "Cascade"
    )]
    Proposal,
    #[sea_orm(
        belongs_to = "super::member::Entity",
        from = "Column::MemberId",
        to = "super::member::Column::Id",
        on_delete = "Cascade"
    )]
    Member,
}

impl Related<super::proposal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Proposal.def()
    }
}

impl Related<super::member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
