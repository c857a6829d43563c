//! Member entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A member known through the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "member")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Opaque identifier issued by the identity provider.
    #[sea_orm(unique)]
    pub auid: String,

    #[sea_orm(unique)]
    pub username: String,

    /// Public display name.
    #[sea_orm(nullable)]
    pub public_id: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub profile: Option<String>,

    /// Whether the member is entitled to participate and vote.
    pub participant: bool,

    pub is_admin: bool,

    /// Bearer token of the current session.
    #[sea_orm(nullable, indexed)]
    #[serde(skip_serializing)]
    pub token: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::supporter::Entity")]
    Supporter,
    #[sea_orm(has_many = "super::voter::Entity")]
    Voter,
}

impl Related<super::supporter::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supporter.def()
    }
}

impl Related<super::voter::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Voter.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
