//! Voting period entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Phase of a period, derived from its timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodPhase {
    /// Debate has not started yet.
    Upcoming,
    Debate,
    Preparation,
    Voting,
    Counting,
}

/// Phase of the ballot (offline voting) schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BallotPhase {
    NotStarted,
    /// Members choose their ballot location.
    BallotAssignment,
    /// Assignments are final; ballots are being prepared.
    BallotPreparation,
}

/// A voting round; every timestamp is later than the previous one.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "period")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub ngroup_id: String,

    pub debate: DateTimeWithTimeZone,
    pub preparation: DateTimeWithTimeZone,
    pub voting: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub ballot_assignment: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub ballot_preparation: Option<DateTimeWithTimeZone>,

    pub counting: DateTimeWithTimeZone,

    pub online_voting: bool,
    pub ballot_voting: bool,
}

impl Model {
    /// Current phase at `now`.
    #[must_use]
    pub fn current_phase(&self, now: DateTimeWithTimeZone) -> PeriodPhase {
        if self.counting <= now {
            PeriodPhase::Counting
        } else if self.voting <= now {
            PeriodPhase::Voting
        } else if self.preparation <= now {
            PeriodPhase::Preparation
        } else if self.debate <= now {
            PeriodPhase::Debate
        } else {
            PeriodPhase::Upcoming
        }
    }

    /// Current ballot phase at `now`.
    #[must_use]
    pub fn ballot_phase(&self, now: DateTimeWithTimeZone) -> BallotPhase {
        match (self.ballot_assignment, self.ballot_preparation) {
            (_, Some(preparation)) if preparation <= now => BallotPhase::BallotPreparation,
            (Some(assignment), _) if assignment <= now => BallotPhase::BallotAssignment,
            _ => BallotPhase::NotStarted,
        }
    }

    /// Whether the timestamps are strictly increasing.
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        let ballot_ok = match (self.ballot_assignment, self.ballot_preparation) {
            (Some(assignment), Some(preparation)) => {
                assignment < preparation && preparation < self.counting
            }
            (None, None) => true,
            _ => false,
        };
        self.debate < self.preparation
            && self.preparation < self.voting
            && self.voting < self.counting
            && ballot_ok
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ballot::Entity")]
    Ballot,
    #[sea_orm(has_many = "super::issue::Entity")]
    Issue,
}

impl Related<super::ballot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ballot.def()
    }
}

impl Related<super::issue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Issue.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
