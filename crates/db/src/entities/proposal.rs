//! Proposal entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a proposal.
///
/// `draft -> submitted -> admitted`, and from any of those into one of the
/// terminal cancellation states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum ProposalState {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "submitted")]
    Submitted,
    #[sea_orm(string_value = "admitted")]
    Admitted,
    /// The proposal lost all its proponents and the grace period expired.
    #[sea_orm(string_value = "revoked")]
    Revoked,
    /// The proposal did not reach the quorum in time.
    #[sea_orm(string_value = "cancelled_interval")]
    CancelledInterval,
    /// The proposal was not admitted by the end of the debate.
    #[sea_orm(string_value = "cancelled_debate")]
    CancelledDebate,
    #[sea_orm(string_value = "cancelled_admin")]
    CancelledAdmin,
}

impl Default for ProposalState {
    fn default() -> Self {
        Self::Draft
    }
}

impl ProposalState {
    /// Whether the state is one of the terminal cancellation states.
    #[must_use]
    pub const fn is_cancelled(self) -> bool {
        matches!(
            self,
            Self::Revoked | Self::CancelledInterval | Self::CancelledDebate | Self::CancelledAdmin
        )
    }

    /// Human friendly state name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Submitted => "Submitted",
            Self::Admitted => "Admitted",
            Self::Revoked => "Revoked",
            Self::CancelledInterval | Self::CancelledDebate | Self::CancelledAdmin => "Cancelled",
        }
    }

    /// Database name of the state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Admitted => "admitted",
            Self::Revoked => "revoked",
            Self::CancelledInterval => "cancelled_interval",
            Self::CancelledDebate => "cancelled_debate",
            Self::CancelledAdmin => "cancelled_admin",
        }
    }
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown proposal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProposalState(pub String);

impl fmt::Display for UnknownProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown proposal state: {}", self.0)
    }
}

impl std::error::Error for UnknownProposalState {}

impl FromStr for ProposalState {
    type Err = UnknownProposalState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "submitted" => Ok(Self::Submitted),
            "admitted" => Ok(Self::Admitted),
            "revoked" => Ok(Self::Revoked),
            "cancelled_interval" => Ok(Self::CancelledInterval),
            "cancelled_debate" => Ok(Self::CancelledDebate),
            "cancelled_admin" => Ok(Self::CancelledAdmin),
            other => Err(UnknownProposalState(other.to_string())),
        }
    }
}

/// A proposal competing within an issue.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "proposal")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub issue_id: String,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    #[sea_orm(column_type = "Text")]
    pub reason: String,

    pub state: ProposalState,

    /// Cached count of valid supporters. Written only by the tally.
    pub supporters: i32,

    pub quorum_reached: bool,

    /// Administrative admission text, circumventing the quorum.
    #[sea_orm(column_type = "Text", nullable)]
    pub admission_decision: Option<String>,

    #[sea_orm(nullable)]
    pub submitted_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub admitted_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub cancelled_at: Option<DateTimeWithTimeZone>,

    /// Scheduled auto-revocation while the proposal lacks proponents.
    #[sea_orm(nullable, indexed)]
    pub revoke_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::issue::Entity",
        from = "Column::IssueId",
        to = "super::issue::Column::Id",
        on_delete = "Cascade"
    )]
    Issue,
    #[sea_orm(has_many = "super::supporter::Entity")]
    Supporter,
    #[sea_orm(has_many = "super::draft::Entity")]
    Draft,
}

impl Related<super::issue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Issue.def()
    }
}

impl Related<super::supporter::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supporter.def()
    }
}

impl Related<super::draft::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Draft.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_states() {
        assert!(!ProposalState::Draft.is_cancelled());
        assert!(!ProposalState::Admitted.is_cancelled());
        assert!(ProposalState::Revoked.is_cancelled());
        assert!(ProposalState::CancelledAdmin.is_cancelled());
    }

    #[test]
    fn test_state_names() {
        assert_eq!(ProposalState::CancelledDebate.display_name(), "Cancelled");
        assert_eq!(ProposalState::Revoked.display_name(), "Revoked");
        assert_eq!(
            "cancelled_interval".parse::<ProposalState>().unwrap(),
            ProposalState::CancelledInterval
        );
        assert!("withdrawn".parse::<ProposalState>().is_err());
    }
}
