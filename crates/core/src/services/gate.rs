//! Phase gates: which changes the issue and proposal states allow.

use crate::services::actor::Actor;
use plebiscite_common::{AppError, AppResult};
use plebiscite_db::entities::{issue::IssueState, proposal::ProposalState};

/// Proponents may be added, confirmed, renamed and removed.
#[must_use]
pub const fn allowed_change_proponents(issue: IssueState, proposal: ProposalState) -> bool {
    matches!(issue, IssueState::Entry | IssueState::Debate)
        && matches!(
            proposal,
            ProposalState::Draft | ProposalState::Submitted | ProposalState::Admitted
        )
}

/// Supporters may be added, renewed and revoked.
#[must_use]
pub const fn allowed_change_supporters(issue: IssueState, proposal: ProposalState) -> bool {
    matches!(
        issue,
        IssueState::Entry | IssueState::Debate | IssueState::Preparation
    ) && matches!(proposal, ProposalState::Submitted | ProposalState::Admitted)
}

/// Proposals of the issue may be cancelled.
#[must_use]
pub const fn allowed_cancel(issue: IssueState) -> bool {
    issue.is_open_for_entry()
}

/// The proposal may be moved to a different issue.
#[must_use]
pub const fn allowed_move_to_issue(issue: IssueState, proposal: ProposalState) -> bool {
    allowed_change_proponents(issue, proposal)
}

/// Title, content and reason may be edited.
///
/// Administrators may edit until voting preparation ends; confirmed
/// proponents only while the proposal is a draft of an issue in entry.
#[must_use]
pub fn allowed_edit_content(
    actor: &Actor,
    issue: IssueState,
    proposal: ProposalState,
    is_confirmed_proponent: bool,
) -> bool {
    if actor.is_admin() {
        matches!(
            issue,
            IssueState::Entry | IssueState::Debate | IssueState::Preparation
        )
    } else {
        is_confirmed_proponent
            && issue == IssueState::Entry
            && proposal == ProposalState::Draft
    }
}

/// Only the reason may be edited.
#[must_use]
pub const fn allowed_edit_reason_only(issue: IssueState, proposal: ProposalState) -> bool {
    matches!(issue, IssueState::Entry | IssueState::Debate)
        && matches!(proposal, ProposalState::Submitted | ProposalState::Admitted)
}

/// Turn a closed gate into a user-facing rejection.
pub fn ensure(allowed: bool, reason: &str) -> AppResult<()> {
    if allowed {
        Ok(())
    } else {
        Err(AppError::permission_denied(reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proponents_change_until_preparation() {
        assert!(allowed_change_proponents(IssueState::Entry, ProposalState::Draft));
        assert!(allowed_change_proponents(IssueState::Debate, ProposalState::Admitted));
        assert!(!allowed_change_proponents(IssueState::Preparation, ProposalState::Admitted));
        assert!(!allowed_change_proponents(IssueState::Entry, ProposalState::Revoked));
    }

    #[test]
    fn test_supporters_change_after_submission() {
        assert!(!allowed_change_supporters(IssueState::Entry, ProposalState::Draft));
        assert!(allowed_change_supporters(IssueState::Entry, ProposalState::Submitted));
        assert!(allowed_change_supporters(IssueState::Preparation, ProposalState::Admitted));
        assert!(!allowed_change_supporters(IssueState::Voting, ProposalState::Admitted));
        assert!(!allowed_change_supporters(IssueState::Debate, ProposalState::CancelledAdmin));
    }

    #[test]
    fn test_edit_content() {
        let member = Actor::Member("m1".to_string());
        let admin = Actor::Admin("m2".to_string());

        assert!(allowed_edit_content(&member, IssueState::Entry, ProposalState::Draft, true));
        assert!(!allowed_edit_content(&member, IssueState::Entry, ProposalState::Draft, false));
        assert!(!allowed_edit_content(&member, IssueState::Entry, ProposalState::Submitted, true));
        assert!(allowed_edit_content(&admin, IssueState::Preparation, ProposalState::Admitted, false));
        assert!(!allowed_edit_content(&admin, IssueState::Voting, ProposalState::Admitted, false));
    }

    #[test]
    fn test_edit_reason_only() {
        assert!(allowed_edit_reason_only(IssueState::Debate, ProposalState::Submitted));
        assert!(!allowed_edit_reason_only(IssueState::Entry, ProposalState::Draft));
    }

    #[test]
    fn test_ensure() {
        assert!(ensure(true, "closed").is_ok());
        assert!(matches!(
            ensure(false, "closed"),
            Err(AppError::PermissionDenied(reason)) if reason == "closed"
        ));
    }
}
