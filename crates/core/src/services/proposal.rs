//! Proposal state machine.
//!
//! `draft -> submitted -> admitted`; from any of those a proposal can be
//! cancelled into one of the terminal states. Every transition re-reads the
//! proposal inside its transaction before the gate is evaluated.

use crate::services::actor::Actor;
use crate::services::gate::{
    allowed_cancel, allowed_edit_content, allowed_edit_reason_only, allowed_move_to_issue, ensure,
};
use crate::services::issue::IssueService;
use crate::services::notification::{dispatch, Notification, NotificationKind, NotifierService};
use crate::services::outcome::Outcome;
use crate::services::participation::ParticipationService;
use crate::services::quorum::{QuorumCalculator, QuorumInfo};
use crate::services::rules::GovernanceRules;
use crate::services::supporter_ledger::SupporterLedger;
use crate::services::tally::VoterTally;
use chrono::{DateTime, Utc};
use plebiscite_common::{AppError, AppResult, IdGenerator};
use plebiscite_db::{
    entities::{
        draft, issue, member,
        proposal::{self, ProposalState},
        supporter,
    },
    repositories::{
        DraftRepository, IssueRepository, MemberRepository, ProposalRepository,
        SupporterRepository,
    },
    transition,
};
use sea_orm::{ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};
use validator::Validate;

/// Title, content and reason of a proposal.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProposalText {
    #[validate(length(min = 1, max = 300))]
    pub title: String,
    #[validate(length(max = 100_000))]
    pub content: String,
    #[validate(length(max = 100_000))]
    pub reason: String,
}

/// Where a new proposal is placed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placement {
    /// Open a new issue in the area, in a period of the area's group if given.
    NewIssue {
        area_id: String,
        #[serde(default)]
        period_id: Option<String>,
    },
    /// Compete with the proposals of an existing issue.
    Issue { issue_id: String },
}

/// Terminal state a proposal is cancelled into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelTarget {
    Revoked,
    CancelledInterval,
    CancelledDebate,
    CancelledAdmin,
}

impl CancelTarget {
    /// The proposal state this target stands for.
    #[must_use]
    pub const fn state(self) -> ProposalState {
        match self {
            Self::Revoked => ProposalState::Revoked,
            Self::CancelledInterval => ProposalState::CancelledInterval,
            Self::CancelledDebate => ProposalState::CancelledDebate,
            Self::CancelledAdmin => ProposalState::CancelledAdmin,
        }
    }
}

impl FromStr for CancelTarget {
    type Err = AppError;

    /// Unknown targets are a programming error, not a user mistake.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<ProposalState>() {
            Ok(ProposalState::Revoked) => Ok(Self::Revoked),
            Ok(ProposalState::CancelledInterval) => Ok(Self::CancelledInterval),
            Ok(ProposalState::CancelledDebate) => Ok(Self::CancelledDebate),
            Ok(ProposalState::CancelledAdmin) => Ok(Self::CancelledAdmin),
            _ => Err(AppError::Internal(format!(
                "Unknown cancellation target: {s}"
            ))),
        }
    }
}

impl fmt::Display for CancelTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.state().as_str())
    }
}

/// Destination of a proposal move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "issue_id", rename_all = "snake_case")]
pub enum MoveTarget {
    NewIssue,
    Existing(String),
}

/// A move destination offered to the administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveOption {
    pub target: MoveTarget,
    /// Titles of the open proposals already in the target issue.
    pub proposals: Vec<String>,
}

/// Proposal and issue as re-read inside a transaction.
struct Subject {
    proposal: proposal::Model,
    issue: issue::Model,
    /// The actor's own supporter record.
    record: Option<supporter::Model>,
    confirmed_proponents: u64,
}

impl Subject {
    fn is_confirmed_proponent(&self) -> bool {
        self.record
            .as_ref()
            .is_some_and(supporter::Model::is_confirmed_proponent)
    }

    fn proponent_name(&self) -> Option<String> {
        self.record.as_ref().and_then(|record| record.proponent.clone())
    }
}

/// Proposal service for business logic.
#[derive(Clone)]
pub struct ProposalService {
    proposal_repo: ProposalRepository,
    issue_repo: IssueRepository,
    supporter_repo: SupporterRepository,
    draft_repo: DraftRepository,
    member_repo: MemberRepository,
    issues: IssueService,
    ledger: SupporterLedger,
    tally: VoterTally,
    quorum: QuorumCalculator,
    participation: ParticipationService,
    notifier: NotifierService,
    rules: GovernanceRules,
    id_gen: IdGenerator,
}

impl ProposalService {
    /// Create a new proposal service.
    #[must_use]
    pub const fn new(
        proposal_repo: ProposalRepository,
        issue_repo: IssueRepository,
        supporter_repo: SupporterRepository,
        draft_repo: DraftRepository,
        member_repo: MemberRepository,
        issues: IssueService,
        ledger: SupporterLedger,
        tally: VoterTally,
        quorum: QuorumCalculator,
        participation: ParticipationService,
        notifier: NotifierService,
        rules: GovernanceRules,
    ) -> Self {
        Self {
            proposal_repo,
            issue_repo,
            supporter_repo,
            draft_repo,
            member_repo,
            issues,
            ledger,
            tally,
            quorum,
            participation,
            notifier,
            rules,
            id_gen: IdGenerator::new(),
        }
    }

    async fn subject<C: ConnectionTrait>(
        &self,
        conn: &C,
        proposal_id: &str,
        member_id: Option<&str>,
    ) -> AppResult<Subject> {
        let proposal = self.proposal_repo.get_for_update(conn, proposal_id).await?;
        let issue = self.issue_repo.get_by_id(conn, &proposal.issue_id).await?;
        let record = match member_id {
            Some(member_id) => self.supporter_repo.find(conn, proposal_id, member_id).await?,
            None => None,
        };
        let confirmed_proponents = self
            .supporter_repo
            .count_confirmed_proponents(conn, proposal_id)
            .await?;
        Ok(Subject {
            proposal,
            issue,
            record,
            confirmed_proponents,
        })
    }

    /// Get a proposal by ID.
    pub async fn get(&self, proposal_id: &str) -> AppResult<proposal::Model> {
        self.proposal_repo
            .get_by_id(self.proposal_repo.db(), proposal_id)
            .await
    }

    /// Proposals of an issue, oldest first.
    pub async fn list_by_issue(&self, issue_id: &str) -> AppResult<Vec<proposal::Model>> {
        self.proposal_repo
            .find_by_issue(self.proposal_repo.db(), issue_id)
            .await
    }

    /// Create a proposal with its creator as first, confirmed proponent.
    pub async fn create_proposal(
        &self,
        actor: &Actor,
        placement: Placement,
        text: ProposalText,
        proponent: &str,
    ) -> AppResult<Outcome<proposal::Model>> {
        let member_id = actor.require_member()?.to_string();
        text.validate()?;
        let (proponent, warnings) = self.ledger.proponent_name(proponent)?;
        let author = actor.draft_author();
        let (reader, writer) = (self.clone(), self.clone());
        let (mid, target) = (member_id.clone(), placement.clone());

        let proposal = transition(
            self.proposal_repo.db(),
            move |txn| {
                Box::pin(async move {
                    let member = reader.member_repo.get_by_id(txn, &mid).await?;
                    let issue = match &target {
                        Placement::Issue { issue_id } => {
                            Some(reader.issue_repo.get_by_id(txn, issue_id).await?)
                        }
                        Placement::NewIssue { .. } => None,
                    };
                    Ok((member, issue))
                })
            },
            |(member, issue): &(member::Model, Option<issue::Model>)| {
                ensure(
                    member.participant,
                    "Only members entitled to participate can create proposals",
                )?;
                match issue {
                    Some(issue) => ensure(
                        issue.state.is_open_for_entry(),
                        "The issue does not accept new proposals anymore",
                    ),
                    None => Ok(()),
                }
            },
            move |txn, (member, issue): (member::Model, Option<issue::Model>)| {
                Box::pin(async move {
                    let issue = match (issue, placement) {
                        (Some(issue), _) => issue,
                        (None, Placement::NewIssue { area_id, period_id }) => {
                            writer
                                .issues
                                .create(txn, &area_id, period_id.as_deref())
                                .await?
                        }
                        (None, Placement::Issue { issue_id }) => {
                            return Err(AppError::NotFound(format!("Issue {issue_id}")));
                        }
                    };

                    let now = Utc::now();
                    let proposal = writer
                        .proposal_repo
                        .create(
                            txn,
                            proposal::ActiveModel {
                                id: Set(writer.id_gen.generate()),
                                issue_id: Set(issue.id.clone()),
                                title: Set(text.title.clone()),
                                content: Set(text.content.clone()),
                                reason: Set(text.reason.clone()),
                                state: Set(ProposalState::Draft),
                                supporters: Set(0),
                                quorum_reached: Set(false),
                                admission_decision: Set(None),
                                submitted_at: Set(None),
                                admitted_at: Set(None),
                                cancelled_at: Set(None),
                                revoke_at: Set(None),
                                created_at: Set(now.into()),
                            },
                        )
                        .await?;
                    writer
                        .snapshot_draft(txn, &proposal.id, author, &text)
                        .await?;
                    writer
                        .supporter_repo
                        .create(
                            txn,
                            supporter::ActiveModel {
                                proposal_id: Set(proposal.id.clone()),
                                member_id: Set(member.id.clone()),
                                created_at: Set(now.into()),
                                anonymous: Set(false),
                                proponent: Set(Some(proponent)),
                                proponent_confirmed: Set(true),
                            },
                        )
                        .await?;
                    writer
                        .participation
                        .activate(txn, &issue.area_id, &member.id)
                        .await?;
                    writer.tally.recompute_supporters_in(txn, &proposal.id).await
                })
            },
        )
        .await?;

        info!(
            proposal_id = %proposal.id,
            issue_id = %proposal.issue_id,
            member_id = %member_id,
            "Proposal created"
        );
        let names = self.ledger.proponent_names(&proposal.id).await?;
        dispatch(
            &self.notifier,
            Notification::new(NotificationKind::NewProposal, &proposal.id, &proposal.issue_id)
                .with_proponent(names.into_iter().next()),
        )
        .await;

        Ok(Outcome::with_warnings(proposal, warnings))
    }

    async fn snapshot_draft<C: ConnectionTrait>(
        &self,
        conn: &C,
        proposal_id: &str,
        author: Option<String>,
        text: &ProposalText,
    ) -> AppResult<draft::Model> {
        self.draft_repo
            .create(
                conn,
                draft::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    proposal_id: Set(proposal_id.to_string()),
                    author_id: Set(author),
                    title: Set(text.title.clone()),
                    content: Set(text.content.clone()),
                    reason: Set(text.reason.clone()),
                    created_at: Set(Utc::now().into()),
                },
            )
            .await
    }

    /// Store a new revision of the proposal's text.
    ///
    /// Once the proposal is submitted, only the reason can still be changed.
    pub async fn new_draft(
        &self,
        actor: &Actor,
        proposal_id: &str,
        text: ProposalText,
    ) -> AppResult<Outcome<draft::Model>> {
        text.validate()?;
        let author = actor.draft_author();
        let edited = text.clone();
        let (reader, writer) = (self.clone(), self.clone());
        let (pid, mid) = (
            proposal_id.to_string(),
            actor.member_id().map(ToString::to_string),
        );

        let (draft, issue_id, proponent) = transition(
            self.proposal_repo.db(),
            move |txn| Box::pin(async move { reader.subject(txn, &pid, mid.as_deref()).await }),
            |subject: &Subject| {
                let confirmed = subject.is_confirmed_proponent();
                if allowed_edit_content(actor, subject.issue.state, subject.proposal.state, confirmed) {
                    return Ok(());
                }
                ensure(
                    allowed_edit_reason_only(subject.issue.state, subject.proposal.state)
                        && (actor.is_admin() || confirmed),
                    "The proposal can not be edited in the current phase",
                )?;
                ensure(
                    edited.title == subject.proposal.title
                        && edited.content == subject.proposal.content,
                    "Only the reason can be changed in the current phase",
                )
            },
            move |txn, subject: Subject| {
                Box::pin(async move {
                    let proponent = subject.proponent_name();
                    let mut model: proposal::ActiveModel = subject.proposal.into();
                    model.title = Set(text.title.clone());
                    model.content = Set(text.content.clone());
                    model.reason = Set(text.reason.clone());
                    let proposal = writer.proposal_repo.update(txn, model).await?;
                    let draft = writer
                        .snapshot_draft(txn, &proposal.id, author, &text)
                        .await?;
                    Ok((draft, proposal.issue_id, proponent))
                })
            },
        )
        .await?;

        info!(proposal_id = %proposal_id, draft_id = %draft.id, "Draft saved");
        dispatch(
            &self.notifier,
            Notification::new(NotificationKind::NewDraft, proposal_id, issue_id)
                .with_proponent(proponent),
        )
        .await;

        Ok(Outcome::new(draft))
    }

    /// Revisions of a proposal, newest first.
    pub async fn drafts(&self, proposal_id: &str) -> AppResult<Vec<draft::Model>> {
        self.draft_repo
            .find_by_proposal(self.draft_repo.db(), proposal_id)
            .await
    }

    /// Submit a draft so it starts collecting supporters.
    ///
    /// The supporter count is evaluated right away, so a proposal that
    /// already has enough support is admitted by the same call.
    pub async fn submit(&self, actor: &Actor, proposal_id: &str) -> AppResult<Outcome<proposal::Model>> {
        let required = self.rules.required_proponents;
        let (reader, writer) = (self.clone(), self.clone());
        let (pid, mid) = (
            proposal_id.to_string(),
            actor.member_id().map(ToString::to_string),
        );

        let (proposal, proponent) = transition(
            self.proposal_repo.db(),
            move |txn| Box::pin(async move { reader.subject(txn, &pid, mid.as_deref()).await }),
            |subject: &Subject| {
                ensure(
                    subject.issue.state.is_open_for_entry(),
                    "The issue does not accept submissions anymore",
                )?;
                ensure(
                    actor.is_admin() || subject.is_confirmed_proponent(),
                    "Only proponents can submit the proposal",
                )?;
                if subject.proposal.state != ProposalState::Draft {
                    return Err(AppError::validation("The proposal has already been submitted"));
                }
                if subject.confirmed_proponents < required {
                    return Err(AppError::validation(format!(
                        "For submission {required} confirmed proponents are required"
                    )));
                }
                Ok(())
            },
            move |txn, subject: Subject| {
                Box::pin(async move {
                    let proponent = subject.proponent_name();
                    let mut model: proposal::ActiveModel = subject.proposal.into();
                    model.state = Set(ProposalState::Submitted);
                    model.submitted_at = Set(Some(Utc::now().into()));
                    let proposal = writer.proposal_repo.update(txn, model).await?;
                    let proposal = writer.tally.recompute_supporters_in(txn, &proposal.id).await?;
                    Ok((proposal, proponent))
                })
            },
        )
        .await?;

        info!(proposal_id = %proposal_id, state = %proposal.state.as_str(), "Proposal submitted");
        dispatch(
            &self.notifier,
            Notification::new(NotificationKind::Submitted, proposal_id, &proposal.issue_id)
                .with_proponent(proponent),
        )
        .await;

        Ok(Outcome::new(proposal))
    }

    /// Admit a submitted proposal by administrative decision, or update the
    /// decision text of an admitted one.
    pub async fn set_admission_decision(
        &self,
        actor: &Actor,
        proposal_id: &str,
        decision: &str,
    ) -> AppResult<Outcome<proposal::Model>> {
        actor.require_admin()?;
        let decision = decision.trim().to_string();
        if decision.is_empty() {
            return Err(AppError::validation("The admission decision must not be empty"));
        }
        let (reader, writer) = (self.clone(), self.clone());
        let pid = proposal_id.to_string();

        let proposal = transition(
            self.proposal_repo.db(),
            move |txn| Box::pin(async move { reader.subject(txn, &pid, None).await }),
            |subject: &Subject| match subject.proposal.state {
                ProposalState::Draft => Err(AppError::validation(
                    "The proposal has to be submitted before it can be admitted",
                )),
                state if state.is_cancelled() => Err(AppError::permission_denied(
                    "Cancelled proposals can not be admitted",
                )),
                _ => Ok(()),
            },
            move |txn, subject: Subject| {
                Box::pin(async move {
                    let admitting = subject.proposal.state == ProposalState::Submitted;
                    let issue_id = subject.issue.id.clone();
                    let mut model: proposal::ActiveModel = subject.proposal.into();
                    model.admission_decision = Set(Some(decision));
                    if admitting {
                        model.state = Set(ProposalState::Admitted);
                        model.admitted_at = Set(Some(Utc::now().into()));
                    }
                    let proposal = writer.proposal_repo.update(txn, model).await?;
                    if admitting {
                        info!(proposal_id = %proposal.id, "Proposal admitted by decision");
                        writer.issues.proposal_admitted(txn, &issue_id).await?;
                    }
                    Ok(proposal)
                })
            },
        )
        .await?;

        Ok(Outcome::new(proposal))
    }

    /// Cancel a proposal; cancels the issue too once all its proposals are closed.
    pub async fn cancel(
        &self,
        actor: &Actor,
        proposal_id: &str,
        target: CancelTarget,
    ) -> AppResult<Outcome<proposal::Model>> {
        actor.require_admin()?;
        let (reader, writer) = (self.clone(), self.clone());
        let pid = proposal_id.to_string();

        let (proposal, issue_cancelled) = transition(
            self.proposal_repo.db(),
            move |txn| Box::pin(async move { reader.subject(txn, &pid, None).await }),
            |subject: &Subject| {
                ensure(
                    allowed_cancel(subject.issue.state),
                    "In the current phase the proposal can not be cancelled anymore",
                )?;
                if subject.proposal.state.is_cancelled() {
                    return Err(AppError::validation("The proposal is already closed"));
                }
                Ok(())
            },
            move |txn, subject: Subject| {
                Box::pin(async move {
                    let issue_id = subject.issue.id.clone();
                    let mut model: proposal::ActiveModel = subject.proposal.into();
                    model.state = Set(target.state());
                    model.revoke_at = Set(None);
                    model.cancelled_at = Set(Some(Utc::now().into()));
                    model.quorum_reached = Set(false);
                    let proposal = writer.proposal_repo.update(txn, model).await?;
                    let issue_cancelled = writer.issues.cancel_if_exhausted(txn, &issue_id).await?;
                    Ok((proposal, issue_cancelled))
                })
            },
        )
        .await?;

        info!(
            proposal_id = %proposal_id,
            target = %target,
            issue_cancelled,
            "Proposal cancelled"
        );
        Ok(Outcome::new(proposal))
    }

    /// Destinations `proposal` may be moved to.
    pub async fn options_move_to_issue(&self, proposal_id: &str) -> AppResult<Vec<MoveOption>> {
        let db = self.proposal_repo.db();
        let proposal = self.proposal_repo.get_by_id(db, proposal_id).await?;
        let issue = self.issue_repo.get_by_id(db, &proposal.issue_id).await?;
        self.move_options_in(db, &issue).await
    }

    async fn move_options_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        issue: &issue::Model,
    ) -> AppResult<Vec<MoveOption>> {
        let mut options = Vec::new();

        let siblings = self.proposal_repo.find_by_issue(conn, &issue.id).await?;
        if siblings.len() > 1 {
            options.push(MoveOption {
                target: MoveTarget::NewIssue,
                proposals: Vec::new(),
            });
        }

        let candidates = self
            .issue_repo
            .find_in_period(conn, issue.period_id.as_deref(), &issue.id)
            .await?;
        for candidate in candidates {
            let proposals: Vec<String> = self
                .proposal_repo
                .find_by_issue(conn, &candidate.id)
                .await?
                .into_iter()
                .filter(|p| !p.state.is_cancelled())
                .map(|p| p.title)
                .collect();
            if !proposals.is_empty() {
                options.push(MoveOption {
                    target: MoveTarget::Existing(candidate.id),
                    proposals,
                });
            }
        }

        Ok(options)
    }

    /// Move a proposal to another issue.
    ///
    /// The source issue is cancelled if it is left without proposals.
    pub async fn move_to_issue(
        &self,
        actor: &Actor,
        proposal_id: &str,
        target: MoveTarget,
    ) -> AppResult<Outcome<proposal::Model>> {
        actor.require_admin()?;
        let wanted = target.clone();
        let (reader, writer) = (self.clone(), self.clone());
        let pid = proposal_id.to_string();

        let (proposal, previous_issue_id) = transition(
            self.proposal_repo.db(),
            move |txn| {
                Box::pin(async move {
                    let subject = reader.subject(txn, &pid, None).await?;
                    let options = reader.move_options_in(txn, &subject.issue).await?;
                    Ok((subject, options))
                })
            },
            |(subject, options): &(Subject, Vec<MoveOption>)| {
                ensure(
                    allowed_move_to_issue(subject.issue.state, subject.proposal.state),
                    "The proposal can not be moved in the current phase",
                )?;
                if options.iter().any(|option| option.target == wanted) {
                    Ok(())
                } else {
                    Err(AppError::validation("The selected issue is not available"))
                }
            },
            move |txn, (subject, _): (Subject, Vec<MoveOption>)| {
                Box::pin(async move {
                    let new_issue = match &target {
                        MoveTarget::NewIssue => writer.issues.create_like(txn, &subject.issue).await?,
                        MoveTarget::Existing(issue_id) => {
                            writer.issue_repo.get_by_id(txn, issue_id).await?
                        }
                    };
                    let previous_issue_id = subject.issue.id.clone();
                    let mut model: proposal::ActiveModel = subject.proposal.into();
                    model.issue_id = Set(new_issue.id.clone());
                    let proposal = writer.proposal_repo.update(txn, model).await?;
                    writer.issues.cancel_if_empty(txn, &previous_issue_id).await?;
                    let proposal = writer.tally.recompute_supporters_in(txn, &proposal.id).await?;
                    Ok((proposal, previous_issue_id))
                })
            },
        )
        .await?;

        info!(
            proposal_id = %proposal_id,
            from = %previous_issue_id,
            to = %proposal.issue_id,
            "Proposal moved"
        );

        let db = self.proposal_repo.db();
        let mut recipients: BTreeSet<String> = BTreeSet::new();
        recipients.extend(self.issue_repo.votingmode_members(db, &previous_issue_id).await?);
        recipients.extend(self.issue_repo.votingmode_members(db, &proposal.issue_id).await?);
        recipients.extend(
            self.supporter_repo
                .find_by_proposal(db, proposal_id)
                .await?
                .into_iter()
                .map(|record| record.member_id),
        );
        dispatch(
            &self.notifier,
            Notification::new(NotificationKind::ProposalMoved, proposal_id, &proposal.issue_id)
                .with_previous_issue(previous_issue_id)
                .for_members(recipients.into_iter().collect()),
        )
        .await;

        Ok(Outcome::new(proposal))
    }

    /// Revoke every proposal whose revocation deadline passed.
    ///
    /// Proposals of issues that no longer allow cancellation are skipped.
    pub async fn revoke_expired(&self, now: DateTime<Utc>) -> AppResult<Vec<String>> {
        let due = self
            .proposal_repo
            .find_revoke_due(self.proposal_repo.db(), now.into())
            .await?;

        let mut revoked = Vec::with_capacity(due.len());
        for proposal in due {
            match self
                .cancel(&Actor::System, &proposal.id, CancelTarget::Revoked)
                .await
            {
                Ok(_) => revoked.push(proposal.id),
                Err(AppError::PermissionDenied(reason) | AppError::Validation(reason)) => {
                    debug!(proposal_id = %proposal.id, reason = %reason, "Revocation skipped");
                }
                Err(e) => return Err(e),
            }
        }

        if !revoked.is_empty() {
            info!(count = revoked.len(), "Expired proposals revoked");
        }
        Ok(revoked)
    }

    /// Quorum explanation of a proposal.
    pub async fn quorum_info(&self, proposal_id: &str) -> AppResult<QuorumInfo> {
        self.quorum
            .quorum_info(self.proposal_repo.db(), proposal_id)
            .await
    }

    /// Human friendly name of a state.
    #[must_use]
    pub const fn state_name(state: ProposalState) -> &'static str {
        state.display_name()
    }
}
