//! Supporter ledger: support and proponency of members for proposals.

use crate::services::actor::Actor;
use crate::services::gate::{allowed_change_proponents, allowed_change_supporters, ensure};
use crate::services::notification::{dispatch, Notification, NotificationKind, NotifierService};
use crate::services::outcome::{Notice, Outcome};
use crate::services::participation::ParticipationService;
use crate::services::rules::GovernanceRules;
use crate::services::tally::VoterTally;
use chrono::Utc;
use plebiscite_common::{AppError, AppResult};
use plebiscite_db::{
    entities::{issue, member, proposal, supporter},
    repositories::{IssueRepository, MemberRepository, ProposalRepository, SupporterRepository},
    transition,
};
use sea_orm::{ConnectionTrait, Set};
use serde::Serialize;
use tracing::info;

/// Rows a ledger gate is evaluated against, re-read inside the transaction.
pub(crate) struct Snapshot {
    pub proposal: proposal::Model,
    pub issue: issue::Model,
    pub member: member::Model,
    /// The member's own record for the proposal.
    pub record: Option<supporter::Model>,
    pub confirmed_proponents: u64,
}

impl Snapshot {
    fn is_confirmed_proponent(&self) -> bool {
        self.record
            .as_ref()
            .is_some_and(supporter::Model::is_confirmed_proponent)
    }
}

/// How the viewer supports a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportStatus {
    NotSupporting,
    Named,
    Anonymous,
}

/// One supporter as shown to a viewer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupporterEntry {
    /// Hidden for anonymous supporters, unless the viewer is that supporter.
    pub member_id: Option<String>,
    pub anonymous: bool,
    pub proponent: Option<String>,
    pub proponent_confirmed: bool,
    /// Whether the support still counts towards the quorum.
    pub valid: bool,
}

/// Supporters of a proposal and the viewer's own standing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportersView {
    pub supporters: Vec<SupporterEntry>,
    pub is_supporter: SupportStatus,
    pub is_proponent: bool,
    pub is_valid: bool,
}

/// Supporter ledger.
#[derive(Clone)]
pub struct SupporterLedger {
    proposal_repo: ProposalRepository,
    issue_repo: IssueRepository,
    supporter_repo: SupporterRepository,
    member_repo: MemberRepository,
    tally: VoterTally,
    participation: ParticipationService,
    notifier: NotifierService,
    rules: GovernanceRules,
}

impl SupporterLedger {
    /// Create a new supporter ledger.
    #[must_use]
    pub const fn new(
        proposal_repo: ProposalRepository,
        issue_repo: IssueRepository,
        supporter_repo: SupporterRepository,
        member_repo: MemberRepository,
        tally: VoterTally,
        participation: ParticipationService,
        notifier: NotifierService,
        rules: GovernanceRules,
    ) -> Self {
        Self {
            proposal_repo,
            issue_repo,
            supporter_repo,
            member_repo,
            tally,
            participation,
            notifier,
            rules,
        }
    }

    pub(crate) async fn snapshot<C: ConnectionTrait>(
        &self,
        conn: &C,
        proposal_id: &str,
        member_id: &str,
    ) -> AppResult<Snapshot> {
        let proposal = self.proposal_repo.get_for_update(conn, proposal_id).await?;
        let issue = self.issue_repo.get_by_id(conn, &proposal.issue_id).await?;
        let member = self.member_repo.get_by_id(conn, member_id).await?;
        let record = self.supporter_repo.find(conn, proposal_id, member_id).await?;
        let confirmed_proponents = self
            .supporter_repo
            .count_confirmed_proponents(conn, proposal_id)
            .await?;
        Ok(Snapshot {
            proposal,
            issue,
            member,
            record,
            confirmed_proponents,
        })
    }

    /// Recount the supporters and record the member as participant of the area.
    async fn settle<C: ConnectionTrait>(
        &self,
        conn: &C,
        snapshot: &Snapshot,
    ) -> AppResult<proposal::Model> {
        let proposal = self
            .tally
            .recompute_supporters_in(conn, &snapshot.proposal.id)
            .await?;
        self.participation
            .activate(conn, &snapshot.issue.area_id, &snapshot.member.id)
            .await?;
        Ok(proposal)
    }

    /// Clear a pending revocation once the proposal has enough confirmed proponents.
    async fn check_required_proponents<C: ConnectionTrait>(
        &self,
        conn: &C,
        proposal: &proposal::Model,
    ) -> AppResult<()> {
        if proposal.revoke_at.is_none() {
            return Ok(());
        }
        let confirmed = self
            .supporter_repo
            .count_confirmed_proponents(conn, &proposal.id)
            .await?;
        if confirmed >= self.rules.proponents_needed(proposal.state)
            && self.proposal_repo.clear_revoke(conn, &proposal.id).await?
        {
            info!(proposal_id = %proposal.id, confirmed, "Revocation cancelled");
        }
        Ok(())
    }

    pub(crate) fn proponent_name(&self, name: &str) -> AppResult<(String, Vec<Notice>)> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation(
                "Your proponent name must not be empty",
            ));
        }
        let (name, truncated) = self.rules.clamp_proponent_name(name);
        let warnings = if truncated {
            vec![Notice::Truncated {
                max: self.rules.proponent_max_length,
            }]
        } else {
            Vec::new()
        };
        Ok((name, warnings))
    }

    async fn confirmed_proponent_ids(&self, proposal_id: &str) -> AppResult<Vec<String>> {
        Ok(self
            .supporter_repo
            .find_confirmed_proponents(self.supporter_repo.db(), proposal_id)
            .await?
            .into_iter()
            .map(|record| record.member_id)
            .collect())
    }

    /// Support a proposal, or renew an existing support.
    pub async fn add_support(
        &self,
        actor: &Actor,
        proposal_id: &str,
        anonymous: bool,
    ) -> AppResult<Outcome<supporter::Model>> {
        let member_id = actor.require_member()?.to_string();
        let (reader, writer) = (self.clone(), self.clone());
        let (pid, mid) = (proposal_id.to_string(), member_id.clone());

        let (record, warnings) = transition(
            self.proposal_repo.db(),
            move |txn| Box::pin(async move { reader.snapshot(txn, &pid, &mid).await }),
            |snapshot: &Snapshot| {
                ensure(
                    snapshot.member.participant,
                    "Only members entitled to participate can support proposals",
                )?;
                ensure(
                    allowed_change_supporters(snapshot.issue.state, snapshot.proposal.state),
                    "Support for this proposal can not be changed in the current phase",
                )
            },
            move |txn, snapshot: Snapshot| {
                Box::pin(async move {
                    let now = Utc::now();
                    let mut warnings = Vec::new();
                    let record = match snapshot.record.clone() {
                        Some(existing) => {
                            if !writer.rules.support_is_valid(
                                &snapshot.proposal,
                                existing.created_at,
                                now,
                            ) {
                                warnings.push(Notice::SupportExpired);
                            }
                            let mut model: supporter::ActiveModel = existing.into();
                            model.created_at = Set(now.into());
                            model.anonymous = Set(anonymous);
                            writer.supporter_repo.update(txn, model).await?
                        }
                        None => {
                            let model = supporter::ActiveModel {
                                proposal_id: Set(snapshot.proposal.id.clone()),
                                member_id: Set(snapshot.member.id.clone()),
                                created_at: Set(now.into()),
                                anonymous: Set(anonymous),
                                proponent: Set(None),
                                proponent_confirmed: Set(false),
                            };
                            writer.supporter_repo.create(txn, model).await?
                        }
                    };
                    writer.settle(txn, &snapshot).await?;
                    Ok((record, warnings))
                })
            },
        )
        .await?;

        info!(proposal_id = %proposal_id, member_id = %member_id, anonymous, "Support added");
        Ok(Outcome::with_warnings(record, warnings))
    }

    /// Renew the validity of an existing support.
    pub async fn renew_support(
        &self,
        actor: &Actor,
        proposal_id: &str,
    ) -> AppResult<Outcome<supporter::Model>> {
        let member_id = actor.require_member()?.to_string();
        let (reader, writer) = (self.clone(), self.clone());
        let (pid, mid) = (proposal_id.to_string(), member_id.clone());

        let (record, warnings) = transition(
            self.proposal_repo.db(),
            move |txn| Box::pin(async move { reader.snapshot(txn, &pid, &mid).await }),
            |snapshot: &Snapshot| {
                ensure(
                    snapshot.member.participant,
                    "Only members entitled to participate can support proposals",
                )?;
                ensure(
                    allowed_change_supporters(snapshot.issue.state, snapshot.proposal.state),
                    "Support for this proposal can not be changed in the current phase",
                )?;
                if snapshot.record.is_none() {
                    return Err(AppError::validation(
                        "You do not support this proposal",
                    ));
                }
                Ok(())
            },
            move |txn, snapshot: Snapshot| {
                Box::pin(async move {
                    let existing = snapshot.record.clone().ok_or_else(|| {
                        AppError::Internal("Supporter record vanished".to_string())
                    })?;
                    let now = Utc::now();
                    let warnings = if writer.rules.support_is_valid(
                        &snapshot.proposal,
                        existing.created_at,
                        now,
                    ) {
                        Vec::new()
                    } else {
                        vec![Notice::SupportExpired]
                    };
                    let mut model: supporter::ActiveModel = existing.into();
                    model.created_at = Set(now.into());
                    let record = writer.supporter_repo.update(txn, model).await?;
                    writer.settle(txn, &snapshot).await?;
                    Ok((record, warnings))
                })
            },
        )
        .await?;

        info!(proposal_id = %proposal_id, member_id = %member_id, "Support renewed");
        Ok(Outcome::with_warnings(record, warnings))
    }

    /// Withdraw support. Confirmed proponents have to resign as proponent first.
    pub async fn revoke_support(&self, actor: &Actor, proposal_id: &str) -> AppResult<Outcome<()>> {
        let member_id = actor.require_member()?.to_string();
        let (reader, writer) = (self.clone(), self.clone());
        let (pid, mid) = (proposal_id.to_string(), member_id.clone());

        transition(
            self.proposal_repo.db(),
            move |txn| Box::pin(async move { reader.snapshot(txn, &pid, &mid).await }),
            |snapshot: &Snapshot| {
                ensure(
                    allowed_change_supporters(snapshot.issue.state, snapshot.proposal.state),
                    "Support for this proposal can not be changed in the current phase",
                )?;
                ensure(
                    !snapshot.is_confirmed_proponent(),
                    "You can not revoke your support while you are proponent",
                )
            },
            move |txn, snapshot: Snapshot| {
                Box::pin(async move {
                    writer
                        .supporter_repo
                        .delete(txn, &snapshot.proposal.id, &snapshot.member.id)
                        .await?;
                    writer
                        .tally
                        .recompute_supporters_in(txn, &snapshot.proposal.id)
                        .await?;
                    Ok(())
                })
            },
        )
        .await?;

        info!(proposal_id = %proposal_id, member_id = %member_id, "Support revoked");
        Ok(Outcome::new(()))
    }

    /// Apply to become proponent.
    ///
    /// The first proponent of a proposal without confirmed proponents is
    /// confirmed right away; every later application waits for confirmation.
    pub async fn apply_as_proponent(
        &self,
        actor: &Actor,
        proposal_id: &str,
        name: &str,
    ) -> AppResult<Outcome<supporter::Model>> {
        let member_id = actor.require_member()?.to_string();
        let (name, mut warnings) = self.proponent_name(name)?;
        let (reader, writer) = (self.clone(), self.clone());
        let (pid, mid) = (proposal_id.to_string(), member_id.clone());

        let (record, issue_id) = transition(
            self.proposal_repo.db(),
            move |txn| Box::pin(async move { reader.snapshot(txn, &pid, &mid).await }),
            |snapshot: &Snapshot| {
                ensure(
                    snapshot.member.participant,
                    "Only members entitled to participate can become proponent",
                )?;
                ensure(
                    allowed_change_proponents(snapshot.issue.state, snapshot.proposal.state),
                    "You can not become proponent of this proposal in the current phase",
                )
            },
            move |txn, snapshot: Snapshot| {
                Box::pin(async move {
                    let confirmed =
                        snapshot.is_confirmed_proponent() || snapshot.confirmed_proponents == 0;
                    let record = match snapshot.record.clone() {
                        Some(existing) => {
                            let mut model: supporter::ActiveModel = existing.into();
                            model.proponent = Set(Some(name));
                            model.proponent_confirmed = Set(confirmed);
                            writer.supporter_repo.update(txn, model).await?
                        }
                        None => {
                            let model = supporter::ActiveModel {
                                proposal_id: Set(snapshot.proposal.id.clone()),
                                member_id: Set(snapshot.member.id.clone()),
                                created_at: Set(Utc::now().into()),
                                anonymous: Set(false),
                                proponent: Set(Some(name)),
                                proponent_confirmed: Set(confirmed),
                            };
                            writer.supporter_repo.create(txn, model).await?
                        }
                    };
                    if confirmed {
                        writer
                            .check_required_proponents(txn, &snapshot.proposal)
                            .await?;
                    }
                    writer.settle(txn, &snapshot).await?;
                    Ok((record, snapshot.issue.id))
                })
            },
        )
        .await?;

        if record.proponent_confirmed {
            info!(proposal_id = %proposal_id, member_id = %member_id, "Proponent confirmed");
        } else {
            info!(proposal_id = %proposal_id, member_id = %member_id, "Proponent application pending");
            let recipients = self.confirmed_proponent_ids(proposal_id).await?;
            dispatch(
                &self.notifier,
                Notification::new(NotificationKind::ApplyProponent, proposal_id, issue_id)
                    .with_proponent(record.proponent.clone())
                    .for_members(recipients),
            )
            .await;
            warnings.push(Notice::ApplicationPending);
        }

        Ok(Outcome::with_warnings(record, warnings))
    }

    /// Confirm a pending proponent application.
    ///
    /// Only confirmed proponents and administrators may confirm.
    pub async fn confirm_proponent(
        &self,
        actor: &Actor,
        proposal_id: &str,
        applicant_id: &str,
    ) -> AppResult<Outcome<supporter::Model>> {
        let confirmer_id = actor.require_member()?.to_string();
        let is_admin = actor.is_admin();
        let (reader, writer) = (self.clone(), self.clone());
        let (pid, mid, aid) = (
            proposal_id.to_string(),
            confirmer_id.clone(),
            applicant_id.to_string(),
        );

        let (record, confirmer_name, issue_id) = transition(
            self.proposal_repo.db(),
            move |txn| {
                Box::pin(async move {
                    let snapshot = reader.snapshot(txn, &pid, &mid).await?;
                    let applicant = reader.supporter_repo.find(txn, &pid, &aid).await?;
                    Ok((snapshot, applicant))
                })
            },
            |(snapshot, applicant): &(Snapshot, Option<supporter::Model>)| {
                ensure(
                    allowed_change_proponents(snapshot.issue.state, snapshot.proposal.state),
                    "Proponents can not be confirmed in the current phase",
                )?;
                ensure(
                    is_admin || snapshot.is_confirmed_proponent(),
                    "Only confirmed proponents can confirm other proponents",
                )?;
                match applicant {
                    Some(record) if record.is_proponent() && !record.proponent_confirmed => Ok(()),
                    _ => Err(AppError::validation(
                        "The member is not applying to become proponent of this proposal",
                    )),
                }
            },
            move |txn, (snapshot, applicant): (Snapshot, Option<supporter::Model>)| {
                Box::pin(async move {
                    let applicant = applicant.ok_or_else(|| {
                        AppError::Internal("Applicant record vanished".to_string())
                    })?;
                    let mut model: supporter::ActiveModel = applicant.into();
                    model.proponent_confirmed = Set(true);
                    let record = writer.supporter_repo.update(txn, model).await?;
                    writer
                        .check_required_proponents(txn, &snapshot.proposal)
                        .await?;
                    let confirmer_name = snapshot
                        .record
                        .as_ref()
                        .and_then(|own| own.proponent.clone());
                    Ok((record, confirmer_name, snapshot.issue.id))
                })
            },
        )
        .await?;

        info!(
            proposal_id = %proposal_id,
            applicant_id = %applicant_id,
            confirmer_id = %confirmer_id,
            "Proponent confirmed"
        );
        let recipients = self.confirmed_proponent_ids(proposal_id).await?;
        dispatch(
            &self.notifier,
            Notification::new(NotificationKind::ConfirmedProponent, proposal_id, issue_id)
                .with_proponent(record.proponent.clone())
                .with_confirming_proponent(confirmer_name)
                .for_members(recipients),
        )
        .await;

        Ok(Outcome::new(record))
    }

    /// Change the display name of a proponent.
    pub async fn update_proponent_info(
        &self,
        actor: &Actor,
        proposal_id: &str,
        name: &str,
    ) -> AppResult<Outcome<supporter::Model>> {
        let member_id = actor.require_member()?.to_string();
        let (name, warnings) = self.proponent_name(name)?;
        let (reader, writer) = (self.clone(), self.clone());
        let (pid, mid) = (proposal_id.to_string(), member_id.clone());

        let record = transition(
            self.proposal_repo.db(),
            move |txn| Box::pin(async move { reader.snapshot(txn, &pid, &mid).await }),
            |snapshot: &Snapshot| {
                ensure(
                    allowed_change_proponents(snapshot.issue.state, snapshot.proposal.state),
                    "Proponent names can not be changed in the current phase",
                )?;
                match &snapshot.record {
                    Some(record) if record.is_proponent() => Ok(()),
                    _ => Err(AppError::validation(
                        "You are not proponent of this proposal",
                    )),
                }
            },
            move |txn, snapshot: Snapshot| {
                Box::pin(async move {
                    let existing = snapshot.record.ok_or_else(|| {
                        AppError::Internal("Proponent record vanished".to_string())
                    })?;
                    let mut model: supporter::ActiveModel = existing.into();
                    model.proponent = Set(Some(name));
                    writer.supporter_repo.update(txn, model).await
                })
            },
        )
        .await?;

        info!(proposal_id = %proposal_id, member_id = %member_id, "Proponent name updated");
        Ok(Outcome::with_warnings(record, warnings))
    }

    /// Withdraw a proponency; the member stays a plain supporter.
    ///
    /// Members may only withdraw their own proponency. Removing the last
    /// confirmed proponent schedules the proposal for revocation, unless a
    /// revocation is already pending.
    pub async fn remove_proponent(
        &self,
        actor: &Actor,
        proposal_id: &str,
        member_id: &str,
    ) -> AppResult<Outcome<proposal::Model>> {
        if !actor.is_admin() && actor.member_id() != Some(member_id) {
            return Err(AppError::permission_denied(
                "You can only withdraw your own proponency",
            ));
        }
        let (reader, writer) = (self.clone(), self.clone());
        let (pid, mid) = (proposal_id.to_string(), member_id.to_string());

        let (name, issue_id) = transition(
            self.proposal_repo.db(),
            move |txn| Box::pin(async move { reader.snapshot(txn, &pid, &mid).await }),
            |snapshot: &Snapshot| {
                ensure(
                    allowed_change_proponents(snapshot.issue.state, snapshot.proposal.state),
                    "Proponents can not be removed in the current phase",
                )?;
                match &snapshot.record {
                    Some(record) if record.is_proponent() => Ok(()),
                    _ => Err(AppError::validation(
                        "The member is not proponent of this proposal",
                    )),
                }
            },
            move |txn, snapshot: Snapshot| {
                Box::pin(async move {
                    let existing = snapshot.record.clone().ok_or_else(|| {
                        AppError::Internal("Proponent record vanished".to_string())
                    })?;
                    let name = existing.proponent.clone();
                    let mut model: supporter::ActiveModel = existing.into();
                    model.proponent = Set(None);
                    model.proponent_confirmed = Set(false);
                    writer.supporter_repo.update(txn, model).await?;

                    let remaining = writer
                        .supporter_repo
                        .count_confirmed_proponents(txn, &snapshot.proposal.id)
                        .await?;
                    if remaining == 0 {
                        let revoke_at = Utc::now() + writer.rules.revoke_grace;
                        if writer
                            .proposal_repo
                            .schedule_revoke(txn, &snapshot.proposal.id, revoke_at.into())
                            .await?
                        {
                            info!(
                                proposal_id = %snapshot.proposal.id,
                                revoke_at = %revoke_at,
                                "Proposal scheduled for revocation"
                            );
                        }
                    }
                    Ok((name, snapshot.issue.id))
                })
            },
        )
        .await?;

        info!(proposal_id = %proposal_id, member_id = %member_id, "Proponent removed");
        let recipients = self.confirmed_proponent_ids(proposal_id).await?;
        dispatch(
            &self.notifier,
            Notification::new(NotificationKind::RemovedProponent, proposal_id, issue_id)
                .with_proponent(name)
                .for_members(recipients),
        )
        .await;

        let proposal = self
            .proposal_repo
            .get_by_id(self.proposal_repo.db(), proposal_id)
            .await?;
        Ok(Outcome::new(proposal))
    }

    /// Supporters of a proposal as seen by `viewer`.
    pub async fn supporters(
        &self,
        proposal_id: &str,
        viewer: Option<&str>,
    ) -> AppResult<SupportersView> {
        let db = self.supporter_repo.db();
        let proposal = self.proposal_repo.get_by_id(db, proposal_id).await?;
        let records = self.supporter_repo.find_by_proposal(db, proposal_id).await?;
        let now = Utc::now();

        let own = viewer.and_then(|id| records.iter().find(|record| record.member_id == id));
        let is_supporter = match own {
            None => SupportStatus::NotSupporting,
            Some(record) if record.anonymous => SupportStatus::Anonymous,
            Some(_) => SupportStatus::Named,
        };
        let is_proponent = own.is_some_and(supporter::Model::is_proponent);
        let is_valid = own.is_some_and(|record| {
            self.rules
                .support_is_valid(&proposal, record.created_at, now)
        });

        let supporters = records
            .iter()
            .map(|record| {
                let visible = !record.anonymous || viewer == Some(record.member_id.as_str());
                SupporterEntry {
                    member_id: visible.then(|| record.member_id.clone()),
                    anonymous: record.anonymous,
                    proponent: record.proponent.clone(),
                    proponent_confirmed: record.proponent_confirmed,
                    valid: self
                        .rules
                        .support_is_valid(&proposal, record.created_at, now),
                }
            })
            .collect();

        Ok(SupportersView {
            supporters,
            is_supporter,
            is_proponent,
            is_valid,
        })
    }

    /// Member IDs of the confirmed proponents.
    pub async fn proponents(&self, proposal_id: &str) -> AppResult<Vec<String>> {
        self.confirmed_proponent_ids(proposal_id).await
    }

    /// Display names of the confirmed proponents.
    pub async fn proponent_names(&self, proposal_id: &str) -> AppResult<Vec<String>> {
        Ok(self
            .supporter_repo
            .find_confirmed_proponents(self.supporter_repo.db(), proposal_id)
            .await?
            .into_iter()
            .filter_map(|record| record.proponent)
            .collect())
    }
}
