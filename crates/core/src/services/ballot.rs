//! Ballot assignment: which members vote at which ballot location.

use crate::services::actor::Actor;
use crate::services::gate::ensure;
use crate::services::tally::VoterTally;
use chrono::Utc;
use plebiscite_common::{AppError, AppResult, IdGenerator};
use plebiscite_db::{
    atomically,
    entities::{ballot, member, period::BallotPhase, voter},
    repositories::{BallotRepository, MemberRepository, PeriodRepository},
    transition,
};
use rand::seq::SliceRandom;
use sea_orm::{ConnectionTrait, Set};
use tracing::info;

/// Ballot service for business logic.
#[derive(Clone)]
pub struct BallotService {
    ballot_repo: BallotRepository,
    period_repo: PeriodRepository,
    member_repo: MemberRepository,
    tally: VoterTally,
    id_gen: IdGenerator,
}

impl BallotService {
    /// Create a new ballot service.
    #[must_use]
    pub const fn new(
        ballot_repo: BallotRepository,
        period_repo: PeriodRepository,
        member_repo: MemberRepository,
        tally: VoterTally,
    ) -> Self {
        Self {
            ballot_repo,
            period_repo,
            member_repo,
            tally,
            id_gen: IdGenerator::new(),
        }
    }

    /// Ballots of a period, by name.
    pub async fn ballots(&self, period_id: &str) -> AppResult<Vec<ballot::Model>> {
        self.ballot_repo
            .find_by_period(self.ballot_repo.db(), period_id)
            .await
    }

    /// The ballot a member is assigned to in a period.
    pub async fn voter(&self, member_id: &str, period_id: &str) -> AppResult<Option<voter::Model>> {
        self.ballot_repo
            .find_voter(self.ballot_repo.db(), member_id, period_id)
            .await
    }

    /// Add an unapproved ballot location to a period.
    pub async fn create_ballot(
        &self,
        actor: &Actor,
        period_id: &str,
        name: &str,
    ) -> AppResult<ballot::Model> {
        actor.require_admin()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("The ballot name must not be empty"));
        }
        let db = self.ballot_repo.db();
        self.period_repo.get_by_id(db, period_id).await?;

        let ballot = self
            .ballot_repo
            .create(
                db,
                ballot::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    period_id: Set(period_id.to_string()),
                    name: Set(name.to_string()),
                    approved: Set(false),
                    voters: Set(0),
                    created_at: Set(Utc::now().into()),
                },
            )
            .await?;
        info!(ballot_id = %ballot.id, period_id = %period_id, "Ballot created");
        Ok(ballot)
    }

    async fn ensure_assignment_open<C: ConnectionTrait>(
        &self,
        conn: &C,
        period_id: &str,
    ) -> AppResult<()> {
        let period = self.period_repo.get_by_id(conn, period_id).await?;
        ensure(
            period.ballot_voting
                && period.ballot_phase(Utc::now().into()) == BallotPhase::BallotAssignment,
            "Ballots can only be chosen during the ballot assignment phase",
        )
    }

    /// Choose the ballot a member votes at, replacing an earlier choice.
    pub async fn select_ballot(
        &self,
        actor: &Actor,
        period_id: &str,
        ballot_id: &str,
        agent: bool,
    ) -> AppResult<voter::Model> {
        let member_id = actor.require_member()?.to_string();
        let (reader, writer) = (self.clone(), self.clone());
        let (pid, bid, mid) = (
            period_id.to_string(),
            ballot_id.to_string(),
            member_id.clone(),
        );

        let voter = transition(
            self.ballot_repo.db(),
            move |txn| {
                Box::pin(async move {
                    reader.ensure_assignment_open(txn, &pid).await?;
                    let member = reader.member_repo.get_by_id(txn, &mid).await?;
                    let ballot = reader.ballot_repo.find_by_id(txn, &bid).await?;
                    Ok((member, ballot, pid))
                })
            },
            |(member, ballot, pid): &(member::Model, Option<ballot::Model>, String)| {
                ensure(
                    member.participant,
                    "Only members entitled to vote can choose a ballot",
                )?;
                match ballot {
                    Some(ballot) if ballot.period_id == *pid => ensure(
                        ballot.approved,
                        "The ballot has not been approved",
                    ),
                    _ => Err(AppError::NotFound(format!("Ballot {ballot_id}"))),
                }
            },
            move |txn, (member, ballot, pid): (member::Model, Option<ballot::Model>, String)| {
                Box::pin(async move {
                    let ballot = ballot
                        .ok_or_else(|| AppError::Internal("Ballot vanished".to_string()))?;
                    writer
                        .ballot_repo
                        .upsert_voter(
                            txn,
                            voter::ActiveModel {
                                member_id: Set(member.id.clone()),
                                period_id: Set(pid.clone()),
                                ballot_id: Set(ballot.id),
                                agent: Set(agent),
                                created_at: Set(Utc::now().into()),
                            },
                        )
                        .await?;
                    writer.tally.recompute_ballot_voter_counts(txn, &pid).await?;
                    writer
                        .ballot_repo
                        .find_voter(txn, &member.id, &pid)
                        .await?
                        .ok_or_else(|| AppError::Internal("Assignment vanished".to_string()))
                })
            },
        )
        .await?;

        info!(
            member_id = %member_id,
            period_id = %period_id,
            ballot_id = %voter.ballot_id,
            agent,
            "Ballot selected"
        );
        Ok(voter)
    }

    /// Withdraw the ballot choice of a member.
    pub async fn unselect_ballot(&self, actor: &Actor, period_id: &str) -> AppResult<bool> {
        let member_id = actor.require_member()?.to_string();
        let service = self.clone();
        let (pid, mid) = (period_id.to_string(), member_id.clone());

        let removed = atomically(self.ballot_repo.db(), move |txn| {
            Box::pin(async move {
                service.ensure_assignment_open(txn, &pid).await?;
                let removed = service.ballot_repo.delete_voter(txn, &mid, &pid).await?;
                service.tally.recompute_ballot_voter_counts(txn, &pid).await?;
                Ok(removed)
            })
        })
        .await?;

        info!(member_id = %member_id, period_id = %period_id, removed, "Ballot unselected");
        Ok(removed)
    }

    /// Set the approval flags of ballots of a period.
    ///
    /// Either every selection is applied or none.
    pub async fn save_approved_ballots(
        &self,
        actor: &Actor,
        period_id: &str,
        selections: Vec<(String, bool)>,
    ) -> AppResult<Vec<ballot::Model>> {
        actor.require_admin()?;
        let service = self.clone();
        let pid = period_id.to_string();

        let ballots = atomically(self.ballot_repo.db(), move |txn| {
            Box::pin(async move {
                for (ballot_id, approved) in &selections {
                    if !service
                        .ballot_repo
                        .set_approved(txn, &pid, ballot_id, *approved)
                        .await?
                    {
                        return Err(AppError::NotFound(format!("Ballot {ballot_id}")));
                    }
                }
                service.ballot_repo.find_by_period(txn, &pid).await
            })
        })
        .await?;

        let approved = ballots.iter().filter(|b| b.approved).count();
        info!(period_id = %period_id, approved, "Ballot approvals saved");
        Ok(ballots)
    }

    /// Assign every eligible member without a ballot to a random approved ballot.
    ///
    /// Without approved ballots nothing happens. Returns the number of new
    /// assignments.
    pub async fn assign_remaining_members(&self, actor: &Actor, period_id: &str) -> AppResult<u64> {
        actor.require_admin()?;
        let service = self.clone();
        let pid = period_id.to_string();

        let assigned = atomically(self.ballot_repo.db(), move |txn| {
            Box::pin(async move {
                service.period_repo.get_by_id(txn, &pid).await?;
                let approved = service.ballot_repo.find_approved(txn, &pid).await?;
                if approved.is_empty() {
                    return Ok(0);
                }

                let members = service
                    .member_repo
                    .find_unassigned_participants(txn, &pid)
                    .await?;

                let now = Utc::now();
                let models: Vec<voter::ActiveModel> = {
                    let mut rng = rand::thread_rng();
                    members
                        .iter()
                        .filter_map(|member| {
                            approved.choose(&mut rng).map(|ballot| voter::ActiveModel {
                                member_id: Set(member.id.clone()),
                                period_id: Set(pid.clone()),
                                ballot_id: Set(ballot.id.clone()),
                                agent: Set(false),
                                created_at: Set(now.into()),
                            })
                        })
                        .collect()
                };

                let inserted = service.ballot_repo.insert_voters(txn, models).await?;
                service.tally.recompute_ballot_voter_counts(txn, &pid).await?;
                Ok(inserted)
            })
        })
        .await?;

        info!(period_id = %period_id, assigned, "Remaining members assigned to ballots");
        Ok(assigned)
    }
}
