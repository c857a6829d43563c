//! Voter tally: the only writer of the cached supporter and voter counts.

use crate::services::issue::IssueService;
use crate::services::quorum::QuorumCalculator;
use crate::services::rules::GovernanceRules;
use chrono::Utc;
use plebiscite_common::AppResult;
use plebiscite_db::{
    atomically,
    entities::proposal::{self, ProposalState},
    repositories::{BallotRepository, CountCache, ProposalRepository, SupporterRepository},
};
use sea_orm::ConnectionTrait;
use tracing::{debug, info};

/// Voter tally.
#[derive(Clone)]
pub struct VoterTally {
    proposal_repo: ProposalRepository,
    supporter_repo: SupporterRepository,
    ballot_repo: BallotRepository,
    counts: CountCache,
    quorum: QuorumCalculator,
    issues: IssueService,
    rules: GovernanceRules,
}

impl VoterTally {
    /// Create a new voter tally.
    #[must_use]
    pub const fn new(
        proposal_repo: ProposalRepository,
        supporter_repo: SupporterRepository,
        ballot_repo: BallotRepository,
        quorum: QuorumCalculator,
        issues: IssueService,
        rules: GovernanceRules,
    ) -> Self {
        Self {
            proposal_repo,
            supporter_repo,
            ballot_repo,
            counts: CountCache::new(),
            quorum,
            issues,
            rules,
        }
    }

    /// Recount the valid supporters of a proposal and admit it once the quorum is met.
    ///
    /// Returns the proposal as stored afterwards.
    pub async fn recompute_supporter_count(&self, proposal_id: &str) -> AppResult<proposal::Model> {
        let tally = self.clone();
        let proposal_id = proposal_id.to_string();
        atomically(self.proposal_repo.db(), move |txn| {
            Box::pin(async move { tally.recompute_supporters_in(txn, &proposal_id).await })
        })
        .await
    }

    /// Same as [`Self::recompute_supporter_count`], on the given connection.
    pub async fn recompute_supporters_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        proposal_id: &str,
    ) -> AppResult<proposal::Model> {
        let proposal = self.proposal_repo.get_for_update(conn, proposal_id).await?;
        let now = Utc::now();

        let cutoff = self.rules.validity_cutoff(&proposal, now);
        let count = self
            .supporter_repo
            .count_valid(conn, proposal_id, cutoff)
            .await?;
        let supporters = i32::try_from(count).unwrap_or(i32::MAX);
        self.counts
            .store_supporters(conn, proposal_id, supporters)
            .await?;

        let collecting = matches!(
            proposal.state,
            ProposalState::Submitted | ProposalState::Admitted
        );
        if proposal.submitted_at.is_some() && !proposal.quorum_reached && collecting {
            let required = self.quorum.required_support(conn, &proposal).await?;
            if i64::from(supporters) >= required {
                let admitted_at = proposal.admitted_at.unwrap_or_else(|| now.into());
                if self
                    .proposal_repo
                    .admit_by_quorum(conn, proposal_id, admitted_at)
                    .await?
                {
                    info!(
                        proposal_id = %proposal_id,
                        supporters,
                        required,
                        "Proposal reached its quorum"
                    );
                    self.issues
                        .proposal_admitted(conn, &proposal.issue_id)
                        .await?;
                }
            }
        }

        debug!(proposal_id = %proposal_id, supporters, "Supporter count recomputed");
        self.proposal_repo.get_by_id(conn, proposal_id).await
    }

    /// Recount the assigned voters of every ballot of a period.
    pub async fn recompute_ballot_voter_counts<C: ConnectionTrait>(
        &self,
        conn: &C,
        period_id: &str,
    ) -> AppResult<()> {
        let ballots = self.ballot_repo.find_by_period(conn, period_id).await?;
        for ballot in &ballots {
            let count = self.ballot_repo.count_voters(conn, &ballot.id).await?;
            let voters = i32::try_from(count).unwrap_or(i32::MAX);
            if voters != ballot.voters {
                self.counts.store_voters(conn, &ballot.id, voters).await?;
            }
        }
        debug!(period_id = %period_id, ballots = ballots.len(), "Ballot voter counts recomputed");
        Ok(())
    }
}
