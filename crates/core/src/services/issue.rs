//! Issue service: issue-level reactions to proposal changes.

use chrono::Utc;
use plebiscite_common::{AppError, AppResult, IdGenerator};
use plebiscite_db::{
    entities::issue::{self, IssueState},
    repositories::{AreaRepository, IssueRepository, PeriodRepository, ProposalRepository},
};
use sea_orm::{ConnectionTrait, Set};
use tracing::{debug, info};

/// Issue service for business logic.
#[derive(Clone)]
pub struct IssueService {
    issue_repo: IssueRepository,
    proposal_repo: ProposalRepository,
    period_repo: PeriodRepository,
    area_repo: AreaRepository,
    id_gen: IdGenerator,
}

impl IssueService {
    /// Create a new issue service.
    #[must_use]
    pub const fn new(
        issue_repo: IssueRepository,
        proposal_repo: ProposalRepository,
        period_repo: PeriodRepository,
        area_repo: AreaRepository,
    ) -> Self {
        Self {
            issue_repo,
            proposal_repo,
            period_repo,
            area_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Open a new issue in an area, optionally in a period of the area's group.
    pub async fn create<C: ConnectionTrait>(
        &self,
        conn: &C,
        area_id: &str,
        period_id: Option<&str>,
    ) -> AppResult<issue::Model> {
        if let Some(period_id) = period_id {
            let area = self.area_repo.get_by_id(conn, area_id).await?;
            let period = self.period_repo.get_by_id(conn, period_id).await?;
            if period.ngroup_id != area.ngroup_id {
                return Err(AppError::validation(
                    "The period does not belong to the group of the area",
                ));
            }
        }

        let model = issue::ActiveModel {
            id: Set(self.id_gen.generate()),
            area_id: Set(area_id.to_string()),
            period_id: Set(period_id.map(str::to_string)),
            state: Set(IssueState::Entry),
            votingmode_reached: Set(false),
            debate_started: Set(None),
            cancelled_at: Set(None),
            created_at: Set(Utc::now().into()),
        };
        let issue = self.issue_repo.create(conn, model).await?;
        info!(issue_id = %issue.id, area_id = %area_id, period_id = ?period_id, "Issue created");
        Ok(issue)
    }

    /// Open a new issue continuing where `template` stands.
    ///
    /// The new issue keeps the area, period, phase and voting mode.
    pub async fn create_like<C: ConnectionTrait>(
        &self,
        conn: &C,
        template: &issue::Model,
    ) -> AppResult<issue::Model> {
        let model = issue::ActiveModel {
            id: Set(self.id_gen.generate()),
            area_id: Set(template.area_id.clone()),
            period_id: Set(template.period_id.clone()),
            state: Set(template.state),
            votingmode_reached: Set(template.votingmode_reached),
            debate_started: Set(template.debate_started),
            cancelled_at: Set(None),
            created_at: Set(Utc::now().into()),
        };
        let issue = self.issue_repo.create(conn, model).await?;
        info!(issue_id = %issue.id, template_id = %template.id, "Issue split off");
        Ok(issue)
    }

    /// React to the admission of one of the issue's proposals.
    ///
    /// An issue in entry whose period's debate already began moves into debate.
    pub async fn proposal_admitted<C: ConnectionTrait>(
        &self,
        conn: &C,
        issue_id: &str,
    ) -> AppResult<()> {
        let issue = self.issue_repo.get_by_id(conn, issue_id).await?;
        if issue.state != IssueState::Entry {
            return Ok(());
        }
        let Some(period_id) = issue.period_id.as_deref() else {
            debug!(issue_id = %issue_id, "Admitted proposal in issue without period");
            return Ok(());
        };

        let period = self.period_repo.get_by_id(conn, period_id).await?;
        let now = Utc::now();
        if period.debate > now {
            debug!(issue_id = %issue_id, period_id = %period_id, "Debate of period not started yet");
            return Ok(());
        }

        if self.issue_repo.start_debate(conn, issue_id, now.into()).await? {
            info!(issue_id = %issue_id, period_id = %period_id, "Issue entered debate");
        }
        Ok(())
    }

    /// Cancel an issue.
    pub async fn cancel<C: ConnectionTrait>(&self, conn: &C, issue_id: &str) -> AppResult<bool> {
        let cancelled = self
            .issue_repo
            .cancel(conn, issue_id, Utc::now().into())
            .await?;
        if cancelled {
            info!(issue_id = %issue_id, "Issue cancelled");
        }
        Ok(cancelled)
    }

    /// Cancel the issue once none of its proposals is left open.
    pub async fn cancel_if_exhausted<C: ConnectionTrait>(
        &self,
        conn: &C,
        issue_id: &str,
    ) -> AppResult<bool> {
        if self
            .proposal_repo
            .count_active_in_issue(conn, issue_id)
            .await?
            > 0
        {
            return Ok(false);
        }
        self.cancel(conn, issue_id).await
    }

    /// Cancel the issue if it has no proposals at all.
    pub async fn cancel_if_empty<C: ConnectionTrait>(
        &self,
        conn: &C,
        issue_id: &str,
    ) -> AppResult<bool> {
        if !self
            .proposal_repo
            .find_by_issue(conn, issue_id)
            .await?
            .is_empty()
        {
            return Ok(false);
        }
        self.cancel(conn, issue_id).await
    }
}
