//! Quorum calculator.
//!
//! The number of valid supporters a proposal needs is a fraction of its
//! area's population. The fraction rises once another proposal of the same
//! issue reached its quorum.

use crate::services::participation::ParticipationService;
use crate::services::rules::{GovernanceRules, Ratio};
use plebiscite_common::AppResult;
use plebiscite_db::{
    entities::{ngroup, proposal},
    repositories::{IssueRepository, ProposalRepository},
};
use sea_orm::ConnectionTrait;
use serde::Serialize;

/// Which quorum ratio applies to a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuorumLevel {
    Standard,
    /// Another proposal of the issue already reached its quorum.
    Alternative,
}

/// Everything needed to explain a proposal's quorum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuorumInfo {
    pub supporters: i32,
    pub required: i64,
    pub level: QuorumLevel,
    pub ratio: Ratio,
    pub participants: i32,
    pub population: i64,
    /// Supporters required if the area had exactly the group's minimum population.
    pub minimum_from_floor: i64,
    pub quorum_reached: bool,
}

/// Quorum calculator.
#[derive(Clone)]
pub struct QuorumCalculator {
    proposal_repo: ProposalRepository,
    issue_repo: IssueRepository,
    participation: ParticipationService,
    rules: GovernanceRules,
}

impl QuorumCalculator {
    /// Create a new quorum calculator.
    #[must_use]
    pub const fn new(
        proposal_repo: ProposalRepository,
        issue_repo: IssueRepository,
        participation: ParticipationService,
        rules: GovernanceRules,
    ) -> Self {
        Self {
            proposal_repo,
            issue_repo,
            participation,
            rules,
        }
    }

    /// The ratio that applies to `proposal`.
    pub async fn quorum_level<C: ConnectionTrait>(
        &self,
        conn: &C,
        proposal: &proposal::Model,
    ) -> AppResult<(QuorumLevel, Ratio)> {
        if self
            .proposal_repo
            .other_reached_quorum(conn, &proposal.issue_id, &proposal.id)
            .await?
        {
            Ok((QuorumLevel::Alternative, self.rules.quorum_alternative))
        } else {
            Ok((QuorumLevel::Standard, self.rules.quorum))
        }
    }

    /// Valid supporters `proposal` needs to be admitted.
    pub async fn required_support<C: ConnectionTrait>(
        &self,
        conn: &C,
        proposal: &proposal::Model,
    ) -> AppResult<i64> {
        let (_, ratio) = self.quorum_level(conn, proposal).await?;
        let issue = self.issue_repo.get_by_id(conn, &proposal.issue_id).await?;
        let area = self.participation.population(conn, &issue.area_id).await?;
        Ok(ratio.of(area.population))
    }

    /// Supporters required at the group's minimum population.
    #[must_use]
    pub fn minimum_from_floor(&self, ngroup: &ngroup::Model, ratio: Ratio) -> i64 {
        ratio.of(i64::from(ngroup.minimum_population.max(0)))
    }

    /// Quorum explanation for the presentation layer.
    pub async fn quorum_info<C: ConnectionTrait>(
        &self,
        conn: &C,
        proposal_id: &str,
    ) -> AppResult<QuorumInfo> {
        let proposal = self.proposal_repo.get_by_id(conn, proposal_id).await?;
        let (level, ratio) = self.quorum_level(conn, &proposal).await?;
        let issue = self.issue_repo.get_by_id(conn, &proposal.issue_id).await?;
        let area = self.participation.population(conn, &issue.area_id).await?;

        Ok(QuorumInfo {
            supporters: proposal.supporters,
            required: ratio.of(area.population),
            level,
            ratio,
            participants: area.area.participants,
            population: area.population,
            minimum_from_floor: self.minimum_from_floor(&area.ngroup, ratio),
            quorum_reached: proposal.quorum_reached,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use plebiscite_db::repositories::AreaRepository;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn calculator(db: sea_orm::DatabaseConnection) -> QuorumCalculator {
        let db = Arc::new(db);
        QuorumCalculator::new(
            ProposalRepository::new(db.clone()),
            IssueRepository::new(db.clone()),
            ParticipationService::new(AreaRepository::new(db)),
            GovernanceRules::default(),
        )
    }

    #[tokio::test]
    async fn test_standard_level_without_admitted_sibling() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[maplit::btreemap! {
                "num_items" => sea_orm::Value::BigInt(Some(0))
            }]])
            .into_connection();
        let calculator = calculator(db);
        let proposal = proposal::Model {
            id: "p1".to_string(),
            issue_id: "i1".to_string(),
            title: "A".to_string(),
            content: String::new(),
            reason: String::new(),
            state: proposal::ProposalState::Submitted,
            supporters: 0,
            quorum_reached: false,
            admission_decision: None,
            submitted_at: Some(chrono::Utc::now().into()),
            admitted_at: None,
            cancelled_at: None,
            revoke_at: None,
            created_at: chrono::Utc::now().into(),
        };

        let (level, ratio) = calculator
            .quorum_level(calculator.proposal_repo.db(), &proposal)
            .await
            .unwrap();

        assert_eq!(level, QuorumLevel::Standard);
        assert_eq!(ratio, Ratio { num: 1, den: 10 });
    }

    #[test]
    fn test_minimum_from_floor() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let calculator = calculator(db);
        let ngroup = ngroup::Model {
            id: "g1".to_string(),
            name: "Group".to_string(),
            minimum_population: 95,
        };

        assert_eq!(
            calculator.minimum_from_floor(&ngroup, Ratio { num: 1, den: 10 }),
            10
        );
    }
}
