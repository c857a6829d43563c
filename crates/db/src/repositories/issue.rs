//! Issue repository.

use std::sync::Arc;

use crate::entities::{
    issue::{self, IssueState},
    votingmode_token, Issue, VotingmodeToken,
};
use chrono::{DateTime, FixedOffset};
use plebiscite_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

/// Issue repository for database operations.
#[derive(Clone)]
pub struct IssueRepository {
    db: Arc<DatabaseConnection>,
}

impl IssueRepository {
    /// Create a new issue repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// The pooled connection.
    #[must_use]
    pub fn db(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }

    /// Find an issue by ID.
    pub async fn find_by_id<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<Option<issue::Model>> {
        Issue::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an issue by ID, failing if it does not exist.
    pub async fn get_by_id<C: ConnectionTrait>(&self, conn: &C, id: &str) -> AppResult<issue::Model> {
        self.find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Issue {id}")))
    }

    /// Insert a new issue.
    pub async fn create<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: issue::ActiveModel,
    ) -> AppResult<issue::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Move an issue from `entry` into `debate`.
    ///
    /// Returns whether the issue was still in `entry`.
    pub async fn start_debate<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
        now: DateTime<FixedOffset>,
    ) -> AppResult<bool> {
        let result = Issue::update_many()
            .set(issue::ActiveModel {
                state: Set(IssueState::Debate),
                debate_started: Set(Some(now)),
                ..Default::default()
            })
            .filter(issue::Column::Id.eq(id))
            .filter(issue::Column::State.eq(IssueState::Entry))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected == 1)
    }

    /// Cancel an issue. Returns whether it was not cancelled before.
    pub async fn cancel<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
        now: DateTime<FixedOffset>,
    ) -> AppResult<bool> {
        let result = Issue::update_many()
            .set(issue::ActiveModel {
                state: Set(IssueState::Cancelled),
                cancelled_at: Set(Some(now)),
                ..Default::default()
            })
            .filter(issue::Column::Id.eq(id))
            .filter(issue::Column::State.ne(IssueState::Cancelled))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected == 1)
    }

    /// Issues of the same period in any phase, except `exclude_id`.
    ///
    /// Issues without a period only match other issues without a period.
    pub async fn find_in_period<C: ConnectionTrait>(
        &self,
        conn: &C,
        period_id: Option<&str>,
        exclude_id: &str,
    ) -> AppResult<Vec<issue::Model>> {
        let mut query = Issue::find().filter(issue::Column::Id.ne(exclude_id));

        query = match period_id {
            Some(period_id) => query.filter(issue::Column::PeriodId.eq(period_id)),
            None => query.filter(issue::Column::PeriodId.is_null()),
        };

        query
            .order_by_asc(issue::Column::CreatedAt)
            .order_by_asc(issue::Column::Id)
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Members that registered a voting-mode preference on an issue.
    pub async fn votingmode_members<C: ConnectionTrait>(
        &self,
        conn: &C,
        issue_id: &str,
    ) -> AppResult<Vec<String>> {
        let tokens = VotingmodeToken::find()
            .filter(votingmode_token::Column::IssueId.eq(issue_id))
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(tokens.into_iter().map(|t| t.member_id).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<issue::Model>::new()])
                .into_connection(),
        );

        let repo = IssueRepository::new(db);
        let result = repo.get_by_id(repo.db(), "i1").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_start_debate_only_once() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    },
                ])
                .into_connection(),
        );

        let repo = IssueRepository::new(db);
        let now = Utc::now().into();
        assert!(repo.start_debate(repo.db(), "i1", now).await.unwrap());
        assert!(!repo.start_debate(repo.db(), "i1", now).await.unwrap());
    }

    #[tokio::test]
    async fn test_votingmode_members() {
        let token = votingmode_token::Model {
            issue_id: "i1".to_string(),
            member_id: "m1".to_string(),
            demand: true,
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[token]])
                .into_connection(),
        );

        let repo = IssueRepository::new(db);
        let members = repo.votingmode_members(repo.db(), "i1").await.unwrap();

        assert_eq!(members, vec!["m1".to_string()]);
    }
}
