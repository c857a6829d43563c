//! Ballot repository: ballots and voter assignments.

use std::sync::Arc;

use crate::entities::{ballot, voter, Ballot, Voter};
use plebiscite_common::{AppError, AppResult};
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

/// Rows per multi-row voter insert; keeps each statement under the bind-parameter limit.
pub const VOTER_INSERT_CHUNK: usize = 1000;

/// Ballot repository for database operations.
#[derive(Clone)]
pub struct BallotRepository {
    db: Arc<DatabaseConnection>,
}

impl BallotRepository {
    /// Create a new ballot repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// The pooled connection.
    #[must_use]
    pub fn db(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }

    /// Find a ballot by ID.
    pub async fn find_by_id<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<Option<ballot::Model>> {
        Ballot::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a new ballot.
    pub async fn create<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: ballot::ActiveModel,
    ) -> AppResult<ballot::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All ballots of a period.
    pub async fn find_by_period<C: ConnectionTrait>(
        &self,
        conn: &C,
        period_id: &str,
    ) -> AppResult<Vec<ballot::Model>> {
        Ballot::find()
            .filter(ballot::Column::PeriodId.eq(period_id))
            .order_by_asc(ballot::Column::Name)
            .order_by_asc(ballot::Column::Id)
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Approved ballots of a period.
    pub async fn find_approved<C: ConnectionTrait>(
        &self,
        conn: &C,
        period_id: &str,
    ) -> AppResult<Vec<ballot::Model>> {
        Ballot::find()
            .filter(ballot::Column::PeriodId.eq(period_id))
            .filter(ballot::Column::Approved.eq(true))
            .order_by_asc(ballot::Column::Id)
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Set the approval flag of a ballot of the period.
    ///
    /// Returns whether the ballot exists in the period.
    pub async fn set_approved<C: ConnectionTrait>(
        &self,
        conn: &C,
        period_id: &str,
        ballot_id: &str,
        approved: bool,
    ) -> AppResult<bool> {
        let result = Ballot::update_many()
            .set(ballot::ActiveModel {
                approved: Set(approved),
                ..Default::default()
            })
            .filter(ballot::Column::Id.eq(ballot_id))
            .filter(ballot::Column::PeriodId.eq(period_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected == 1)
    }

    /// Find the assignment of a member in a period.
    pub async fn find_voter<C: ConnectionTrait>(
        &self,
        conn: &C,
        member_id: &str,
        period_id: &str,
    ) -> AppResult<Option<voter::Model>> {
        Voter::find_by_id((member_id.to_string(), period_id.to_string()))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Assign a member to a ballot, replacing an earlier assignment in the period.
    pub async fn upsert_voter<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: voter::ActiveModel,
    ) -> AppResult<()> {
        Voter::insert(model)
            .on_conflict(
                OnConflict::columns([voter::Column::MemberId, voter::Column::PeriodId])
                    .update_columns([
                        voter::Column::BallotId,
                        voter::Column::Agent,
                        voter::Column::CreatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Insert many new assignments, [`VOTER_INSERT_CHUNK`] rows per statement.
    pub async fn insert_voters<C: ConnectionTrait>(
        &self,
        conn: &C,
        models: Vec<voter::ActiveModel>,
    ) -> AppResult<u64> {
        let mut inserted = 0;
        let mut rows = models.into_iter().peekable();
        while rows.peek().is_some() {
            let chunk: Vec<_> = rows.by_ref().take(VOTER_INSERT_CHUNK).collect();
            inserted += Voter::insert_many(chunk)
                .exec_without_returning(conn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(inserted)
    }

    /// Remove the assignment of a member in a period.
    pub async fn delete_voter<C: ConnectionTrait>(
        &self,
        conn: &C,
        member_id: &str,
        period_id: &str,
    ) -> AppResult<bool> {
        let result = Voter::delete_by_id((member_id.to_string(), period_id.to_string()))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Count the members assigned to a ballot.
    pub async fn count_voters<C: ConnectionTrait>(
        &self,
        conn: &C,
        ballot_id: &str,
    ) -> AppResult<u64> {
        Voter::find()
            .filter(voter::Column::BallotId.eq(ballot_id))
            .count(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_ballot(id: &str, approved: bool) -> ballot::Model {
        ballot::Model {
            id: id.to_string(),
            period_id: "per1".to_string(),
            name: format!("Ballot {id}"),
            approved,
            voters: 0,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_approved() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_ballot("b1", true)]])
                .into_connection(),
        );

        let repo = BallotRepository::new(db);
        let ballots = repo.find_approved(repo.db(), "per1").await.unwrap();

        assert_eq!(ballots.len(), 1);
        assert!(ballots[0].approved);
    }

    #[tokio::test]
    async fn test_insert_no_voters_skips_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = BallotRepository::new(db);
        assert_eq!(repo.insert_voters(repo.db(), Vec::new()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insert_voters_splits_large_batches() {
        let exec = || MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        };
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        rows_affected: 1000,
                        ..exec()
                    },
                    MockExecResult {
                        rows_affected: 1000,
                        ..exec()
                    },
                    MockExecResult {
                        rows_affected: 500,
                        ..exec()
                    },
                ])
                .into_connection(),
        );

        let now = Utc::now();
        let models: Vec<voter::ActiveModel> = (0..2500)
            .map(|i| voter::ActiveModel {
                member_id: Set(format!("m{i}")),
                period_id: Set("per1".to_string()),
                ballot_id: Set("b1".to_string()),
                agent: Set(false),
                created_at: Set(now.into()),
            })
            .collect();

        let repo = BallotRepository::new(Arc::clone(&db));
        let inserted = repo.insert_voters(repo.db(), models).await.unwrap();
        assert_eq!(inserted, 2500);
        drop(repo);

        let log = Arc::try_unwrap(db).ok().unwrap().into_transaction_log();
        assert_eq!(log.len(), 3);
    }

    #[tokio::test]
    async fn test_set_approved_outside_period() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = BallotRepository::new(db);
        let found = repo
            .set_approved(repo.db(), "per1", "b9", true)
            .await
            .unwrap();

        assert!(!found);
    }
}
