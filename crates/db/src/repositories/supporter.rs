//! Supporter repository.

use std::sync::Arc;

use crate::entities::{supporter, Supporter};
use chrono::{DateTime, FixedOffset};
use plebiscite_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};

/// Supporter repository for database operations.
#[derive(Clone)]
pub struct SupporterRepository {
    db: Arc<DatabaseConnection>,
}

impl SupporterRepository {
    /// Create a new supporter repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// The pooled connection.
    #[must_use]
    pub fn db(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }

    /// Find the record of a member for a proposal.
    pub async fn find<C: ConnectionTrait>(
        &self,
        conn: &C,
        proposal_id: &str,
        member_id: &str,
    ) -> AppResult<Option<supporter::Model>> {
        Supporter::find_by_id((proposal_id.to_string(), member_id.to_string()))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a new record.
    pub async fn create<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: supporter::ActiveModel,
    ) -> AppResult<supporter::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a record.
    pub async fn update<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: supporter::ActiveModel,
    ) -> AppResult<supporter::Model> {
        model
            .update(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a record. Returns whether a row was removed.
    pub async fn delete<C: ConnectionTrait>(
        &self,
        conn: &C,
        proposal_id: &str,
        member_id: &str,
    ) -> AppResult<bool> {
        let result = Supporter::delete_by_id((proposal_id.to_string(), member_id.to_string()))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// All records of a proposal, oldest first.
    pub async fn find_by_proposal<C: ConnectionTrait>(
        &self,
        conn: &C,
        proposal_id: &str,
    ) -> AppResult<Vec<supporter::Model>> {
        Supporter::find()
            .filter(supporter::Column::ProposalId.eq(proposal_id))
            .order_by_asc(supporter::Column::CreatedAt)
            .order_by_asc(supporter::Column::MemberId)
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count the records created after `cutoff`.
    pub async fn count_valid<C: ConnectionTrait>(
        &self,
        conn: &C,
        proposal_id: &str,
        cutoff: DateTime<FixedOffset>,
    ) -> AppResult<u64> {
        Supporter::find()
            .filter(supporter::Column::ProposalId.eq(proposal_id))
            .filter(supporter::Column::CreatedAt.gt(cutoff))
            .count(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Confirmed proponents of a proposal, in order of their application.
    pub async fn find_confirmed_proponents<C: ConnectionTrait>(
        &self,
        conn: &C,
        proposal_id: &str,
    ) -> AppResult<Vec<supporter::Model>> {
        Supporter::find()
            .filter(supporter::Column::ProposalId.eq(proposal_id))
            .filter(supporter::Column::Proponent.is_not_null())
            .filter(supporter::Column::ProponentConfirmed.eq(true))
            .order_by_asc(supporter::Column::CreatedAt)
            .order_by_asc(supporter::Column::MemberId)
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count the confirmed proponents of a proposal.
    pub async fn count_confirmed_proponents<C: ConnectionTrait>(
        &self,
        conn: &C,
        proposal_id: &str,
    ) -> AppResult<u64> {
        Supporter::find()
            .filter(supporter::Column::ProposalId.eq(proposal_id))
            .filter(supporter::Column::Proponent.is_not_null())
            .filter(supporter::Column::ProponentConfirmed.eq(true))
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

    fn create_test_supporter(member_id: &str, proponent: Option<&str>) -> supporter::Model {
        supporter::Model {
            proposal_id: "p1".to_string(),
            member_id: member_id.to_string(),
            created_at: Utc::now().into(),
            anonymous: false,
            proponent: proponent.map(str::to_string),
            proponent_confirmed: proponent.is_some(),
        }
    }

    #[tokio::test]
    async fn test_find_record() {
        let record = create_test_supporter("m1", Some("Alice"));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[record]])
                .into_connection(),
        );

        let repo = SupporterRepository::new(db);
        let found = repo.find(repo.db(), "p1", "m1").await.unwrap().unwrap();

        assert!(found.is_confirmed_proponent());
        assert_eq!(found.proponent.as_deref(), Some("Alice"));
    }

    #[tokio::test]
    async fn test_count_valid() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(12))
                }]])
                .into_connection(),
        );

        let repo = SupporterRepository::new(db);
        let count = repo
            .count_valid(repo.db(), "p1", Utc::now().into())
            .await
            .unwrap();

        assert_eq!(count, 12);
    }

    #[tokio::test]
    async fn test_delete_missing_record() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = SupporterRepository::new(db);
        assert!(!repo.delete(repo.db(), "p1", "m1").await.unwrap());
    }
}
