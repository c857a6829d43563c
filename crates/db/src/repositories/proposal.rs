//! Proposal repository.

use std::sync::Arc;

use crate::entities::{
    proposal::{self, ProposalState},
    Proposal,
};
use chrono::{DateTime, FixedOffset};
use plebiscite_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

/// Proposal repository for database operations.
///
/// Every method takes the connection to run on, so the same query works on
/// the pool and inside a transaction.
#[derive(Clone)]
pub struct ProposalRepository {
    db: Arc<DatabaseConnection>,
}

impl ProposalRepository {
    /// Create a new proposal repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// The pooled connection.
    #[must_use]
    pub fn db(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }

    /// Find a proposal by ID.
    pub async fn find_by_id<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<Option<proposal::Model>> {
        Proposal::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a proposal by ID, failing if it does not exist.
    pub async fn get_by_id<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<proposal::Model> {
        self.find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::ProposalNotFound(id.to_string()))
    }

    /// Get a proposal by ID and lock its row until the transaction ends.
    ///
    /// Writers of the same proposal re-read it this way, so their recounts
    /// run one after another. Backends without row locks ignore the lock.
    pub async fn get_for_update<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<proposal::Model> {
        Proposal::find_by_id(id)
            .lock_exclusive()
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::ProposalNotFound(id.to_string()))
    }

    /// Insert a new proposal.
    pub async fn create<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: proposal::ActiveModel,
    ) -> AppResult<proposal::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a proposal.
    pub async fn update<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: proposal::ActiveModel,
    ) -> AppResult<proposal::Model> {
        model
            .update(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All proposals of an issue, oldest first.
    pub async fn find_by_issue<C: ConnectionTrait>(
        &self,
        conn: &C,
        issue_id: &str,
    ) -> AppResult<Vec<proposal::Model>> {
        Proposal::find()
            .filter(proposal::Column::IssueId.eq(issue_id))
            .order_by_asc(proposal::Column::CreatedAt)
            .order_by_asc(proposal::Column::Id)
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count the proposals of an issue that are not cancelled.
    pub async fn count_active_in_issue<C: ConnectionTrait>(
        &self,
        conn: &C,
        issue_id: &str,
    ) -> AppResult<u64> {
        Proposal::find()
            .filter(proposal::Column::IssueId.eq(issue_id))
            .filter(proposal::Column::State.is_in([
                ProposalState::Draft,
                ProposalState::Submitted,
                ProposalState::Admitted,
            ]))
            .count(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Whether a proposal of the issue other than `exclude_id` reached its quorum.
    pub async fn other_reached_quorum<C: ConnectionTrait>(
        &self,
        conn: &C,
        issue_id: &str,
        exclude_id: &str,
    ) -> AppResult<bool> {
        let count = Proposal::find()
            .filter(proposal::Column::IssueId.eq(issue_id))
            .filter(proposal::Column::Id.ne(exclude_id))
            .filter(proposal::Column::QuorumReached.eq(true))
            .count(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Admit a proposal by quorum unless it already reached it.
    ///
    /// Returns whether this call flipped `quorum_reached`.
    pub async fn admit_by_quorum<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
        admitted_at: DateTime<FixedOffset>,
    ) -> AppResult<bool> {
        let result = Proposal::update_many()
            .set(proposal::ActiveModel {
                state: Set(ProposalState::Admitted),
                quorum_reached: Set(true),
                admitted_at: Set(Some(admitted_at)),
                ..Default::default()
            })
            .filter(proposal::Column::Id.eq(id))
            .filter(proposal::Column::QuorumReached.eq(false))
            .filter(proposal::Column::SubmittedAt.is_not_null())
            .filter(
                proposal::Column::State
                    .is_in([ProposalState::Submitted, ProposalState::Admitted]),
            )
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected == 1)
    }

    /// Schedule the auto-revocation unless a deadline is already set.
    ///
    /// Returns whether the deadline was written.
    pub async fn schedule_revoke<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
        revoke_at: DateTime<FixedOffset>,
    ) -> AppResult<bool> {
        let result = Proposal::update_many()
            .set(proposal::ActiveModel {
                revoke_at: Set(Some(revoke_at)),
                ..Default::default()
            })
            .filter(proposal::Column::Id.eq(id))
            .filter(proposal::Column::RevokeAt.is_null())
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected == 1)
    }

    /// Clear a scheduled auto-revocation.
    pub async fn clear_revoke<C: ConnectionTrait>(&self, conn: &C, id: &str) -> AppResult<bool> {
        let result = Proposal::update_many()
            .set(proposal::ActiveModel {
                revoke_at: Set(None),
                ..Default::default()
            })
            .filter(proposal::Column::Id.eq(id))
            .filter(proposal::Column::RevokeAt.is_not_null())
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected == 1)
    }

    /// Proposals whose auto-revocation deadline passed.
    pub async fn find_revoke_due<C: ConnectionTrait>(
        &self,
        conn: &C,
        now: DateTime<FixedOffset>,
    ) -> AppResult<Vec<proposal::Model>> {
        Proposal::find()
            .filter(proposal::Column::RevokeAt.lte(now))
            .filter(proposal::Column::State.is_in([
                ProposalState::Draft,
                ProposalState::Submitted,
                ProposalState::Admitted,
            ]))
            .order_by_asc(proposal::Column::RevokeAt)
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
