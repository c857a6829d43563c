//! Draft repository.

use std::sync::Arc;

use crate::entities::{draft, Draft};
use plebiscite_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};

/// Draft repository. Drafts are append-only.
#[derive(Clone)]
pub struct DraftRepository {
    db: Arc<DatabaseConnection>,
}

impl DraftRepository {
    /// Create a new draft repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// The pooled connection.
    #[must_use]
    pub fn db(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }

    /// Insert a snapshot.
    pub async fn create<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: draft::ActiveModel,
    ) -> AppResult<draft::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Snapshots of a proposal, newest first.
    pub async fn find_by_proposal<C: ConnectionTrait>(
        &self,
        conn: &C,
        proposal_id: &str,
    ) -> AppResult<Vec<draft::Model>> {
        Draft::find()
            .filter(draft::Column::ProposalId.eq(proposal_id))
            .order_by_desc(draft::Column::CreatedAt)
            .order_by_desc(draft::Column::Id)
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
