//! Period repository.

use std::sync::Arc;

use crate::entities::{period, Period};
use plebiscite_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait};

/// Period repository for database operations.
#[derive(Clone)]
pub struct PeriodRepository {
    db: Arc<DatabaseConnection>,
}

impl PeriodRepository {
    /// Create a new period repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// The pooled connection.
    #[must_use]
    pub fn db(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }

    /// Find a period by ID.
    pub async fn find_by_id<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<Option<period::Model>> {
        Period::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a period by ID, failing if it does not exist.
    pub async fn get_by_id<C: ConnectionTrait>(&self, conn: &C, id: &str) -> AppResult<period::Model> {
        self.find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Period {id}")))
    }

    /// Insert a new period.
    pub async fn create<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: period::ActiveModel,
    ) -> AppResult<period::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
