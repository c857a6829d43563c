//! Area repository: areas, their group and participation.

use std::sync::Arc;

use crate::entities::{area, ngroup, participant, Area, Ngroup, Participant};
use chrono::{DateTime, FixedOffset};
use plebiscite_common::{AppError, AppResult};
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, Set,
};

/// Area repository for database operations.
#[derive(Clone)]
pub struct AreaRepository {
    db: Arc<DatabaseConnection>,
}

impl AreaRepository {
    /// Create a new area repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// The pooled connection.
    #[must_use]
    pub fn db(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }

    /// Get an area by ID, failing if it does not exist.
    pub async fn get_by_id<C: ConnectionTrait>(&self, conn: &C, id: &str) -> AppResult<area::Model> {
        Area::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Area {id}")))
    }

    /// Get an area together with its group.
    pub async fn get_with_ngroup<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<(area::Model, ngroup::Model)> {
        let (area, ngroup) = Area::find_by_id(id)
            .find_also_related(Ngroup)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Area {id}")))?;
        let ngroup = ngroup.ok_or_else(|| {
            AppError::Internal(format!("Area {id} has no group {}", area.ngroup_id))
        })?;
        Ok((area, ngroup))
    }

    /// Insert a new area.
    pub async fn create<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: area::ActiveModel,
    ) -> AppResult<area::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Record a member as participant of an area, refreshing the activation time.
    pub async fn upsert_participant<C: ConnectionTrait>(
        &self,
        conn: &C,
        area_id: &str,
        member_id: &str,
        now: DateTime<FixedOffset>,
    ) -> AppResult<()> {
        let model = participant::ActiveModel {
            area_id: Set(area_id.to_string()),
            member_id: Set(member_id.to_string()),
            activated_at: Set(now),
        };
        Participant::insert(model)
            .on_conflict(
                OnConflict::columns([participant::Column::AreaId, participant::Column::MemberId])
                    .update_column(participant::Column::ActivatedAt)
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Count the participants of an area.
    pub async fn count_participants<C: ConnectionTrait>(
        &self,
        conn: &C,
        area_id: &str,
    ) -> AppResult<u64> {
        Participant::find()
            .filter(participant::Column::AreaId.eq(area_id))
            .count(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store the cached participant count.
    pub async fn store_participants<C: ConnectionTrait>(
        &self,
        conn: &C,
        area_id: &str,
        participants: i32,
    ) -> AppResult<()> {
        Area::update_many()
            .set(area::ActiveModel {
                participants: Set(participants),
                ..Default::default()
            })
            .filter(area::Column::Id.eq(area_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_get_by_id_found() {
        let area = area::Model {
            id: "a1".to_string(),
            ngroup_id: "g1".to_string(),
            name: "Environment".to_string(),
            participants: 42,
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[area]])
                .into_connection(),
        );

        let repo = AreaRepository::new(db);
        let found = repo.get_by_id(repo.db(), "a1").await.unwrap();

        assert_eq!(found.participants, 42);
        assert_eq!(found.population(100), 100);
        assert_eq!(found.population(10), 42);
    }

    #[tokio::test]
    async fn test_count_participants() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(7))
                }]])
                .into_connection(),
        );

        let repo = AreaRepository::new(db);
        assert_eq!(repo.count_participants(repo.db(), "a1").await.unwrap(), 7);
    }
}
