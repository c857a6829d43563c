//! Member repository.

use std::sync::Arc;

use crate::entities::{member, member_ngroup, voter, Member, MemberNgroup};
use plebiscite_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

/// Member repository for database operations.
#[derive(Clone)]
pub struct MemberRepository {
    db: Arc<DatabaseConnection>,
}

impl MemberRepository {
    /// Create a new member repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// The pooled connection.
    #[must_use]
    pub fn db(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }

    /// Find a member by ID.
    pub async fn find_by_id<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<Option<member::Model>> {
        Member::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a member by ID, failing if it does not exist.
    pub async fn get_by_id<C: ConnectionTrait>(&self, conn: &C, id: &str) -> AppResult<member::Model> {
        self.find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member {id}")))
    }

    /// Find a member by username.
    pub async fn find_by_username<C: ConnectionTrait>(
        &self,
        conn: &C,
        username: &str,
    ) -> AppResult<Option<member::Model>> {
        Member::find()
            .filter(member::Column::Username.eq(username))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a member by the identity provider's identifier.
    pub async fn find_by_auid<C: ConnectionTrait>(
        &self,
        conn: &C,
        auid: &str,
    ) -> AppResult<Option<member::Model>> {
        Member::find()
            .filter(member::Column::Auid.eq(auid))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a member by session token.
    pub async fn find_by_token<C: ConnectionTrait>(
        &self,
        conn: &C,
        token: &str,
    ) -> AppResult<Option<member::Model>> {
        Member::find()
            .filter(member::Column::Token.eq(token))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a new member.
    pub async fn create<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: member::ActiveModel,
    ) -> AppResult<member::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a member.
    pub async fn update<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: member::ActiveModel,
    ) -> AppResult<member::Model> {
        model
            .update(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Eligible members without a ballot assignment in the period.
    pub async fn find_unassigned_participants<C: ConnectionTrait>(
        &self,
        conn: &C,
        period_id: &str,
    ) -> AppResult<Vec<member::Model>> {
        use sea_orm::sea_query::{Expr, Query};

        let assignment = Query::select()
            .column((voter::Entity, voter::Column::MemberId))
            .from(voter::Entity)
            .and_where(
                Expr::col((voter::Entity, voter::Column::MemberId))
                    .equals((member::Entity, member::Column::Id)),
            )
            .and_where(Expr::col((voter::Entity, voter::Column::PeriodId)).eq(period_id))
            .to_owned();

        Member::find()
            .filter(member::Column::Participant.eq(true))
            .filter(Expr::exists(assignment).not())
            .order_by_asc(member::Column::Id)
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Replace the group memberships of a member.
    pub async fn replace_ngroups<C: ConnectionTrait>(
        &self,
        conn: &C,
        member_id: &str,
        ngroup_ids: &[String],
    ) -> AppResult<()> {
        MemberNgroup::delete_many()
            .filter(member_ngroup::Column::MemberId.eq(member_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if ngroup_ids.is_empty() {
            return Ok(());
        }

        let rows = ngroup_ids.iter().map(|ngroup_id| member_ngroup::ActiveModel {
            member_id: Set(member_id.to_string()),
            ngroup_id: Set(ngroup_id.clone()),
        });
        MemberNgroup::insert_many(rows)
            .exec_without_returning(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Group IDs of a member.
    pub async fn ngroup_ids<C: ConnectionTrait>(
        &self,
        conn: &C,
        member_id: &str,
    ) -> AppResult<Vec<String>> {
        let rows = MemberNgroup::find()
            .filter(member_ngroup::Column::MemberId.eq(member_id))
            .order_by_asc(member_ngroup::Column::NgroupId)
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(rows.into_iter().map(|r| r.ngroup_id).collect())
    }
}
