//! Writers of the cached supporter and voter counts.
//!
//! The counts are derived from the supporter and voter tables. Repositories
//! only read them; the voter tally holds the one `CountCache`.

use crate::entities::{ballot, proposal, Ballot, Proposal};
use plebiscite_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

/// Count cache writer.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountCache;

impl CountCache {
    /// Create a count cache writer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Store the cached supporter count of a proposal.
    pub async fn store_supporters<C: ConnectionTrait>(
        &self,
        conn: &C,
        proposal_id: &str,
        supporters: i32,
    ) -> AppResult<()> {
        Proposal::update_many()
            .set(proposal::ActiveModel {
                supporters: Set(supporters),
                ..Default::default()
            })
            .filter(proposal::Column::Id.eq(proposal_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Store the cached voter count of a ballot.
    pub async fn store_voters<C: ConnectionTrait>(
        &self,
        conn: &C,
        ballot_id: &str,
        voters: i32,
    ) -> AppResult<()> {
        Ballot::update_many()
            .set(ballot::ActiveModel {
                voters: Set(voters),
                ..Default::default()
            })
            .filter(ballot::Column::Id.eq(ballot_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
