//! Area participation: who takes part in an area, and how large it is.

use chrono::Utc;
use plebiscite_common::AppResult;
use plebiscite_db::{
    entities::{area, ngroup},
    repositories::AreaRepository,
};
use sea_orm::ConnectionTrait;
use tracing::debug;

/// An area with its group and the population its quorum is computed from.
#[derive(Debug, Clone)]
pub struct AreaPopulation {
    pub area: area::Model,
    pub ngroup: ngroup::Model,
    pub population: i64,
}

/// Participation service.
#[derive(Clone)]
pub struct ParticipationService {
    area_repo: AreaRepository,
}

impl ParticipationService {
    /// Create a new participation service.
    #[must_use]
    pub const fn new(area_repo: AreaRepository) -> Self {
        Self { area_repo }
    }

    /// Record that a member takes part in an area and refresh the area's count.
    pub async fn activate<C: ConnectionTrait>(
        &self,
        conn: &C,
        area_id: &str,
        member_id: &str,
    ) -> AppResult<()> {
        self.area_repo
            .upsert_participant(conn, area_id, member_id, Utc::now().into())
            .await?;
        let count = self.area_repo.count_participants(conn, area_id).await?;
        let participants = i32::try_from(count).unwrap_or(i32::MAX);
        self.area_repo
            .store_participants(conn, area_id, participants)
            .await?;
        debug!(area_id = %area_id, member_id = %member_id, participants, "Participation activated");
        Ok(())
    }

    /// The area's population, never below its group's floor.
    pub async fn population<C: ConnectionTrait>(
        &self,
        conn: &C,
        area_id: &str,
    ) -> AppResult<AreaPopulation> {
        let (area, ngroup) = self.area_repo.get_with_ngroup(conn, area_id).await?;
        let population = area.population(ngroup.minimum_population);
        Ok(AreaPopulation {
            area,
            ngroup,
            population,
        })
    }
}
