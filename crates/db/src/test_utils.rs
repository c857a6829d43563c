//! Test utilities for database operations.
//!
//! Tests run against an in-memory `SQLite` database migrated with the
//! production migrator. Set `TEST_DATABASE_URL` to run them elsewhere.

use crate::entities::{
    area, ballot, issue::{self, IssueState}, member, ngroup, period, proposal::{self, ProposalState},
    supporter,
};
use crate::migrations::Migrator;
use chrono::{DateTime, Duration, FixedOffset, Utc};
use plebiscite_common::IdGenerator;
use sea_orm::{
    ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, DbErr, EntityTrait, Set,
};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use tracing::info;

/// IDs of a freshly seeded group, area, issue and proposal.
#[derive(Debug, Clone)]
pub struct SeededProposal {
    /// Group of the area.
    pub ngroup_id: String,
    /// Area of the issue.
    pub area_id: String,
    /// Issue of the proposal.
    pub issue_id: String,
    /// The proposal.
    pub proposal_id: String,
}

/// A migrated test database.
pub struct TestDatabase {
    conn: Arc<DatabaseConnection>,
    id_gen: IdGenerator,
}

impl TestDatabase {
    /// Connect and run all migrations.
    ///
    /// The pool holds a single connection: every connection to
    /// `sqlite::memory:` opens its own empty database.
    pub async fn new() -> Result<Self, DbErr> {
        let url =
            std::env::var("TEST_DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());

        let mut opt = ConnectOptions::new(url);
        opt.max_connections(1).min_connections(1).sqlx_logging(false);

        let conn = Database::connect(opt).await?;
        Migrator::up(&conn, None).await?;

        info!("Migrated test database");

        Ok(Self {
            conn: Arc::new(conn),
            id_gen: IdGenerator::new(),
        })
    }

    /// Get the database connection.
    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Shared handle to the connection, for building repositories and services.
    #[must_use]
    pub fn pool(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.conn)
    }

    /// Insert a group with the given population floor.
    pub async fn seed_ngroup(&self, minimum_population: i32) -> Result<ngroup::Model, DbErr> {
        ngroup::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set("Test group".to_string()),
            minimum_population: Set(minimum_population),
        }
        .insert(self.connection())
        .await
    }

    /// Insert an area without participants.
    pub async fn seed_area(&self, ngroup_id: &str) -> Result<area::Model, DbErr> {
        area::ActiveModel {
            id: Set(self.id_gen.generate()),
            ngroup_id: Set(ngroup_id.to_string()),
            name: Set("Test area".to_string()),
            participants: Set(0),
        }
        .insert(self.connection())
        .await
    }

    /// Insert a period whose debate starts at `debate`, each later phase a week apart.
    pub async fn seed_period(
        &self,
        ngroup_id: &str,
        debate: DateTime<Utc>,
    ) -> Result<period::Model, DbErr> {
        period::ActiveModel {
            id: Set(self.id_gen.generate()),
            ngroup_id: Set(ngroup_id.to_string()),
            debate: Set(debate.into()),
            preparation: Set((debate + Duration::weeks(1)).into()),
            voting: Set((debate + Duration::weeks(3)).into()),
            ballot_assignment: Set(Some((debate + Duration::days(8)).into())),
            ballot_preparation: Set(Some((debate + Duration::days(15)).into())),
            counting: Set((debate + Duration::weeks(4)).into()),
            online_voting: Set(true),
            ballot_voting: Set(true),
        }
        .insert(self.connection())
        .await
    }

    /// Insert an issue.
    pub async fn seed_issue(
        &self,
        area_id: &str,
        period_id: Option<&str>,
        state: IssueState,
    ) -> Result<issue::Model, DbErr> {
        issue::ActiveModel {
            id: Set(self.id_gen.generate()),
            area_id: Set(area_id.to_string()),
            period_id: Set(period_id.map(str::to_string)),
            state: Set(state),
            votingmode_reached: Set(false),
            debate_started: Set(None),
            cancelled_at: Set(None),
            created_at: Set(Utc::now().into()),
        }
        .insert(self.connection())
        .await
    }

    /// Insert a proposal into an issue.
    pub async fn seed_proposal_in(
        &self,
        issue_id: &str,
        state: ProposalState,
    ) -> Result<proposal::Model, DbErr> {
        let now: DateTime<FixedOffset> = Utc::now().into();
        let submitted_at = match state {
            ProposalState::Draft => None,
            _ => Some(now),
        };
        proposal::ActiveModel {
            id: Set(self.id_gen.generate()),
            issue_id: Set(issue_id.to_string()),
            title: Set("Test proposal".to_string()),
            content: Set("Content".to_string()),
            reason: Set("Reason".to_string()),
            state: Set(state),
            supporters: Set(0),
            quorum_reached: Set(false),
            admission_decision: Set(None),
            submitted_at: Set(submitted_at),
            admitted_at: Set(None),
            cancelled_at: Set(None),
            revoke_at: Set(None),
            created_at: Set(now),
        }
        .insert(self.connection())
        .await
    }

    /// Insert a draft proposal in a new issue of a new area.
    pub async fn seed_proposal(&self) -> Result<SeededProposal, DbErr> {
        let ngroup = self.seed_ngroup(100).await?;
        let area = self.seed_area(&ngroup.id).await?;
        let issue = self.seed_issue(&area.id, None, IssueState::Entry).await?;
        let proposal = self.seed_proposal_in(&issue.id, ProposalState::Draft).await?;
        Ok(SeededProposal {
            ngroup_id: ngroup.id,
            area_id: area.id,
            issue_id: issue.id,
            proposal_id: proposal.id,
        })
    }

    /// Insert an eligible member with a session token equal to its username.
    pub async fn seed_member(&self, username: &str) -> Result<member::Model, DbErr> {
        self.member_row(username).insert(self.connection()).await
    }

    /// Insert `count` participants named `{prefix}{i}`, many rows per statement.
    pub async fn seed_members(&self, prefix: &str, count: usize) -> Result<(), DbErr> {
        let rows: Vec<member::ActiveModel> = (0..count)
            .map(|i| self.member_row(&format!("{prefix}{i}")))
            .collect();
        for chunk in rows.chunks(500) {
            member::Entity::insert_many(chunk.to_vec())
                .exec_without_returning(self.connection())
                .await?;
        }
        Ok(())
    }

    fn member_row(&self, username: &str) -> member::ActiveModel {
        member::ActiveModel {
            id: Set(self.id_gen.generate()),
            auid: Set(format!("auid-{username}")),
            username: Set(username.to_string()),
            public_id: Set(Some(username.to_string())),
            profile: Set(None),
            participant: Set(true),
            is_admin: Set(false),
            token: Set(Some(username.to_string())),
            created_at: Set(Utc::now().into()),
        }
    }

    /// Insert a supporter record created at `created_at`.
    pub async fn seed_supporter(
        &self,
        proposal_id: &str,
        member_id: &str,
        created_at: DateTime<Utc>,
        proponent: Option<(&str, bool)>,
    ) -> Result<supporter::Model, DbErr> {
        supporter::ActiveModel {
            proposal_id: Set(proposal_id.to_string()),
            member_id: Set(member_id.to_string()),
            created_at: Set(created_at.into()),
            anonymous: Set(false),
            proponent: Set(proponent.map(|(name, _)| name.to_string())),
            proponent_confirmed: Set(proponent.is_some_and(|(_, confirmed)| confirmed)),
        }
        .insert(self.connection())
        .await
    }

    /// Insert a ballot location.
    pub async fn seed_ballot(
        &self,
        period_id: &str,
        name: &str,
        approved: bool,
    ) -> Result<ballot::Model, DbErr> {
        ballot::ActiveModel {
            id: Set(self.id_gen.generate()),
            period_id: Set(period_id.to_string()),
            name: Set(name.to_string()),
            approved: Set(approved),
            voters: Set(0),
            created_at: Set(Utc::now().into()),
        }
        .insert(self.connection())
        .await
    }
}
