//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_member_tables;
mod m20250101_000002_create_area_tables;
mod m20250101_000003_create_period_and_issue_tables;
mod m20250101_000004_create_proposal_tables;
mod m20250101_000005_create_ballot_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_member_tables::Migration),
            Box::new(m20250101_000002_create_area_tables::Migration),
            Box::new(m20250101_000003_create_period_and_issue_tables::Migration),
            Box::new(m20250101_000004_create_proposal_tables::Migration),
            Box::new(m20250101_000005_create_ballot_tables::Migration),
        ]
    }
}
