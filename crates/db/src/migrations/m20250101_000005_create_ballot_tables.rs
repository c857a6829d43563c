//! Create ballot and voter tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ballot::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Ballot::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Ballot::PeriodId).string_len(32).not_null())
                    .col(ColumnDef::new(Ballot::Name).string_len(128).not_null())
                    .col(
                        ColumnDef::new(Ballot::Approved)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Ballot::Voters)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Ballot::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ballot_period")
                            .from(Ballot::Table, Ballot::PeriodId)
                            .to(Period::Table, Period::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ballot_period_id")
                    .table(Ballot::Table)
                    .col(Ballot::PeriodId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Voter::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Voter::MemberId).string_len(32).not_null())
                    .col(ColumnDef::new(Voter::PeriodId).string_len(32).not_null())
                    .col(ColumnDef::new(Voter::BallotId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Voter::Agent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Voter::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(Index::create().col(Voter::MemberId).col(Voter::PeriodId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_voter_member")
                            .from(Voter::Table, Voter::MemberId)
                            .to(Member::Table, Member::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_voter_period")
                            .from(Voter::Table, Voter::PeriodId)
                            .to(Period::Table, Period::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_voter_ballot")
                            .from(Voter::Table, Voter::BallotId)
                            .to(Ballot::Table, Ballot::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_voter_ballot_id")
                    .table(Voter::Table)
                    .col(Voter::BallotId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Voter::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Ballot::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Ballot {
    Table,
    Id,
    PeriodId,
    Name,
    Approved,
    Voters,
    CreatedAt,
}

#[derive(Iden)]
enum Voter {
    Table,
    MemberId,
    PeriodId,
    BallotId,
    Agent,
    CreatedAt,
}

#[derive(Iden)]
enum Period {
    Table,
    Id,
}

#[derive(Iden)]
enum Member {
    Table,
    Id,
}
