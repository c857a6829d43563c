//! Create period, issue and `votingmode_token` tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Period::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Period::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Period::NgroupId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Period::Debate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Period::Preparation)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Period::Voting)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Period::BallotAssignment).timestamp_with_time_zone())
                    .col(ColumnDef::new(Period::BallotPreparation).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Period::Counting)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Period::OnlineVoting)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Period::BallotVoting)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_period_ngroup")
                            .from(Period::Table, Period::NgroupId)
                            .to(Ngroup::Table, Ngroup::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Issue::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Issue::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Issue::AreaId).string_len(32).not_null())
                    .col(ColumnDef::new(Issue::PeriodId).string_len(32))
                    .col(
                        ColumnDef::new(Issue::State)
                            .string_len(20)
                            .not_null()
                            .default("entry"),
                    )
                    .col(
                        ColumnDef::new(Issue::VotingmodeReached)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Issue::DebateStarted).timestamp_with_time_zone())
                    .col(ColumnDef::new(Issue::CancelledAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Issue::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_issue_area")
                            .from(Issue::Table, Issue::AreaId)
                            .to(Area::Table, Area::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_issue_period")
                            .from(Issue::Table, Issue::PeriodId)
                            .to(Period::Table, Period::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_issue_area_id")
                    .table(Issue::Table)
                    .col(Issue::AreaId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_issue_period_id")
                    .table(Issue::Table)
                    .col(Issue::PeriodId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VotingmodeToken::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VotingmodeToken::IssueId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VotingmodeToken::MemberId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VotingmodeToken::Demand)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(VotingmodeToken::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(VotingmodeToken::IssueId)
                            .col(VotingmodeToken::MemberId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_votingmode_token_issue")
                            .from(VotingmodeToken::Table, VotingmodeToken::IssueId)
                            .to(Issue::Table, Issue::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_votingmode_token_member")
                            .from(VotingmodeToken::Table, VotingmodeToken::MemberId)
                            .to(Member::Table, Member::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VotingmodeToken::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Issue::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Period::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Period {
    Table,
    Id,
    NgroupId,
    Debate,
    Preparation,
    Voting,
    BallotAssignment,
    BallotPreparation,
    Counting,
    OnlineVoting,
    BallotVoting,
}

#[derive(Iden)]
enum Issue {
    Table,
    Id,
    AreaId,
    PeriodId,
    State,
    VotingmodeReached,
    DebateStarted,
    CancelledAt,
    CreatedAt,
}

#[derive(Iden)]
enum VotingmodeToken {
    Table,
    IssueId,
    MemberId,
    Demand,
    CreatedAt,
}

#[derive(Iden)]
enum Ngroup {
    Table,
    Id,
}

#[derive(Iden)]
enum Area {
    Table,
    Id,
}

#[derive(Iden)]
enum Member {
    Table,
    Id,
}
