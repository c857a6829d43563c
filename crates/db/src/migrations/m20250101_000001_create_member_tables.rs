//! Create member, ngroup and `member_ngroup` tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Member::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Member::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Member::Auid)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Member::Username)
                            .string_len(128)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Member::PublicId).string_len(256))
                    .col(ColumnDef::new(Member::Profile).text())
                    .col(
                        ColumnDef::new(Member::Participant)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Member::IsAdmin)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Member::Token).string_len(64))
                    .col(
                        ColumnDef::new(Member::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_member_token")
                    .table(Member::Table)
                    .col(Member::Token)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Ngroup::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Ngroup::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Ngroup::Name).string_len(128).not_null())
                    .col(
                        ColumnDef::new(Ngroup::MinimumPopulation)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MemberNgroup::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MemberNgroup::MemberId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MemberNgroup::NgroupId)
                            .string_len(32)
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(MemberNgroup::MemberId)
                            .col(MemberNgroup::NgroupId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_member_ngroup_member")
                            .from(MemberNgroup::Table, MemberNgroup::MemberId)
                            .to(Member::Table, Member::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_member_ngroup_ngroup")
                            .from(MemberNgroup::Table, MemberNgroup::NgroupId)
                            .to(Ngroup::Table, Ngroup::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MemberNgroup::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Ngroup::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Member::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Member {
    Table,
    Id,
    Auid,
    Username,
    PublicId,
    Profile,
    Participant,
    IsAdmin,
    Token,
    CreatedAt,
}

#[derive(Iden)]
enum Ngroup {
    Table,
    Id,
    Name,
    MinimumPopulation,
}

#[derive(Iden)]
enum MemberNgroup {
    Table,
    MemberId,
    NgroupId,
}
