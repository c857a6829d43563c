//! Create area and participant tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Area::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Area::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Area::NgroupId).string_len(32).not_null())
                    .col(ColumnDef::new(Area::Name).string_len(128).not_null())
                    .col(
                        ColumnDef::new(Area::Participants)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_area_ngroup")
                            .from(Area::Table, Area::NgroupId)
                            .to(Ngroup::Table, Ngroup::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_area_ngroup_id")
                    .table(Area::Table)
                    .col(Area::NgroupId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Participant::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Participant::AreaId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Participant::MemberId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Participant::ActivatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(Participant::AreaId)
                            .col(Participant::MemberId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_participant_area")
                            .from(Participant::Table, Participant::AreaId)
                            .to(Area::Table, Area::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_participant_member")
                            .from(Participant::Table, Participant::MemberId)
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
            .drop_table(Table::drop().table(Participant::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Area::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Area {
    Table,
    Id,
    NgroupId,
    Name,
    Participants,
}

#[derive(Iden)]
enum Participant {
    Table,
    AreaId,
    MemberId,
    ActivatedAt,
}

#[derive(Iden)]
enum Ngroup {
    Table,
    Id,
}

#[derive(Iden)]
enum Member {
    Table,
    Id,
}
