//! Create proposal, draft and supporter tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Proposal::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Proposal::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Proposal::IssueId).string_len(32).not_null())
                    .col(ColumnDef::new(Proposal::Title).string_len(300).not_null())
                    .col(ColumnDef::new(Proposal::Content).text().not_null())
                    .col(ColumnDef::new(Proposal::Reason).text().not_null())
                    .col(
                        ColumnDef::new(Proposal::State)
                            .string_len(20)
                            .not_null()
                            .default("draft"),
                    )
                    .col(
                        ColumnDef::new(Proposal::Supporters)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Proposal::QuorumReached)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Proposal::AdmissionDecision).text())
                    .col(ColumnDef::new(Proposal::SubmittedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Proposal::AdmittedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Proposal::CancelledAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Proposal::RevokeAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Proposal::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_proposal_issue")
                            .from(Proposal::Table, Proposal::IssueId)
                            .to(Issue::Table, Issue::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_proposal_issue_id")
                    .table(Proposal::Table)
                    .col(Proposal::IssueId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_proposal_revoke_at")
                    .table(Proposal::Table)
                    .col(Proposal::RevokeAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Draft::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Draft::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Draft::ProposalId).string_len(32).not_null())
                    .col(ColumnDef::new(Draft::AuthorId).string_len(32))
                    .col(ColumnDef::new(Draft::Title).string_len(300).not_null())
                    .col(ColumnDef::new(Draft::Content).text().not_null())
                    .col(ColumnDef::new(Draft::Reason).text().not_null())
                    .col(
                        ColumnDef::new(Draft::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_draft_proposal")
                            .from(Draft::Table, Draft::ProposalId)
                            .to(Proposal::Table, Proposal::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_draft_author")
                            .from(Draft::Table, Draft::AuthorId)
                            .to(Member::Table, Member::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_draft_proposal_id")
                    .table(Draft::Table)
                    .col(Draft::ProposalId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Supporter::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Supporter::ProposalId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Supporter::MemberId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Supporter::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Supporter::Anonymous)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Supporter::Proponent).string_len(100))
                    .col(
                        ColumnDef::new(Supporter::ProponentConfirmed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .primary_key(
                        Index::create()
                            .col(Supporter::ProposalId)
                            .col(Supporter::MemberId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_supporter_proposal")
                            .from(Supporter::Table, Supporter::ProposalId)
                            .to(Proposal::Table, Proposal::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_supporter_member")
                            .from(Supporter::Table, Supporter::MemberId)
                            .to(Member::Table, Member::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_supporter_created_at")
                    .table(Supporter::Table)
                    .col(Supporter::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Supporter::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Draft::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Proposal::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Proposal {
    Table,
    Id,
    IssueId,
    Title,
    Content,
    Reason,
    State,
    Supporters,
    QuorumReached,
    AdmissionDecision,
    SubmittedAt,
    AdmittedAt,
    CancelledAt,
    RevokeAt,
    CreatedAt,
}

#[derive(Iden)]
enum Draft {
    Table,
    Id,
    ProposalId,
    AuthorId,
    Title,
    Content,
    Reason,
    CreatedAt,
}

#[derive(Iden)]
enum Supporter {
    Table,
    ProposalId,
    MemberId,
    CreatedAt,
    Anonymous,
    Proponent,
    ProponentConfirmed,
}

#[derive(Iden)]
enum Issue {
    Table,
    Id,
}

#[derive(Iden)]
enum Member {
    Table,
    Id,
}
