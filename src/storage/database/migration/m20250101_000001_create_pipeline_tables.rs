//! Lexemes, process runs and process results

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Lexemes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Lexemes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Lexemes::Fingerprint)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Lexemes::SourceText).text().not_null())
                    .col(ColumnDef::new(Lexemes::NormalizedText).text().not_null())
                    .col(
                        ColumnDef::new(Lexemes::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Lexemes::ProcessedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Lexemes::Metadata).json().not_null())
                    .col(
                        ColumnDef::new(Lexemes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Claim scans page through (status, id)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_lexemes_status_id")
                    .table(Lexemes::Table)
                    .col(Lexemes::Status)
                    .col(Lexemes::Id)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProcessRuns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProcessRuns::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProcessRuns::Processor).string_len(100).not_null())
                    .col(
                        ColumnDef::new(ProcessRuns::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(ProcessRuns::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(ProcessRuns::StartedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(ProcessRuns::FinishedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(ProcessRuns::FinalProgress).json().null())
                    .col(ColumnDef::new(ProcessRuns::Error).text().null())
                    .col(ColumnDef::new(ProcessRuns::DeletedAt).timestamp_with_time_zone().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProcessResults::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProcessResults::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProcessResults::RunId).integer().not_null())
                    .col(ColumnDef::new(ProcessResults::LexemeId).integer().not_null())
                    .col(ColumnDef::new(ProcessResults::Output).json().not_null())
                    .col(ColumnDef::new(ProcessResults::Metadata).json().not_null())
                    .col(
                        ColumnDef::new(ProcessResults::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_process_results_run_id")
                            .from(ProcessResults::Table, ProcessResults::RunId)
                            .to(ProcessRuns::Table, ProcessRuns::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_process_results_lexeme_id")
                            .from(ProcessResults::Table, ProcessResults::LexemeId)
                            .to(Lexemes::Table, Lexemes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Upsert target
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_process_results_run_lexeme")
                    .table(ProcessResults::Table)
                    .col(ProcessResults::RunId)
                    .col(ProcessResults::LexemeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProcessResults::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProcessRuns::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Lexemes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Lexemes {
    Table,
    Id,
    Fingerprint,
    SourceText,
    NormalizedText,
    Status,
    ProcessedAt,
    Metadata,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ProcessRuns {
    Table,
    Id,
    Processor,
    Status,
    CreatedAt,
    StartedAt,
    FinishedAt,
    FinalProgress,
    Error,
    DeletedAt,
}

#[derive(DeriveIden)]
enum ProcessResults {
    Table,
    Id,
    RunId,
    LexemeId,
    Output,
    Metadata,
    UpdatedAt,
}
