//! Repositories, source files, occurrences and occurrence reviews

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Repositories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Repositories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Repositories::Name)
                            .string_len(200)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Repositories::LocalPath).text().not_null())
                    .col(
                        ColumnDef::new(Repositories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SourceFiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SourceFiles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SourceFiles::RepositoryId).integer().not_null())
                    .col(ColumnDef::new(SourceFiles::Path).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_source_files_repository_id")
                            .from(SourceFiles::Table, SourceFiles::RepositoryId)
                            .to(Repositories::Table, Repositories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Occurrences::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Occurrences::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Occurrences::LexemeId).integer().not_null())
                    .col(ColumnDef::new(Occurrences::FileId).integer().not_null())
                    .col(ColumnDef::new(Occurrences::LineAt).integer().not_null())
                    .col(ColumnDef::new(Occurrences::StartOffset).integer().not_null())
                    .col(ColumnDef::new(Occurrences::EndOffset).integer().not_null())
                    .col(ColumnDef::new(Occurrences::MatchedText).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_occurrences_lexeme_id")
                            .from(Occurrences::Table, Occurrences::LexemeId)
                            .to(Lexemes::Table, Lexemes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_occurrences_file_id")
                            .from(Occurrences::Table, Occurrences::FileId)
                            .to(SourceFiles::Table, SourceFiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_occurrences_file_id")
                    .table(Occurrences::Table)
                    .col(Occurrences::FileId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OccurrenceReviews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OccurrenceReviews::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OccurrenceReviews::OccurrenceId).integer().not_null())
                    .col(
                        ColumnDef::new(OccurrenceReviews::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(OccurrenceReviews::ApplyStatus)
                            .string_len(20)
                            .not_null()
                            .default("not_applied"),
                    )
                    .col(ColumnDef::new(OccurrenceReviews::Replacement).text().null())
                    .col(ColumnDef::new(OccurrenceReviews::ApplyError).text().null())
                    .col(
                        ColumnDef::new(OccurrenceReviews::AppliedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(OccurrenceReviews::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_occurrence_reviews_occurrence_id")
                            .from(OccurrenceReviews::Table, OccurrenceReviews::OccurrenceId)
                            .to(Occurrences::Table, Occurrences::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_occurrence_reviews_occurrence_id")
                    .table(OccurrenceReviews::Table)
                    .col(OccurrenceReviews::OccurrenceId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OccurrenceReviews::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Occurrences::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SourceFiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Repositories::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Repositories {
    Table,
    Id,
    Name,
    LocalPath,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SourceFiles {
    Table,
    Id,
    RepositoryId,
    Path,
}

#[derive(DeriveIden)]
enum Occurrences {
    Table,
    Id,
    LexemeId,
    FileId,
    LineAt,
    StartOffset,
    EndOffset,
    MatchedText,
}

#[derive(DeriveIden)]
enum OccurrenceReviews {
    Table,
    Id,
    OccurrenceId,
    Status,
    ApplyStatus,
    Replacement,
    ApplyError,
    AppliedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Lexemes {
    Table,
    Id,
}
