use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Where a lexeme was found
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "occurrences")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub lexeme_id: i32,

    pub file_id: i32,

    /// 1-based line number
    pub line_at: i32,

    /// Char offset into the line
    pub start_offset: i32,

    /// Exclusive char offset into the line
    pub end_offset: i32,

    #[sea_orm(column_type = "Text")]
    pub matched_text: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::lexeme::Entity",
        from = "Column::LexemeId",
        to = "super::lexeme::Column::Id"
    )]
    Lexeme,
    #[sea_orm(
        belongs_to = "super::source_file::Entity",
        from = "Column::FileId",
        to = "super::source_file::Column::Id"
    )]
    SourceFile,
    #[sea_orm(has_many = "super::occurrence_review::Entity")]
    OccurrenceReview,
}

impl Related<super::lexeme::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lexeme.def()
    }
}

impl Related<super::source_file::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SourceFile.def()
    }
}

impl Related<super::occurrence_review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OccurrenceReview.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
