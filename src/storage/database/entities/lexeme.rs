use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lexeme database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lexemes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Hex SHA-256 of the normalized text
    #[sea_orm(unique)]
    pub fingerprint: String,

    #[sea_orm(column_type = "Text")]
    pub source_text: String,

    #[sea_orm(column_type = "Text")]
    pub normalized_text: String,

    /// pending, processing, succeeded or failed
    pub status: String,

    pub processed_at: Option<DateTimeWithTimeZone>,

    pub metadata: Json,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::process_result::Entity")]
    ProcessResult,
    #[sea_orm(has_many = "super::occurrence::Entity")]
    Occurrence,
}

impl Related<super::process_result::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProcessResult.def()
    }
}

impl Related<super::occurrence::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Occurrence.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
