use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Output of one (run, lexeme) pair
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "process_results")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub run_id: i32,

    pub lexeme_id: i32,

    pub output: Json,

    pub metadata: Json,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::process_run::Entity",
        from = "Column::RunId",
        to = "super::process_run::Column::Id"
    )]
    ProcessRun,
    #[sea_orm(
        belongs_to = "super::lexeme::Entity",
        from = "Column::LexemeId",
        to = "super::lexeme::Column::Id"
    )]
    Lexeme,
}

impl Related<super::process_run::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProcessRun.def()
    }
}

impl Related<super::lexeme::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lexeme.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
