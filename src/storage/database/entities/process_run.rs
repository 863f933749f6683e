use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Process run database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "process_runs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Configured processor name
    pub processor: String,

    /// pending, running, done or failed
    pub status: String,

    pub created_at: DateTimeWithTimeZone,

    pub started_at: Option<DateTimeWithTimeZone>,

    pub finished_at: Option<DateTimeWithTimeZone>,

    /// Aggregate progress persisted when the run closes
    pub final_progress: Option<Json>,

    #[sea_orm(column_type = "Text", nullable)]
    pub error: Option<String>,

    /// Soft-delete marker
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::process_result::Entity")]
    ProcessResult,
}

impl Related<super::process_result::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProcessResult.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
