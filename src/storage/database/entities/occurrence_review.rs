use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Review and apply state of one occurrence
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "occurrence_reviews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub occurrence_id: i32,

    /// pending, reviewed, approved or rejected
    pub status: String,

    /// not_applied, applied, failed or conflict
    pub apply_status: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub replacement: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub apply_error: Option<String>,

    pub applied_at: Option<DateTimeWithTimeZone>,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::occurrence::Entity",
        from = "Column::OccurrenceId",
        to = "super::occurrence::Column::Id",
        on_delete = "Cascade"
    )]
    Occurrence,
}

impl Related<super::occurrence::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Occurrence.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
