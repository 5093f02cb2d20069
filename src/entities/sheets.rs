use crate::models::{Section, SheetType};
use sea_orm::entity::prelude::*;

/// Global registry of known sheets. `(section, remote_id)` is unique at
/// the store level; `id` is the local surrogate key, assigned once.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "sheets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub section: Section,
    pub sheet_type: SheetType,
    /// Numeric identifier extracted from the canonical URL.
    pub remote_id: i32,
    #[sea_orm(unique)]
    pub url: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::seasonal_schedule::Entity")]
    SeasonalSchedule,
    #[sea_orm(has_many = "super::daily_schedule::Entity")]
    DailySchedule,
}

impl Related<super::seasonal_schedule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SeasonalSchedule.def()
    }
}

impl Related<super::daily_schedule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DailySchedule.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
