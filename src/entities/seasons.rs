use crate::models::SeasonKind;
use sea_orm::entity::prelude::*;

/// Season taxonomy row, unique on `(year, kind)`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "seasons")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub year: i32,
    pub kind: SeasonKind,
    /// Chronological sort key: `year * 10 + season ordinal`.
    pub number: i32,
    pub display_name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::seasonal_schedule::Entity")]
    SeasonalSchedule,
}

impl Related<super::seasonal_schedule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SeasonalSchedule.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
