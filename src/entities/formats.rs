use crate::models::Section;
use sea_orm::entity::prelude::*;

/// Distribution format taxonomy row, unique on `(section, name)`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "formats")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub section: Section,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
