use crate::models::{CategoryKind, Section};
use sea_orm::entity::prelude::*;

/// Category taxonomy row, unique on `(section, name)`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub section: Section,
    pub name: String,
    pub kind: CategoryKind,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
