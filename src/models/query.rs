//! Sort keys and group-count summaries for list queries.

use crate::models::season::SeasonKey;
use serde::Serialize;

/// Sort key for catalog list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SheetSortBy {
    #[default]
    Id,
    Section,
    SheetType,
    RemoteId,
    Url,
}

/// Sort key for planning views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PlanningSortBy {
    #[default]
    Title,
    RemoteId,
    ScheduleKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl From<SortOrder> for sea_orm::Order {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Asc => Self::Asc,
            SortOrder::Desc => Self::Desc,
        }
    }
}

/// Typed key of a group-count bucket. Each kind carries its own key type,
/// so consumers never inspect an untyped payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum GroupKey {
    /// Uppercased first letter of a title; '#' for non-alphabetic.
    Letter(char),
    Season(SeasonKey),
    ReleaseMonth { year: i32, month: u32 },
}

/// One bucket of a group-count summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub key: GroupKey,
    pub count: u64,
}

impl GroupKey {
    /// Letter bucket for a title, folding everything non-alphabetic into '#'.
    #[must_use]
    pub fn letter_of(title: &str) -> Self {
        let letter = title
            .chars()
            .next()
            .filter(char::is_ascii_alphabetic)
            .map_or('#', |c| c.to_ascii_uppercase());
        Self::Letter(letter)
    }
}
