//! Season vocabulary and the partial-key validation used by planning queries.

use crate::error::CoreError;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four broadcast seasons.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "snake_case")]
pub enum SeasonKind {
    #[sea_orm(string_value = "winter")]
    Winter,
    #[sea_orm(string_value = "spring")]
    Spring,
    #[sea_orm(string_value = "summer")]
    Summer,
    #[sea_orm(string_value = "fall")]
    Fall,
}

impl SeasonKind {
    /// French label used by the source site.
    #[must_use]
    pub const fn site_label(self) -> &'static str {
        match self {
            Self::Winter => "hiver",
            Self::Spring => "printemps",
            Self::Summer => "ete",
            Self::Fall => "automne",
        }
    }

    /// Ordinal within a year, winter first.
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::Winter => 1,
            Self::Spring => 2,
            Self::Summer => 3,
            Self::Fall => 4,
        }
    }
}

impl fmt::Display for SeasonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Winter => "winter",
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Fall => "fall",
        };
        write!(f, "{name}")
    }
}

/// Fully specified season. Planning queries never accept a half key:
/// [`SeasonKey::from_parts`] rejects a lone year or a lone kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeasonKey {
    pub year: i32,
    pub kind: SeasonKind,
}

impl SeasonKey {
    #[must_use]
    pub const fn new(year: i32, kind: SeasonKind) -> Self {
        Self { year, kind }
    }

    /// Combines optional year/kind parameters as they arrive from a caller.
    ///
    /// Both absent means "no season restriction"; both present selects one
    /// season; exactly one present is a validation error, never widened.
    pub fn from_parts(
        year: Option<i32>,
        kind: Option<SeasonKind>,
    ) -> Result<Option<Self>, CoreError> {
        match (year, kind) {
            (None, None) => Ok(None),
            (Some(year), Some(kind)) => Ok(Some(Self { year, kind })),
            (Some(_), None) => Err(CoreError::validation(
                "season year given without a season kind",
            )),
            (None, Some(_)) => Err(CoreError::validation(
                "season kind given without a season year",
            )),
        }
    }

    /// Chronological sort key stored on the season row.
    #[must_use]
    pub const fn number(&self) -> i32 {
        self.year * 10 + self.kind.ordinal() as i32
    }

    /// Display name stored on the season row, e.g. "Hiver 2024".
    #[must_use]
    pub fn display_name(&self) -> String {
        let label = match self.kind {
            SeasonKind::Winter => "Hiver",
            SeasonKind::Spring => "Printemps",
            SeasonKind::Summer => "Été",
            SeasonKind::Fall => "Automne",
        };
        format!("{label} {}", self.year)
    }
}

impl fmt::Display for SeasonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.year)
    }
}
