//! Closed section/type vocabulary of the source site.
//!
//! Every dispatch over these enums is an exhaustive match, so adding a
//! section is a single compile-checked change here.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level catalog section of the site. Immutable once assigned to a sheet.
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
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum Section {
    #[sea_orm(string_value = "anime")]
    Anime,
    #[sea_orm(string_value = "manga")]
    Manga,
    #[sea_orm(string_value = "light_novel")]
    LightNovel,
    #[sea_orm(string_value = "drama")]
    Drama,
    #[sea_orm(string_value = "community")]
    Community,
}

impl Section {
    /// Host serving this section's pages.
    #[must_use]
    pub const fn host(self) -> &'static str {
        match self {
            Self::Anime => "anime.icotaku.com",
            Self::Manga => "manga.icotaku.com",
            Self::LightNovel => "novel.icotaku.com",
            Self::Drama => "drama.icotaku.com",
            Self::Community => "communaute.icotaku.com",
        }
    }

    /// Base URL for the section, always with a trailing slash.
    #[must_use]
    pub fn base_url(self) -> String {
        format!("https://{}/", self.host())
    }

    /// Inverse of [`Section::host`]; `None` for an unrecognized host.
    #[must_use]
    pub fn from_host(host: &str) -> Option<Self> {
        match host {
            "anime.icotaku.com" => Some(Self::Anime),
            "manga.icotaku.com" => Some(Self::Manga),
            "novel.icotaku.com" => Some(Self::LightNovel),
            "drama.icotaku.com" => Some(Self::Drama),
            "communaute.icotaku.com" => Some(Self::Community),
            _ => None,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Anime => "anime",
            Self::Manga => "manga",
            Self::LightNovel => "light novel",
            Self::Drama => "drama",
            Self::Community => "community",
        };
        write!(f, "{name}")
    }
}

/// Kind of sheet a catalog entry points at.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum SheetType {
    #[sea_orm(string_value = "fiche")]
    Fiche,
    #[sea_orm(string_value = "episode")]
    Episode,
    #[sea_orm(string_value = "person")]
    Person,
    #[sea_orm(string_value = "character")]
    Character,
}

impl fmt::Display for SheetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fiche => "fiche",
            Self::Episode => "episode",
            Self::Person => "person",
            Self::Character => "character",
        };
        write!(f, "{name}")
    }
}

/// Taxonomy flavor for category rows.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    #[sea_orm(string_value = "genre")]
    Genre,
    #[sea_orm(string_value = "theme")]
    Theme,
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Genre => write!(f, "genre"),
            Self::Theme => write!(f, "theme"),
        }
    }
}

/// Stable identity of a sheet on the source site.
///
/// `id` is the first purely numeric path segment of the canonical URL.
/// Both halves are required; the resolver never produces a partial one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SheetIdentity {
    pub section: Section,
    pub id: u32,
}

impl fmt::Display for SheetIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.section, self.id)
    }
}
