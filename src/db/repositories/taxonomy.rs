//! Idempotent synchronization of the reference taxonomies (categories,
//! formats, seasons) referenced by scraped items.
//!
//! Every ensure-exists call reads by natural key first and only inserts
//! when the key is absent. A unique-constraint violation on that insert
//! means another caller won the race; the row is re-read and returned as
//! if it had been found, so duplicates can never be created.

use crate::entities::{categories, formats, prelude::*, seasons};
use crate::error::{CoreError, is_unique_violation};
use crate::models::{CategoryKind, Report, SeasonKey, Section};
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, warn};

pub struct TaxonomyRepository {
    conn: DatabaseConnection,
}

/// Aggregate outcome of a batch [`TaxonomyRepository::create_index`] call.
#[derive(Debug, Clone, Serialize)]
pub struct IndexSummary {
    pub sections: usize,
    pub formats_ensured: usize,
}

impl TaxonomyRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn ensure_category(
        &self,
        section: Section,
        name: &str,
        kind: CategoryKind,
    ) -> Result<categories::Model, CoreError> {
        Self::ensure_category_in(&self.conn, section, name, kind).await
    }

    /// Same as [`Self::ensure_category`] but composable on a caller-supplied
    /// connection or transaction.
    pub async fn ensure_category_in<C: ConnectionTrait>(
        conn: &C,
        section: Section,
        name: &str,
        kind: CategoryKind,
    ) -> Result<categories::Model, CoreError> {
        let find = || {
            Categories::find()
                .filter(categories::Column::Section.eq(section))
                .filter(categories::Column::Name.eq(name))
        };

        if let Some(existing) = find().one(conn).await? {
            return Ok(existing);
        }

        let row = categories::ActiveModel {
            section: Set(section),
            name: Set(name.to_string()),
            kind: Set(kind),
            ..Default::default()
        };

        match Categories::insert(row).exec(conn).await {
            Ok(inserted) => {
                debug!("created category '{name}' ({kind}) in {section}");
                Categories::find_by_id(inserted.last_insert_id)
                    .one(conn)
                    .await?
                    .ok_or_else(|| CoreError::NotFound(format!("category '{name}'")))
            }
            Err(err) if is_unique_violation(&err) => {
                // Lost the insert race; the winner's row is authoritative.
                find()
                    .one(conn)
                    .await?
                    .ok_or(CoreError::Store(err))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn ensure_format(
        &self,
        section: Section,
        name: &str,
    ) -> Result<formats::Model, CoreError> {
        Self::ensure_format_in(&self.conn, section, name).await
    }

    pub async fn ensure_format_in<C: ConnectionTrait>(
        conn: &C,
        section: Section,
        name: &str,
    ) -> Result<formats::Model, CoreError> {
        let find = || {
            Formats::find()
                .filter(formats::Column::Section.eq(section))
                .filter(formats::Column::Name.eq(name))
        };

        if let Some(existing) = find().one(conn).await? {
            return Ok(existing);
        }

        let row = formats::ActiveModel {
            section: Set(section),
            name: Set(name.to_string()),
            ..Default::default()
        };

        match Formats::insert(row).exec(conn).await {
            Ok(inserted) => {
                debug!("created format '{name}' in {section}");
                Formats::find_by_id(inserted.last_insert_id)
                    .one(conn)
                    .await?
                    .ok_or_else(|| CoreError::NotFound(format!("format '{name}'")))
            }
            Err(err) if is_unique_violation(&err) => find()
                .one(conn)
                .await?
                .ok_or(CoreError::Store(err)),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn ensure_season(&self, key: SeasonKey) -> Result<seasons::Model, CoreError> {
        Self::ensure_season_in(&self.conn, key).await
    }

    pub async fn ensure_season_in<C: ConnectionTrait>(
        conn: &C,
        key: SeasonKey,
    ) -> Result<seasons::Model, CoreError> {
        let find = || {
            Seasons::find()
                .filter(seasons::Column::Year.eq(key.year))
                .filter(seasons::Column::Kind.eq(key.kind))
        };

        if let Some(existing) = find().one(conn).await? {
            return Ok(existing);
        }

        let row = seasons::ActiveModel {
            year: Set(key.year),
            kind: Set(key.kind),
            number: Set(key.number()),
            display_name: Set(key.display_name()),
            ..Default::default()
        };

        match Seasons::insert(row).exec(conn).await {
            Ok(inserted) => {
                debug!("created season {key}");
                Seasons::find_by_id(inserted.last_insert_id)
                    .one(conn)
                    .await?
                    .ok_or_else(|| CoreError::NotFound(format!("season {key}")))
            }
            Err(err) if is_unique_violation(&err) => find()
                .one(conn)
                .await?
                .ok_or(CoreError::Store(err)),
            Err(err) => Err(err.into()),
        }
    }

    /// Seeds the baseline format taxonomy for a set of sections.
    ///
    /// The section set is de-duplicated first; each section is an
    /// independent unit, so one failing section does not abort its
    /// siblings. Returns a single aggregate report.
    pub async fn create_index(&self, sections: &[Section]) -> Report<IndexSummary> {
        let unique: BTreeSet<Section> = sections.iter().copied().collect();

        let mut ensured = 0usize;
        let mut failures = Vec::new();

        for section in &unique {
            match self.seed_section_formats(*section).await {
                Ok(count) => ensured += count,
                Err(err) => {
                    warn!("taxonomy index for {section} failed: {err}");
                    failures.push(format!("{section}: {err}"));
                }
            }
        }

        let summary = IndexSummary {
            sections: unique.len(),
            formats_ensured: ensured,
        };

        if failures.is_empty() {
            let message = format!(
                "indexed {} section(s), {} format(s)",
                summary.sections, summary.formats_ensured
            );
            Report::ok(summary).with_message(message)
        } else {
            Report::failure("store error", failures.join("; "))
        }
    }

    async fn seed_section_formats(&self, section: Section) -> Result<usize, CoreError> {
        let names = baseline_formats(section);
        for name in names {
            Self::ensure_format_in(&self.conn, section, name).await?;
        }
        Ok(names.len())
    }
}

/// Formats the source site uses for each section's sheets.
const fn baseline_formats(section: Section) -> &'static [&'static str] {
    match section {
        Section::Anime => &["Série TV", "OAV", "Film", "ONA", "Spécial"],
        Section::Drama => &["Série TV", "Film", "Web drama"],
        Section::Manga => &["Manga", "One shot", "Webtoon"],
        Section::LightNovel => &["Light novel", "Web novel"],
        Section::Community => &[],
    }
}
