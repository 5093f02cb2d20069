//! Joined planning views: seasonal and daily schedule rows with their
//! catalog entries, tri-state visibility filters, pagination, and
//! group-count summaries.

use crate::entities::{daily_schedule, prelude::*, seasonal_schedule, seasons, sheets};
use crate::error::CoreError;
use crate::models::{
    GroupCount, GroupKey, PageResult, PlanningSortBy, SeasonKey, SeasonKind, Section, SortOrder,
};
use chrono::{Datelike, NaiveDate};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set,
};
use serde::Serialize;
use std::collections::BTreeMap;

pub struct PlanningRepository {
    conn: DatabaseConnection,
}

/// One seasonal planning row joined with its catalog entry and season.
#[derive(Debug, Clone, FromQueryResult, Serialize)]
pub struct SeasonalRow {
    pub sheet_id: i32,
    pub section: Section,
    pub remote_id: i32,
    pub url: String,
    pub year: i32,
    pub kind: SeasonKind,
    pub title: String,
    pub is_adult: bool,
    pub is_explicit: bool,
}

/// One daily planning row joined with its catalog entry.
#[derive(Debug, Clone, FromQueryResult, Serialize)]
pub struct DailyRow {
    pub sheet_id: i32,
    pub section: Section,
    pub remote_id: i32,
    pub url: String,
    pub release_date: NaiveDate,
    pub title: String,
    pub episode_number: Option<i32>,
    pub is_adult: bool,
    pub is_explicit: bool,
}

/// Tri-state visibility filters: `None` leaves the axis unrestricted,
/// `Some(v)` requires an exact match. The repository never consults
/// process-wide visibility flags; callers resolve those upstream.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisibilityFilter {
    pub is_adult: Option<bool>,
    pub is_explicit: Option<bool>,
}

impl PlanningRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    // ------------------------------------------------------------------
    // Fact writes (composable on a caller-supplied transaction)
    // ------------------------------------------------------------------

    /// Writes or overwrites the seasonal fact for `(sheet, season)`.
    pub async fn put_seasonal_fact_in<C: ConnectionTrait>(
        conn: &C,
        sheet_id: i32,
        season_id: i32,
        title: &str,
        is_adult: bool,
        is_explicit: bool,
    ) -> Result<(), CoreError> {
        let row = seasonal_schedule::ActiveModel {
            sheet_id: Set(sheet_id),
            season_id: Set(season_id),
            title: Set(title.to_string()),
            is_adult: Set(is_adult),
            is_explicit: Set(is_explicit),
            ..Default::default()
        };

        SeasonalSchedule::insert(row)
            .on_conflict(
                OnConflict::columns([
                    seasonal_schedule::Column::SheetId,
                    seasonal_schedule::Column::SeasonId,
                ])
                .update_columns([
                    seasonal_schedule::Column::Title,
                    seasonal_schedule::Column::IsAdult,
                    seasonal_schedule::Column::IsExplicit,
                ])
                .to_owned(),
            )
            .exec(conn)
            .await?;
        Ok(())
    }

    /// Writes or overwrites the daily fact for `(sheet, date)`.
    pub async fn put_daily_fact_in<C: ConnectionTrait>(
        conn: &C,
        sheet_id: i32,
        release_date: NaiveDate,
        title: &str,
        episode_number: Option<i32>,
        is_adult: bool,
        is_explicit: bool,
    ) -> Result<(), CoreError> {
        let row = daily_schedule::ActiveModel {
            sheet_id: Set(sheet_id),
            release_date: Set(release_date),
            title: Set(title.to_string()),
            episode_number: Set(episode_number),
            is_adult: Set(is_adult),
            is_explicit: Set(is_explicit),
            ..Default::default()
        };

        DailySchedule::insert(row)
            .on_conflict(
                OnConflict::columns([
                    daily_schedule::Column::SheetId,
                    daily_schedule::Column::ReleaseDate,
                ])
                .update_columns([
                    daily_schedule::Column::Title,
                    daily_schedule::Column::EpisodeNumber,
                    daily_schedule::Column::IsAdult,
                    daily_schedule::Column::IsExplicit,
                ])
                .to_owned(),
            )
            .exec(conn)
            .await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Seasonal view
    // ------------------------------------------------------------------

    /// Seasonal rows, ordered and windowed. `limit == 0` returns the
    /// whole set as a single page and ignores `skip`.
    pub async fn select_seasonal(
        &self,
        season: Option<SeasonKey>,
        visibility: VisibilityFilter,
        sort_by: PlanningSortBy,
        order: SortOrder,
        limit: u64,
        skip: u64,
    ) -> Result<PageResult<SeasonalRow>, CoreError> {
        let total = Self::seasonal_query(season, visibility)
            .count(&self.conn)
            .await?;

        let mut query = Self::seasonal_query(season, visibility);
        let sort_order: Order = order.into();
        query = match sort_by {
            PlanningSortBy::Title => query.order_by(seasonal_schedule::Column::Title, sort_order),
            PlanningSortBy::RemoteId => query.order_by(sheets::Column::RemoteId, sort_order),
            PlanningSortBy::ScheduleKey => query.order_by(seasons::Column::Number, sort_order),
        };
        query = query.order_by(seasonal_schedule::Column::Id, Order::Asc);

        if limit > 0 {
            query = query.limit(limit).offset(skip);
        }

        let items = query.into_model::<SeasonalRow>().all(&self.conn).await?;
        Ok(PageResult::from_window(limit, skip, total, items))
    }

    /// Per-season sheet counts for the seasonal view, under the same
    /// visibility filters as the row query.
    pub async fn seasonal_season_counts(
        &self,
        visibility: VisibilityFilter,
    ) -> Result<Vec<GroupCount>, CoreError> {
        let rows = Self::seasonal_query(None, visibility)
            .into_model::<SeasonalRow>()
            .all(&self.conn)
            .await?;

        Ok(fold_counts(rows.iter().map(|row| {
            GroupKey::Season(SeasonKey::new(row.year, row.kind))
        })))
    }

    /// Title-initial counts for one season (or all of them).
    pub async fn seasonal_letter_counts(
        &self,
        season: Option<SeasonKey>,
        visibility: VisibilityFilter,
    ) -> Result<Vec<GroupCount>, CoreError> {
        let rows = Self::seasonal_query(season, visibility)
            .into_model::<SeasonalRow>()
            .all(&self.conn)
            .await?;

        Ok(fold_counts(
            rows.iter().map(|row| GroupKey::letter_of(&row.title)),
        ))
    }

    fn seasonal_query(
        season: Option<SeasonKey>,
        visibility: VisibilityFilter,
    ) -> Select<SeasonalSchedule> {
        let mut query = SeasonalSchedule::find()
            .select_only()
            .column_as(seasonal_schedule::Column::SheetId, "sheet_id")
            .column_as(sheets::Column::Section, "section")
            .column_as(sheets::Column::RemoteId, "remote_id")
            .column_as(sheets::Column::Url, "url")
            .column_as(seasons::Column::Year, "year")
            .column_as(seasons::Column::Kind, "kind")
            .column(seasonal_schedule::Column::Title)
            .column(seasonal_schedule::Column::IsAdult)
            .column(seasonal_schedule::Column::IsExplicit)
            .join(JoinType::InnerJoin, seasonal_schedule::Relation::Sheets.def())
            .join(
                JoinType::InnerJoin,
                seasonal_schedule::Relation::Seasons.def(),
            );

        if let Some(key) = season {
            query = query
                .filter(seasons::Column::Year.eq(key.year))
                .filter(seasons::Column::Kind.eq(key.kind));
        }
        if let Some(adult) = visibility.is_adult {
            query = query.filter(seasonal_schedule::Column::IsAdult.eq(adult));
        }
        if let Some(explicit) = visibility.is_explicit {
            query = query.filter(seasonal_schedule::Column::IsExplicit.eq(explicit));
        }
        query
    }

    // ------------------------------------------------------------------
    // Daily view
    // ------------------------------------------------------------------

    /// Daily rows within the inclusive date range. `limit == 0` returns
    /// the whole set as a single page and ignores `skip`.
    pub async fn select_daily(
        &self,
        min_date: NaiveDate,
        max_date: NaiveDate,
        visibility: VisibilityFilter,
        sort_by: PlanningSortBy,
        order: SortOrder,
        limit: u64,
        skip: u64,
    ) -> Result<PageResult<DailyRow>, CoreError> {
        let total = Self::daily_query(min_date, max_date, visibility)
            .count(&self.conn)
            .await?;

        let mut query = Self::daily_query(min_date, max_date, visibility);
        let sort_order: Order = order.into();
        query = match sort_by {
            PlanningSortBy::Title => query.order_by(daily_schedule::Column::Title, sort_order),
            PlanningSortBy::RemoteId => query.order_by(sheets::Column::RemoteId, sort_order),
            PlanningSortBy::ScheduleKey => {
                query.order_by(daily_schedule::Column::ReleaseDate, sort_order)
            }
        };
        query = query.order_by(daily_schedule::Column::Id, Order::Asc);

        if limit > 0 {
            query = query.limit(limit).offset(skip);
        }

        let items = query.into_model::<DailyRow>().all(&self.conn).await?;
        Ok(PageResult::from_window(limit, skip, total, items))
    }

    /// Release-month counts over a date range, under the same filters as
    /// the row query.
    pub async fn daily_month_counts(
        &self,
        min_date: NaiveDate,
        max_date: NaiveDate,
        visibility: VisibilityFilter,
    ) -> Result<Vec<GroupCount>, CoreError> {
        let rows = Self::daily_query(min_date, max_date, visibility)
            .into_model::<DailyRow>()
            .all(&self.conn)
            .await?;

        Ok(fold_counts(rows.iter().map(|row| GroupKey::ReleaseMonth {
            year: row.release_date.year(),
            month: row.release_date.month(),
        })))
    }

    fn daily_query(
        min_date: NaiveDate,
        max_date: NaiveDate,
        visibility: VisibilityFilter,
    ) -> Select<DailySchedule> {
        let mut query = DailySchedule::find()
            .select_only()
            .column_as(daily_schedule::Column::SheetId, "sheet_id")
            .column_as(sheets::Column::Section, "section")
            .column_as(sheets::Column::RemoteId, "remote_id")
            .column_as(sheets::Column::Url, "url")
            .column(daily_schedule::Column::ReleaseDate)
            .column(daily_schedule::Column::Title)
            .column(daily_schedule::Column::EpisodeNumber)
            .column(daily_schedule::Column::IsAdult)
            .column(daily_schedule::Column::IsExplicit)
            .join(JoinType::InnerJoin, daily_schedule::Relation::Sheets.def())
            .filter(daily_schedule::Column::ReleaseDate.gte(min_date))
            .filter(daily_schedule::Column::ReleaseDate.lte(max_date));

        if let Some(adult) = visibility.is_adult {
            query = query.filter(daily_schedule::Column::IsAdult.eq(adult));
        }
        if let Some(explicit) = visibility.is_explicit {
            query = query.filter(daily_schedule::Column::IsExplicit.eq(explicit));
        }
        query
    }
}

fn fold_counts(keys: impl Iterator<Item = GroupKey>) -> Vec<GroupCount> {
    let mut buckets: BTreeMap<GroupKey, u64> = BTreeMap::new();
    for key in keys {
        *buckets.entry(key).or_insert(0) += 1;
    }
    buckets
        .into_iter()
        .map(|(key, count)| GroupCount { key, count })
        .collect()
}
