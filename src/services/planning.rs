//! Planning aggregation facade: validates filter combinations, then
//! delegates to the joined planning queries.
//!
//! Visibility filters arrive as explicit tri-state parameters. This layer
//! never reads the process-wide visibility flags; the caller resolves
//! those into arguments first, which keeps aggregation pure and testable.

use crate::db::repositories::{DailyRow, PlanningRepository, SeasonalRow, VisibilityFilter};
use crate::db::Store;
use crate::error::CoreError;
use crate::models::{GroupCount, PageResult, PlanningSortBy, SeasonKey, SeasonKind, SortOrder};
use chrono::NaiveDate;

pub struct PlanningService {
    repo: PlanningRepository,
}

impl PlanningService {
    #[must_use]
    pub fn new(store: &Store) -> Self {
        Self {
            repo: store.planning(),
        }
    }

    /// Seasonal view. `year`/`kind` must be given together or not at all;
    /// a partial season key is rejected, never silently widened.
    pub async fn select_seasonal(
        &self,
        year: Option<i32>,
        kind: Option<SeasonKind>,
        visibility: VisibilityFilter,
        sort_by: PlanningSortBy,
        order: SortOrder,
        limit: u64,
        skip: u64,
    ) -> Result<PageResult<SeasonalRow>, CoreError> {
        let season = SeasonKey::from_parts(year, kind)?;
        self.repo
            .select_seasonal(season, visibility, sort_by, order, limit, skip)
            .await
    }

    /// Daily view over a single date or an inclusive range. An inverted
    /// range is a validation failure, not an empty result.
    pub async fn select_daily(
        &self,
        min_date: NaiveDate,
        max_date: Option<NaiveDate>,
        visibility: VisibilityFilter,
        sort_by: PlanningSortBy,
        order: SortOrder,
        limit: u64,
        skip: u64,
    ) -> Result<PageResult<DailyRow>, CoreError> {
        let max_date = Self::check_range(min_date, max_date)?;
        self.repo
            .select_daily(min_date, max_date, visibility, sort_by, order, limit, skip)
            .await
    }

    pub async fn season_counts(
        &self,
        visibility: VisibilityFilter,
    ) -> Result<Vec<GroupCount>, CoreError> {
        self.repo.seasonal_season_counts(visibility).await
    }

    pub async fn letter_counts(
        &self,
        year: Option<i32>,
        kind: Option<SeasonKind>,
        visibility: VisibilityFilter,
    ) -> Result<Vec<GroupCount>, CoreError> {
        let season = SeasonKey::from_parts(year, kind)?;
        self.repo.seasonal_letter_counts(season, visibility).await
    }

    pub async fn month_counts(
        &self,
        min_date: NaiveDate,
        max_date: Option<NaiveDate>,
        visibility: VisibilityFilter,
    ) -> Result<Vec<GroupCount>, CoreError> {
        let max_date = Self::check_range(min_date, max_date)?;
        self.repo
            .daily_month_counts(min_date, max_date, visibility)
            .await
    }

    fn check_range(
        min_date: NaiveDate,
        max_date: Option<NaiveDate>,
    ) -> Result<NaiveDate, CoreError> {
        let max_date = max_date.unwrap_or(min_date);
        if min_date > max_date {
            return Err(CoreError::validation(format!(
                "inverted date range: {min_date} > {max_date}"
            )));
        }
        Ok(max_date)
    }
}
