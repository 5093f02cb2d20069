//! Planning aggregation and scrape-unit behavior against an in-memory
//! store and a canned sheet source.

use chrono::NaiveDate;
use icosync::Store;
use icosync::clients::{ScrapedItem, SheetSource};
use icosync::db::VisibilityFilter;
use icosync::entities::prelude::*;
use icosync::error::CoreError;
use icosync::models::{
    CategoryKind, GroupKey, PlanningSortBy, SeasonKey, SeasonKind, Section, SheetType, SortOrder,
};
use icosync::services::{PlanningService, ScrapeService};
use sea_orm::{EntityTrait, PaginatorTrait};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

async fn test_store() -> Store {
    Store::new("sqlite::memory:")
        .await
        .expect("failed to open in-memory store")
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn item(remote_id: u32, title: &str, adult: bool, explicit: bool) -> ScrapedItem {
    ScrapedItem {
        url: format!("https://anime.icotaku.com/anime/{remote_id}/fiche.html"),
        title: title.to_string(),
        episode_number: None,
        is_adult: adult,
        is_explicit: explicit,
        categories: vec![("Action".to_string(), CategoryKind::Genre)],
        format: Some("Série TV".to_string()),
    }
}

fn daily_item(remote_id: u32, title: &str, episode: i32, adult: bool) -> ScrapedItem {
    let mut it = item(remote_id, title, adult, false);
    it.episode_number = Some(episode);
    it
}

/// Canned source returning fixed item sets.
struct FakeSource {
    seasonal: Vec<ScrapedItem>,
    daily: Vec<ScrapedItem>,
}

#[async_trait::async_trait]
impl SheetSource for FakeSource {
    async fn seasonal_items(&self, _year: i32, _kind: SeasonKind) -> anyhow::Result<Vec<ScrapedItem>> {
        Ok(self.seasonal.clone())
    }

    async fn daily_items(&self, _date: NaiveDate) -> anyhow::Result<Vec<ScrapedItem>> {
        Ok(self.daily.clone())
    }
}

/// Source that trips the shared token while its fetch is in flight.
struct CancellingSource {
    cancel: CancellationToken,
}

#[async_trait::async_trait]
impl SheetSource for CancellingSource {
    async fn seasonal_items(&self, _year: i32, _kind: SeasonKind) -> anyhow::Result<Vec<ScrapedItem>> {
        self.cancel.cancel();
        Ok(vec![item(1, "Azure Knights", false, false)])
    }

    async fn daily_items(&self, _date: NaiveDate) -> anyhow::Result<Vec<ScrapedItem>> {
        self.cancel.cancel();
        Ok(vec![daily_item(1, "Azure Knights - Episode 1", 1, false)])
    }
}

/// Source whose fetches always fail.
struct BrokenSource;

#[async_trait::async_trait]
impl SheetSource for BrokenSource {
    async fn seasonal_items(&self, _year: i32, _kind: SeasonKind) -> anyhow::Result<Vec<ScrapedItem>> {
        anyhow::bail!("connection reset")
    }

    async fn daily_items(&self, _date: NaiveDate) -> anyhow::Result<Vec<ScrapedItem>> {
        anyhow::bail!("connection reset")
    }
}

async fn seeded_store() -> Store {
    let store = test_store().await;
    let source = Arc::new(FakeSource {
        seasonal: vec![
            item(1, "Azure Knights", false, false),
            item(2, "Blade of Dawn", false, false),
            item(3, "Crimson Night", true, false),
            item(4, "Dark Desire", true, true),
        ],
        daily: vec![
            daily_item(1, "Azure Knights - Episode 5", 5, false),
            daily_item(3, "Crimson Night - Episode 2", 2, true),
        ],
    });
    let scrape = ScrapeService::new(store.clone(), source);

    let report = scrape.sync_season(2024, SeasonKind::Winter, None).await;
    assert!(report.success, "seed sync failed: {:?}", report.message);

    let report = scrape.sync_day(date(2024, 2, 10), None).await;
    assert!(report.success, "seed sync failed: {:?}", report.message);

    store
}

#[tokio::test]
async fn partial_season_key_is_rejected() {
    let store = test_store().await;
    let planning = PlanningService::new(&store);

    let err = planning
        .select_seasonal(
            Some(2024),
            None,
            VisibilityFilter::default(),
            PlanningSortBy::Title,
            SortOrder::Asc,
            0,
            0,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));

    let err = planning
        .select_seasonal(
            None,
            Some(SeasonKind::Fall),
            VisibilityFilter::default(),
            PlanningSortBy::Title,
            SortOrder::Asc,
            0,
            0,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
}

#[tokio::test]
async fn inverted_date_range_is_rejected() {
    let store = test_store().await;
    let planning = PlanningService::new(&store);

    let err = planning
        .select_daily(
            date(2024, 6, 10),
            Some(date(2024, 6, 1)),
            VisibilityFilter::default(),
            PlanningSortBy::ScheduleKey,
            SortOrder::Asc,
            0,
            0,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
}

#[tokio::test]
async fn tri_state_visibility_filters() {
    let store = seeded_store().await;
    let planning = PlanningService::new(&store);

    let unfiltered = planning
        .select_seasonal(
            None,
            None,
            VisibilityFilter::default(),
            PlanningSortBy::Title,
            SortOrder::Asc,
            0,
            0,
        )
        .await
        .unwrap();
    assert_eq!(unfiltered.total_items, 4);

    let family = planning
        .select_seasonal(
            None,
            None,
            VisibilityFilter {
                is_adult: Some(false),
                is_explicit: Some(false),
            },
            PlanningSortBy::Title,
            SortOrder::Asc,
            0,
            0,
        )
        .await
        .unwrap();
    assert_eq!(family.total_items, 2);

    let adult_only = planning
        .select_seasonal(
            None,
            None,
            VisibilityFilter {
                is_adult: Some(true),
                is_explicit: None,
            },
            PlanningSortBy::Title,
            SortOrder::Asc,
            0,
            0,
        )
        .await
        .unwrap();
    assert_eq!(adult_only.total_items, 2);
    assert!(adult_only.items.iter().all(|row| row.is_adult));
}

#[tokio::test]
async fn seasonal_rows_are_ordered_and_paged_consistently() {
    let store = seeded_store().await;
    let planning = PlanningService::new(&store);

    let page = planning
        .select_seasonal(
            Some(2024),
            Some(SeasonKind::Winter),
            VisibilityFilter::default(),
            PlanningSortBy::Title,
            SortOrder::Asc,
            2,
            0,
        )
        .await
        .unwrap();

    assert_eq!(page.total_items, 4);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].title, "Azure Knights");
    assert_eq!(page.items[1].title, "Blade of Dawn");

    let second = planning
        .select_seasonal(
            Some(2024),
            Some(SeasonKind::Winter),
            VisibilityFilter::default(),
            PlanningSortBy::Title,
            SortOrder::Asc,
            2,
            2,
        )
        .await
        .unwrap();
    assert_eq!(second.items[0].title, "Crimson Night");
    assert_eq!(second.items[1].title, "Dark Desire");

    // An unbounded window ignores skip: one page carrying everything.
    let unbounded = planning
        .select_seasonal(
            Some(2024),
            Some(SeasonKind::Winter),
            VisibilityFilter::default(),
            PlanningSortBy::Title,
            SortOrder::Asc,
            0,
            2,
        )
        .await
        .unwrap();
    assert_eq!(unbounded.items.len(), 4);
    assert_eq!(unbounded.total_pages, 1);
}

#[tokio::test]
async fn daily_view_honors_range_and_carries_episode_numbers() {
    let store = seeded_store().await;
    let planning = PlanningService::new(&store);

    let single_day = planning
        .select_daily(
            date(2024, 2, 10),
            None,
            VisibilityFilter::default(),
            PlanningSortBy::ScheduleKey,
            SortOrder::Asc,
            0,
            0,
        )
        .await
        .unwrap();
    assert_eq!(single_day.total_items, 2);
    assert_eq!(single_day.items[0].episode_number, Some(5));

    let elsewhere = planning
        .select_daily(
            date(2024, 3, 1),
            Some(date(2024, 3, 31)),
            VisibilityFilter::default(),
            PlanningSortBy::ScheduleKey,
            SortOrder::Asc,
            0,
            0,
        )
        .await
        .unwrap();
    assert_eq!(elsewhere.total_items, 0);
    assert_eq!(elsewhere.total_pages, 1);
}

#[tokio::test]
async fn group_counts_use_typed_keys() {
    let store = seeded_store().await;
    let planning = PlanningService::new(&store);

    let seasons = planning
        .season_counts(VisibilityFilter::default())
        .await
        .unwrap();
    assert_eq!(seasons.len(), 1);
    assert_eq!(
        seasons[0].key,
        GroupKey::Season(SeasonKey::new(2024, SeasonKind::Winter))
    );
    assert_eq!(seasons[0].count, 4);

    let letters = planning
        .letter_counts(None, None, VisibilityFilter::default())
        .await
        .unwrap();
    assert_eq!(letters.len(), 4);
    assert!(letters.contains(&icosync::models::GroupCount {
        key: GroupKey::Letter('A'),
        count: 1,
    }));

    let months = planning
        .month_counts(
            date(2024, 1, 1),
            Some(date(2024, 12, 31)),
            VisibilityFilter::default(),
        )
        .await
        .unwrap();
    assert_eq!(months.len(), 1);
    assert_eq!(
        months[0].key,
        GroupKey::ReleaseMonth {
            year: 2024,
            month: 2
        }
    );
    assert_eq!(months[0].count, 2);
}

#[tokio::test]
async fn resync_overwrites_facts_without_duplicating() {
    let store = test_store().await;

    let first = Arc::new(FakeSource {
        seasonal: vec![item(7, "Working Title", false, false)],
        daily: vec![],
    });
    let scrape = ScrapeService::new(store.clone(), first);
    assert!(scrape.sync_season(2025, SeasonKind::Spring, None).await.success);

    let second = Arc::new(FakeSource {
        seasonal: vec![item(7, "Final Title", false, false)],
        daily: vec![],
    });
    let scrape = ScrapeService::new(store.clone(), second);
    assert!(scrape.sync_season(2025, SeasonKind::Spring, None).await.success);

    assert_eq!(Sheets::find().count(&store.conn).await.unwrap(), 1);
    assert_eq!(SeasonalSchedule::find().count(&store.conn).await.unwrap(), 1);

    let planning = PlanningService::new(&store);
    let page = planning
        .select_seasonal(
            Some(2025),
            Some(SeasonKind::Spring),
            VisibilityFilter::default(),
            PlanningSortBy::Title,
            SortOrder::Asc,
            0,
            0,
        )
        .await
        .unwrap();
    assert_eq!(page.items[0].title, "Final Title");
}

#[tokio::test]
async fn scrape_registers_taxonomy_and_catalog() {
    let store = seeded_store().await;

    assert_eq!(Sheets::find().count(&store.conn).await.unwrap(), 4);
    assert_eq!(Seasons::find().count(&store.conn).await.unwrap(), 1);
    // Category "Action" referenced by every item exists exactly once.
    assert_eq!(Categories::find().count(&store.conn).await.unwrap(), 1);
    assert_eq!(Formats::find().count(&store.conn).await.unwrap(), 1);

    let sheet = store
        .sheets()
        .find_by_identity(icosync::models::SheetIdentity {
            section: Section::Anime,
            id: 1,
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(sheet.sheet_type, SheetType::Fiche);
}

#[tokio::test]
async fn failed_fetch_reports_per_unit_without_aborting_siblings() {
    let store = test_store().await;
    let scrape = ScrapeService::new(store.clone(), Arc::new(BrokenSource));

    let report = scrape.sync_season(2024, SeasonKind::Fall, None).await;
    assert!(!report.success);
    assert_eq!(report.title.as_deref(), Some("upstream fetch error"));

    let report = scrape
        .sync_range(date(2024, 6, 1), date(2024, 6, 3), None)
        .await;
    assert!(!report.success);
    let summary = report.data.unwrap();
    assert_eq!(summary.units.len(), 3);
    assert_eq!(summary.failed, 3);
    assert!(!summary.cancelled);
}

#[tokio::test]
async fn unit_with_unresolvable_item_commits_nothing() {
    let store = test_store().await;
    let mut bad = item(9, "Ghost Entry", false, false);
    bad.url = "https://example.com/anime/9/fiche.html".to_string();

    let source = Arc::new(FakeSource {
        seasonal: vec![item(8, "Good Entry", false, false), bad],
        daily: vec![],
    });
    let scrape = ScrapeService::new(store.clone(), source);

    let report = scrape.sync_season(2024, SeasonKind::Summer, None).await;
    assert!(!report.success);

    // The whole unit rolled back, including the valid sibling item.
    assert_eq!(Sheets::find().count(&store.conn).await.unwrap(), 0);
    assert_eq!(SeasonalSchedule::find().count(&store.conn).await.unwrap(), 0);
}

#[tokio::test]
async fn cancellation_is_honored_at_unit_boundaries() {
    let store = test_store().await;
    let source = Arc::new(FakeSource {
        seasonal: vec![],
        daily: vec![item(1, "Azure Knights - Episode 1", false, false)],
    });
    let scrape = ScrapeService::new(store.clone(), source);

    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = scrape.sync_day(date(2024, 2, 1), Some(&cancel)).await;
    assert!(!report.success);
    assert_eq!(report.title.as_deref(), Some("cancelled"));

    let report = scrape
        .sync_range(date(2024, 2, 1), date(2024, 2, 5), Some(&cancel))
        .await;
    assert!(!report.success);
    let summary = report.data.unwrap();
    assert!(summary.cancelled);
    assert!(summary.units.is_empty());

    assert_eq!(DailySchedule::find().count(&store.conn).await.unwrap(), 0);
}

#[tokio::test]
async fn cancellation_mid_fetch_reports_cancelled_and_writes_nothing() {
    let store = test_store().await;
    let cancel = CancellationToken::new();
    let scrape = ScrapeService::new(
        store.clone(),
        Arc::new(CancellingSource {
            cancel: cancel.clone(),
        }),
    );

    // The fetch itself succeeds; the token trips while it is in flight.
    // The unit must report the same title as a pre-fetch cancellation.
    let report = scrape.sync_season(2024, SeasonKind::Winter, Some(&cancel)).await;
    assert!(!report.success);
    assert_eq!(report.title.as_deref(), Some("cancelled"));

    let fresh = CancellationToken::new();
    let scrape = ScrapeService::new(
        store.clone(),
        Arc::new(CancellingSource {
            cancel: fresh.clone(),
        }),
    );
    let report = scrape.sync_day(date(2024, 2, 1), Some(&fresh)).await;
    assert!(!report.success);
    assert_eq!(report.title.as_deref(), Some("cancelled"));

    assert_eq!(Sheets::find().count(&store.conn).await.unwrap(), 0);
    assert_eq!(SeasonalSchedule::find().count(&store.conn).await.unwrap(), 0);
    assert_eq!(DailySchedule::find().count(&store.conn).await.unwrap(), 0);
}

#[tokio::test]
async fn inverted_range_sync_is_a_validation_failure() {
    let store = test_store().await;
    let scrape = ScrapeService::new(
        store,
        Arc::new(FakeSource {
            seasonal: vec![],
            daily: vec![],
        }),
    );

    let report = scrape
        .sync_range(date(2024, 6, 10), date(2024, 6, 1), None)
        .await;
    assert!(!report.success);
    assert_eq!(report.title.as_deref(), Some("validation error"));
}
