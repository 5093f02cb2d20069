//! Scrape-and-store orchestration.
//!
//! Each schedule key (a season, or one date) is one sync unit: fetch the
//! page content, resolve every listed item to a sheet identity, make sure
//! the referenced taxonomy rows exist, register or update the catalog
//! entry, and write the schedule facts. All writes for a unit happen in
//! one transaction, so a unit either commits completely or reports a
//! failure. Sibling units in a batch are independent.
//!
//! Cancellation is cooperative and honored only at unit boundaries: before
//! each fetch and before opening a unit's write transaction, never in the
//! middle of one.

use crate::clients::{ScrapedItem, SheetSource};
use crate::db::repositories::{PlanningRepository, SheetRepository, TaxonomyRepository};
use crate::db::Store;
use crate::error::CoreError;
use crate::models::{Report, SeasonKey, SeasonKind, SheetType};
use crate::resolver;
use chrono::NaiveDate;
use sea_orm::TransactionTrait;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Outcome of one committed sync unit.
#[derive(Debug, Clone, Serialize)]
pub struct UnitSummary {
    pub unit: String,
    pub items: usize,
}

/// Aggregate outcome of a multi-unit sync call.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub units: Vec<Report<UnitSummary>>,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: bool,
}

pub struct ScrapeService {
    store: Store,
    source: Arc<dyn SheetSource>,
}

impl ScrapeService {
    #[must_use]
    pub fn new(store: Store, source: Arc<dyn SheetSource>) -> Self {
        Self { store, source }
    }

    /// Synchronizes one season's planning page.
    pub async fn sync_season(
        &self,
        year: i32,
        kind: SeasonKind,
        cancel: Option<&CancellationToken>,
    ) -> Report<UnitSummary> {
        let key = SeasonKey::new(year, kind);
        if is_cancelled(cancel) {
            return Report::failure("cancelled", format!("sync of {key} cancelled before fetch"));
        }
        self.run_season_unit(key, cancel).await.into()
    }

    /// Synchronizes one day's planning page.
    pub async fn sync_day(
        &self,
        date: NaiveDate,
        cancel: Option<&CancellationToken>,
    ) -> Report<UnitSummary> {
        if is_cancelled(cancel) {
            return Report::failure("cancelled", format!("sync of {date} cancelled before fetch"));
        }
        self.run_day_unit(date, cancel).await.into()
    }

    /// Synchronizes every day in the inclusive range, one unit per day.
    /// A failing day is reported and does not abort its siblings.
    pub async fn sync_range(
        &self,
        min_date: NaiveDate,
        max_date: NaiveDate,
        cancel: Option<&CancellationToken>,
    ) -> Report<BatchSummary> {
        if min_date > max_date {
            return Report::failure(
                "validation error",
                format!("inverted date range: {min_date} > {max_date}"),
            );
        }

        let mut units = Vec::new();
        let mut cancelled = false;

        let mut date = min_date;
        loop {
            if is_cancelled(cancel) {
                cancelled = true;
                break;
            }
            units.push(self.sync_day(date, cancel).await);
            if date >= max_date {
                break;
            }
            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }

        let succeeded = units.iter().filter(|unit| unit.success).count();
        let failed = units.len() - succeeded;
        let summary = BatchSummary {
            units,
            succeeded,
            failed,
            cancelled,
        };

        if failed == 0 && !cancelled {
            Report::ok(summary)
        } else {
            let message = if cancelled {
                "sync cancelled at a unit boundary".to_string()
            } else {
                format!("{failed} unit(s) failed")
            };
            Report {
                success: false,
                title: Some("partial sync".to_string()),
                message: Some(message),
                data: Some(summary),
            }
        }
    }

    async fn run_season_unit(
        &self,
        key: SeasonKey,
        cancel: Option<&CancellationToken>,
    ) -> Result<UnitSummary, CoreError> {
        let unit = key.to_string();
        let items = self
            .source
            .seasonal_items(key.year, key.kind)
            .await
            .map_err(|err| CoreError::upstream(&unit, &err))?;

        if is_cancelled(cancel) {
            return Err(CoreError::cancelled(format!(
                "sync of {unit} stopped before store writes"
            )));
        }

        let txn = self.store.conn.begin().await?;
        let season = TaxonomyRepository::ensure_season_in(&txn, key).await?;
        for item in &items {
            let sheet_id = Self::store_item(&txn, item).await?;
            PlanningRepository::put_seasonal_fact_in(
                &txn,
                sheet_id,
                season.id,
                &item.title,
                item.is_adult,
                item.is_explicit,
            )
            .await?;
        }
        txn.commit().await?;

        info!("synchronized {unit}: {} item(s)", items.len());
        Ok(UnitSummary {
            unit,
            items: items.len(),
        })
    }

    async fn run_day_unit(
        &self,
        date: NaiveDate,
        cancel: Option<&CancellationToken>,
    ) -> Result<UnitSummary, CoreError> {
        let unit = date.to_string();
        let items = self
            .source
            .daily_items(date)
            .await
            .map_err(|err| CoreError::upstream(&unit, &err))?;

        if is_cancelled(cancel) {
            return Err(CoreError::cancelled(format!(
                "sync of {unit} stopped before store writes"
            )));
        }

        let txn = self.store.conn.begin().await?;
        for item in &items {
            let sheet_id = Self::store_item(&txn, item).await?;
            PlanningRepository::put_daily_fact_in(
                &txn,
                sheet_id,
                date,
                &item.title,
                item.episode_number,
                item.is_adult,
                item.is_explicit,
            )
            .await?;
        }
        txn.commit().await?;

        info!("synchronized {unit}: {} item(s)", items.len());
        Ok(UnitSummary {
            unit,
            items: items.len(),
        })
    }

    /// Resolves one scraped item, ensures its taxonomy, registers the
    /// sheet, and returns the catalog surrogate id.
    async fn store_item(
        txn: &sea_orm::DatabaseTransaction,
        item: &ScrapedItem,
    ) -> Result<i32, CoreError> {
        let identity = resolver::resolve(&item.url).inspect_err(|_| {
            warn!("item '{}' has no resolvable identity: {}", item.title, item.url);
        })?;

        for (name, kind) in &item.categories {
            TaxonomyRepository::ensure_category_in(txn, identity.section, name, *kind).await?;
        }
        if let Some(format) = &item.format {
            TaxonomyRepository::ensure_format_in(txn, identity.section, format).await?;
        }

        let sheet = SheetRepository::register_in(txn, identity, SheetType::Fiche, &item.url).await?;
        Ok(sheet.id)
    }
}

fn is_cancelled(cancel: Option<&CancellationToken>) -> bool {
    cancel.is_some_and(CancellationToken::is_cancelled)
}
