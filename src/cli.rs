//! Command-line interface for icosync.
//!
//! Handlers only coerce input and print: process-wide visibility flags
//! are resolved into explicit filter arguments here, before anything
//! reaches the core.

use crate::clients::IcotakuClient;
use crate::config::{Config, VisibilityConfig};
use crate::db::{Store, VisibilityFilter};
use crate::models::{PlanningSortBy, SeasonKind, Section, SheetSortBy, SheetType, SortOrder};
use crate::resolver;
use crate::services::{PlanningService, ScrapeService};
use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// icosync - catalog sheet synchronization engine
#[derive(Parser)]
#[command(name = "icosync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch planning pages and synchronize them into the store
    Sync {
        #[command(subcommand)]
        command: SyncCommands,
    },

    /// Resolve a site URL to its sheet identity
    Resolve {
        /// Absolute site URL
        url: String,
    },

    /// Seed baseline taxonomy for sections (all sections when omitted)
    Index {
        sections: Vec<Section>,
    },

    /// List registered sheets
    #[command(alias = "ls")]
    List {
        #[arg(long = "section")]
        sections: Vec<Section>,
        #[arg(long = "sheet-type")]
        sheet_types: Vec<SheetType>,
        #[arg(long, default_value = "id")]
        sort_by: SheetSortBy,
        #[arg(long, default_value = "asc")]
        order: SortOrder,
        #[arg(long, default_value = "50")]
        limit: u64,
        #[arg(long, default_value = "0")]
        skip: u64,
        /// Print per-section counts instead of rows
        #[arg(long)]
        counts: bool,
    },

    /// Query planning views
    Planning {
        #[command(subcommand)]
        command: PlanningCommands,
    },
}

#[derive(Subcommand)]
pub enum SyncCommands {
    /// One season's planning page
    Season { year: i32, kind: SeasonKind },
    /// One day's planning page
    Day { date: NaiveDate },
    /// Every day in an inclusive range
    Range { min: NaiveDate, max: NaiveDate },
}

#[derive(Subcommand)]
pub enum PlanningCommands {
    /// Seasonal planning view
    Seasonal {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        kind: Option<SeasonKind>,
        /// Explicit adult filter (only honored when adult access is enabled)
        #[arg(long)]
        adult: Option<bool>,
        #[arg(long)]
        explicit: Option<bool>,
        #[arg(long, default_value = "title")]
        sort_by: PlanningSortBy,
        #[arg(long, default_value = "asc")]
        order: SortOrder,
        #[arg(long, default_value = "50")]
        limit: u64,
        #[arg(long, default_value = "0")]
        skip: u64,
        /// Print group counts instead of rows
        #[arg(long)]
        counts: bool,
    },
    /// Daily planning view
    Daily {
        min: NaiveDate,
        max: Option<NaiveDate>,
        #[arg(long)]
        adult: Option<bool>,
        #[arg(long)]
        explicit: Option<bool>,
        #[arg(long, default_value = "schedule-key")]
        sort_by: PlanningSortBy,
        #[arg(long, default_value = "asc")]
        order: SortOrder,
        #[arg(long, default_value = "50")]
        limit: u64,
        #[arg(long, default_value = "0")]
        skip: u64,
        #[arg(long)]
        counts: bool,
    },
}

/// Combines the process-wide visibility flags with caller-supplied
/// filters. Disabled access forces the corresponding axis to "hidden
/// content excluded", regardless of what the caller asked for.
#[must_use]
pub fn resolve_visibility(
    config: &VisibilityConfig,
    adult: Option<bool>,
    explicit: Option<bool>,
) -> VisibilityFilter {
    VisibilityFilter {
        is_adult: if config.adult_enabled {
            adult
        } else {
            Some(false)
        },
        is_explicit: if config.explicit_enabled {
            explicit
        } else {
            Some(false)
        },
    }
}

pub async fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        // No store needed for pure resolution.
        Commands::Resolve { url } => match resolver::resolve(&url) {
            Ok(identity) => {
                println!("{identity}");
                Ok(())
            }
            Err(err) => {
                warn!("{err}");
                anyhow::bail!("URL has no resolvable sheet identity");
            }
        },

        Commands::Sync { command } => {
            let store = open_store(&config).await?;
            run_sync(command, &config, store).await
        }

        Commands::Index { sections } => {
            let store = open_store(&config).await?;
            let sections = if sections.is_empty() {
                vec![
                    Section::Anime,
                    Section::Manga,
                    Section::LightNovel,
                    Section::Drama,
                    Section::Community,
                ]
            } else {
                sections
            };
            let report = store.taxonomy().create_index(&sections).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }

        Commands::List {
            sections,
            sheet_types,
            sort_by,
            order,
            limit,
            skip,
            counts,
        } => {
            let store = open_store(&config).await?;
            if counts {
                let buckets = store.sheets().section_counts().await?;
                println!("{}", serde_json::to_string_pretty(&buckets)?);
            } else {
                let page = store
                    .sheets()
                    .select_paged(&sections, &sheet_types, sort_by, order, limit, skip)
                    .await?;
                println!("{}", serde_json::to_string_pretty(&page)?);
            }
            Ok(())
        }

        Commands::Planning { command } => {
            let store = open_store(&config).await?;
            run_planning(command, &config, store).await
        }
    }
}

async fn open_store(config: &Config) -> Result<Store> {
    Store::with_pool_options(
        &config.store.database_path,
        config.store.max_connections,
        config.store.min_connections,
    )
    .await
}

async fn run_sync(command: SyncCommands, config: &Config, store: Store) -> Result<()> {
    let source = Arc::new(IcotakuClient::new(
        &config.source.user_agent,
        config.source.request_delay_ms,
    ));
    let service = ScrapeService::new(store, source);

    let cancel = CancellationToken::new();
    let signal_guard = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_guard.cancel();
        }
    });

    match command {
        SyncCommands::Season { year, kind } => {
            let report = service.sync_season(year, kind, Some(&cancel)).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        SyncCommands::Day { date } => {
            let report = service.sync_day(date, Some(&cancel)).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        SyncCommands::Range { min, max } => {
            let report = service.sync_range(min, max, Some(&cancel)).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

async fn run_planning(command: PlanningCommands, config: &Config, store: Store) -> Result<()> {
    let service = PlanningService::new(&store);
    match command {
        PlanningCommands::Seasonal {
            year,
            kind,
            adult,
            explicit,
            sort_by,
            order,
            limit,
            skip,
            counts,
        } => {
            let visibility = resolve_visibility(&config.visibility, adult, explicit);
            if counts {
                let buckets = service.letter_counts(year, kind, visibility).await?;
                println!("{}", serde_json::to_string_pretty(&buckets)?);
            } else {
                let page = service
                    .select_seasonal(year, kind, visibility, sort_by, order, limit, skip)
                    .await?;
                println!("{}", serde_json::to_string_pretty(&page)?);
            }
        }
        PlanningCommands::Daily {
            min,
            max,
            adult,
            explicit,
            sort_by,
            order,
            limit,
            skip,
            counts,
        } => {
            let visibility = resolve_visibility(&config.visibility, adult, explicit);
            if counts {
                let buckets = service.month_counts(min, max, visibility).await?;
                println!("{}", serde_json::to_string_pretty(&buckets)?);
            } else {
                let page = service
                    .select_daily(min, max, visibility, sort_by, order, limit, skip)
                    .await?;
                println!("{}", serde_json::to_string_pretty(&page)?);
            }
        }
    }
    Ok(())
}
