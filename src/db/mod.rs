//! Store bootstrap: pooled connection, migrations, repository accessors.

use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::{
    DailyRow, IndexSummary, PlanningRepository, SeasonalRow, SectionCount, SheetRepository,
    TaxonomyRepository, VisibilityFilter,
};

/// Process-wide store handle. Cheap to clone; every repository borrows
/// the same pool. Callers composing multiple operations into one atomic
/// unit open a transaction on [`Store::conn`] and use the repositories'
/// `*_in` variants.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        // In-memory databases exist per connection, so they must never be
        // backed by a file and never share a pool larger than one.
        let in_memory = db_url.contains(":memory:");
        if !in_memory {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let max_connections = if in_memory { 1 } else { max_connections };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections.min(max_connections))
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "store connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    #[must_use]
    pub fn sheets(&self) -> SheetRepository {
        SheetRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn taxonomy(&self) -> TaxonomyRepository {
        TaxonomyRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn planning(&self) -> PlanningRepository {
        PlanningRepository::new(self.conn.clone())
    }
}
