//! Natural-key uniqueness is enforced at the store level, not just in
//! application code. The ensure-exists paths rely on these indexes to
//! detect and recover insert races.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const INDEXES: &[(&str, &str)] = &[
    (
        "idx_sheets_section_remote_id",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_sheets_section_remote_id ON sheets(section, remote_id)",
    ),
    (
        "idx_categories_section_name",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_categories_section_name ON categories(section, name)",
    ),
    (
        "idx_formats_section_name",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_formats_section_name ON formats(section, name)",
    ),
    (
        "idx_seasons_year_kind",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_seasons_year_kind ON seasons(year, kind)",
    ),
    (
        "idx_seasonal_schedule_sheet_season",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_seasonal_schedule_sheet_season ON seasonal_schedule(sheet_id, season_id)",
    ),
    (
        "idx_daily_schedule_sheet_date",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_daily_schedule_sheet_date ON daily_schedule(sheet_id, release_date)",
    ),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        for (_, create) in INDEXES {
            conn.execute_unprepared(create).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        for (name, _) in INDEXES {
            conn.execute_unprepared(&format!("DROP INDEX IF EXISTS {name}"))
                .await?;
        }
        Ok(())
    }
}
