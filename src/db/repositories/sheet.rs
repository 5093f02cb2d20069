//! Catalog of known sheets: registration, lookups by any key, deletion
//! with cascading schedule cleanup, and filtered list queries.

use crate::entities::{daily_schedule, prelude::*, seasonal_schedule, sheets};
use crate::error::CoreError;
use crate::models::{PageResult, Section, SheetIdentity, SheetSortBy, SheetType, SortOrder};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::info;

pub struct SheetRepository {
    conn: DatabaseConnection,
}

/// Number of registered sheets in one section.
#[derive(Debug, Clone, FromQueryResult, Serialize)]
pub struct SectionCount {
    pub section: Section,
    pub count: i64,
}

impl SheetRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Registers a sheet, or updates its mutable metadata when the
    /// `(section, remote id)` pair is already known. The surrogate id is
    /// assigned on first insert and never changes afterwards.
    pub async fn register(
        &self,
        identity: SheetIdentity,
        sheet_type: SheetType,
        url: &str,
    ) -> Result<sheets::Model, CoreError> {
        Self::register_in(&self.conn, identity, sheet_type, url).await
    }

    pub async fn register_in<C: ConnectionTrait>(
        conn: &C,
        identity: SheetIdentity,
        sheet_type: SheetType,
        url: &str,
    ) -> Result<sheets::Model, CoreError> {
        let remote_id = i32::try_from(identity.id)
            .map_err(|_| CoreError::InvalidIdentity(url.to_string()))?;

        let row = sheets::ActiveModel {
            section: Set(identity.section),
            sheet_type: Set(sheet_type),
            remote_id: Set(remote_id),
            url: Set(url.to_string()),
            ..Default::default()
        };

        Sheets::insert(row)
            .on_conflict(
                OnConflict::columns([sheets::Column::Section, sheets::Column::RemoteId])
                    .update_columns([sheets::Column::SheetType, sheets::Column::Url])
                    .to_owned(),
            )
            .exec(conn)
            .await?;

        Self::find_by_identity_in(conn, identity)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("sheet {identity}")))
    }

    pub async fn get(&self, id: i32) -> Result<Option<sheets::Model>, CoreError> {
        Ok(Sheets::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn find_by_identity(
        &self,
        identity: SheetIdentity,
    ) -> Result<Option<sheets::Model>, CoreError> {
        Self::find_by_identity_in(&self.conn, identity).await
    }

    pub async fn find_by_identity_in<C: ConnectionTrait>(
        conn: &C,
        identity: SheetIdentity,
    ) -> Result<Option<sheets::Model>, CoreError> {
        let remote_id = i32::try_from(identity.id)
            .map_err(|_| CoreError::InvalidIdentity(identity.to_string()))?;
        Ok(Sheets::find()
            .filter(sheets::Column::Section.eq(identity.section))
            .filter(sheets::Column::RemoteId.eq(remote_id))
            .one(conn)
            .await?)
    }

    pub async fn find_by_url(&self, url: &str) -> Result<Option<sheets::Model>, CoreError> {
        Ok(Sheets::find()
            .filter(sheets::Column::Url.eq(url))
            .one(&self.conn)
            .await?)
    }

    /// Hard-deletes a sheet and its schedule rows in one transaction.
    /// Deleting an unknown id is a no-op success.
    pub async fn delete(&self, id: i32) -> Result<bool, CoreError> {
        let Some(sheet) = self.get(id).await? else {
            return Ok(false);
        };
        self.delete_row(sheet.id).await
    }

    pub async fn delete_by_identity(&self, identity: SheetIdentity) -> Result<bool, CoreError> {
        let Some(sheet) = self.find_by_identity(identity).await? else {
            return Ok(false);
        };
        self.delete_row(sheet.id).await
    }

    pub async fn delete_by_url(&self, url: &str) -> Result<bool, CoreError> {
        let Some(sheet) = self.find_by_url(url).await? else {
            return Ok(false);
        };
        self.delete_row(sheet.id).await
    }

    async fn delete_row(&self, id: i32) -> Result<bool, CoreError> {
        let txn = self.conn.begin().await?;

        seasonal_schedule::Entity::delete_many()
            .filter(seasonal_schedule::Column::SheetId.eq(id))
            .exec(&txn)
            .await?;

        daily_schedule::Entity::delete_many()
            .filter(daily_schedule::Column::SheetId.eq(id))
            .exec(&txn)
            .await?;

        let result = Sheets::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        let removed = result.rows_affected > 0;
        if removed {
            info!("removed sheet {id} and its schedule rows");
        }
        Ok(removed)
    }

    /// Ordered, filtered list. Filters are conjunctive; an empty filter
    /// list leaves that dimension unrestricted. `limit == 0` returns the
    /// whole set as a single window and ignores `skip`.
    pub async fn select(
        &self,
        sections: &[Section],
        sheet_types: &[SheetType],
        sort_by: SheetSortBy,
        order: SortOrder,
        limit: u64,
        skip: u64,
    ) -> Result<Vec<sheets::Model>, CoreError> {
        let mut query = Self::filtered(sections, sheet_types);
        query = Self::ordered(query, sort_by, order);

        if limit > 0 {
            query = query.limit(limit).offset(skip);
        }

        Ok(query.all(&self.conn).await?)
    }

    /// Same as [`Self::select`] but wrapped in a page with totals computed
    /// under the same filter predicate as the data pass.
    pub async fn select_paged(
        &self,
        sections: &[Section],
        sheet_types: &[SheetType],
        sort_by: SheetSortBy,
        order: SortOrder,
        limit: u64,
        skip: u64,
    ) -> Result<PageResult<sheets::Model>, CoreError> {
        let total = Self::filtered(sections, sheet_types)
            .count(&self.conn)
            .await?;
        let items = self
            .select(sections, sheet_types, sort_by, order, limit, skip)
            .await?;
        Ok(PageResult::from_window(limit, skip, total, items))
    }

    pub async fn count(&self) -> Result<u64, CoreError> {
        Ok(Sheets::find().count(&self.conn).await?)
    }

    /// Per-section sheet counts, ordered by section.
    pub async fn section_counts(&self) -> Result<Vec<SectionCount>, CoreError> {
        Ok(Sheets::find()
            .select_only()
            .column(sheets::Column::Section)
            .column_as(sheets::Column::Id.count(), "count")
            .group_by(sheets::Column::Section)
            .order_by(sheets::Column::Section, Order::Asc)
            .into_model::<SectionCount>()
            .all(&self.conn)
            .await?)
    }

    fn filtered(sections: &[Section], sheet_types: &[SheetType]) -> Select<Sheets> {
        let mut query = Sheets::find();
        if !sections.is_empty() {
            query = query.filter(sheets::Column::Section.is_in(sections.iter().copied()));
        }
        if !sheet_types.is_empty() {
            query = query.filter(sheets::Column::SheetType.is_in(sheet_types.iter().copied()));
        }
        query
    }

    fn ordered(query: Select<Sheets>, sort_by: SheetSortBy, order: SortOrder) -> Select<Sheets> {
        let column = match sort_by {
            SheetSortBy::Id => sheets::Column::Id,
            SheetSortBy::Section => sheets::Column::Section,
            SheetSortBy::SheetType => sheets::Column::SheetType,
            SheetSortBy::RemoteId => sheets::Column::RemoteId,
            SheetSortBy::Url => sheets::Column::Url,
        };

        let mut query = query.order_by(column, order.into());
        if sort_by != SheetSortBy::Id {
            // Surrogate-key tiebreak keeps relative order stable across
            // page boundaries.
            query = query.order_by(sheets::Column::Id, Order::Asc);
        }
        query
    }
}
