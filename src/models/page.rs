//! Ordered, paginated result wrapper for list queries.

use serde::Serialize;

/// One page of an ordered result set.
///
/// `total_items` comes from a count pass run under the same filter
/// predicate as the data pass, so it is always consistent with `items`
/// for the call that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct PageResult<T> {
    pub current_page: u64,
    pub total_pages: u64,
    pub page_size: u64,
    pub total_items: u64,
    pub items: Vec<T>,
}

impl<T> PageResult<T> {
    /// Builds a page from a `limit`/`skip` window. `limit == 0` means the
    /// whole result set was fetched as a single page, `skip` included.
    #[must_use]
    pub fn from_window(limit: u64, skip: u64, total_items: u64, items: Vec<T>) -> Self {
        if limit == 0 {
            return Self {
                current_page: 1,
                total_pages: 1,
                page_size: total_items,
                total_items,
                items,
            };
        }

        Self {
            current_page: skip / limit + 1,
            total_pages: total_items.div_ceil(limit).max(1),
            page_size: limit,
            total_items,
            items,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            current_page: self.current_page,
            total_pages: self.total_pages,
            page_size: self.page_size,
            total_items: self.total_items,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}
