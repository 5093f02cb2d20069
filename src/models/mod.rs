pub mod page;
pub mod query;
pub mod report;
pub mod season;
pub mod section;

pub use page::PageResult;
pub use query::{GroupCount, GroupKey, PlanningSortBy, SheetSortBy, SortOrder};
pub use report::Report;
pub use season::{SeasonKey, SeasonKind};
pub use section::{CategoryKind, Section, SheetIdentity, SheetType};
