pub mod planning;
pub mod sheet;
pub mod taxonomy;

pub use planning::{DailyRow, PlanningRepository, SeasonalRow, VisibilityFilter};
pub use sheet::{SectionCount, SheetRepository};
pub use taxonomy::{IndexSummary, TaxonomyRepository};
