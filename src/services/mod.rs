pub mod planning;
pub use planning::PlanningService;

pub mod scrape;
pub use scrape::{BatchSummary, ScrapeService, UnitSummary};
