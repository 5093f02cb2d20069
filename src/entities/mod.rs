pub mod prelude;

pub mod categories;
pub mod daily_schedule;
pub mod formats;
pub mod seasonal_schedule;
pub mod seasons;
pub mod sheets;
