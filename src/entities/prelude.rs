pub use super::categories::Entity as Categories;
pub use super::daily_schedule::Entity as DailySchedule;
pub use super::formats::Entity as Formats;
pub use super::seasonal_schedule::Entity as SeasonalSchedule;
pub use super::seasons::Entity as Seasons;
pub use super::sheets::Entity as Sheets;
