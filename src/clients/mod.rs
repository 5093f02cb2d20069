pub mod icotaku;

pub use icotaku::{IcotakuClient, ScrapedItem, SheetSource};
