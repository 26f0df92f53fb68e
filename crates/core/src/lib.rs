#![forbid(unsafe_code)]

pub mod catalog;
pub mod fallback;
pub mod model;
pub mod time;

pub use catalog::{CatalogError, LevelCatalog, LevelOverview, QUESTIONS_PER_LEVEL};
pub use fallback::FallbackPool;
pub use time::Clock;
