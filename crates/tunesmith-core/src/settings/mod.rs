//! Persisted user settings: model and repository traits.

mod model;
mod repository;

pub use model::{DailyUsage, UserSettings};
pub use repository::{LongWaitNoticeStore, UsageCounter};
