//! Persisted per-user settings.
//!
//! Contains the small amount of state that must survive restarts: whether the
//! long-wait notice was ever shown and how many generations were used today.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Generation count for a single calendar day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DailyUsage {
    /// Day the count belongs to. `None` until the first generation.
    pub day: Option<NaiveDate>,
    pub count: u32,
}

impl DailyUsage {
    /// Returns the number of generations recorded on `today`.
    ///
    /// A count stored for any other day is stale and reads as zero.
    pub fn count_on(&self, today: NaiveDate) -> u32 {
        if self.day == Some(today) { self.count } else { 0 }
    }

    /// Records one generation on `today`, restarting the count on a new day.
    pub fn record_on(&mut self, today: NaiveDate) {
        if self.day == Some(today) {
            self.count = self.count.saturating_add(1);
        } else {
            self.day = Some(today);
            self.count = 1;
        }
    }
}

/// User settings that persist across restarts.
///
/// # File Location
///
/// - Linux: `~/.config/tunesmith/settings.toml`
/// - macOS: `~/Library/Application Support/tunesmith/settings.toml`
/// - Windows: `%APPDATA%\tunesmith\settings.toml`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct UserSettings {
    /// Set once the long-wait notice has been shown. Never cleared.
    pub long_wait_notice_shown: bool,

    /// Today's generation usage.
    pub usage: DailyUsage,
}

impl UserSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the long-wait notice as shown.
    ///
    /// Returns true if this call changed the flag.
    pub fn mark_long_wait_notice_shown(&mut self) -> bool {
        let changed = !self.long_wait_notice_shown;
        self.long_wait_notice_shown = true;
        changed
    }
}
