//! Daily free-usage quota.

/// Decides whether another free generation is allowed today.
///
/// Full-version users are never limited. Everyone else gets
/// `daily_free_limit` generations per calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaPolicy {
    daily_free_limit: u32,
}

impl QuotaPolicy {
    pub const DEFAULT_DAILY_FREE_LIMIT: u32 = 5;

    pub fn new(daily_free_limit: u32) -> Self {
        Self { daily_free_limit }
    }

    pub fn daily_free_limit(&self) -> u32 {
        self.daily_free_limit
    }

    /// Returns true iff `is_unlimited` or `current_usage` is below the limit.
    pub fn allow(&self, current_usage: u32, is_unlimited: bool) -> bool {
        is_unlimited || current_usage < self.daily_free_limit
    }

    /// Free generations left today, or `None` for unlimited users.
    pub fn remaining(&self, current_usage: u32, is_unlimited: bool) -> Option<u32> {
        if is_unlimited {
            None
        } else {
            Some(self.daily_free_limit.saturating_sub(current_usage))
        }
    }
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DAILY_FREE_LIMIT)
    }
}
