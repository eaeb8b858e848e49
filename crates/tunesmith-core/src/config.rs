use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::quota::QuotaPolicy;

const DEFAULT_LONG_WAIT_TIMEOUT_SECS: u64 = 15;

/// Root configuration read from `config.toml`.
///
/// Every field has a default, so a missing or partial file is valid.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Free generations per day for users without the full version.
    pub daily_free_limit: u32,
    /// Seconds to wait for a result before the long-wait fallback kicks in.
    pub long_wait_timeout_secs: u64,
    /// Base URL of the generation backend.
    pub backend_url: Option<String>,
    /// Starts the session with the full version unlocked.
    pub full_version: bool,
}

impl GeneratorConfig {
    pub fn quota_policy(&self) -> QuotaPolicy {
        QuotaPolicy::new(self.daily_free_limit)
    }

    pub fn long_wait_timeout(&self) -> Duration {
        Duration::from_secs(self.long_wait_timeout_secs)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            daily_free_limit: QuotaPolicy::DEFAULT_DAILY_FREE_LIMIT,
            long_wait_timeout_secs: DEFAULT_LONG_WAIT_TIMEOUT_SECS,
            backend_url: None,
            full_version: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: GeneratorConfig = toml::from_str("daily_free_limit = 3").unwrap();
        assert_eq!(config.daily_free_limit, 3);
        assert_eq!(config.long_wait_timeout(), Duration::from_secs(15));
        assert!(config.backend_url.is_none());
        assert!(!config.full_version);
    }

    #[test]
    fn test_empty_file_is_default() {
        let config: GeneratorConfig = toml::from_str("").unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.quota_policy().daily_free_limit(), 5);
    }
}
