//! Configuration service implementation.
//!
//! Loads [`GeneratorConfig`] from `config.toml` and caches it.

use crate::paths::TunesmithPaths;
use crate::storage::AtomicTomlFile;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tunesmith_core::config::GeneratorConfig;
use tunesmith_core::error::Result;

/// Configuration service that loads and caches the generator configuration.
///
/// A missing file yields the defaults and is not created.
#[derive(Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<GeneratorConfig>>>,
}

impl ConfigService {
    /// Uses the default location (or `TUNESMITH_CONFIG`).
    pub fn new() -> Result<Self> {
        let path = TunesmithPaths::default().config_file()?;
        Ok(Self::with_path(path))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Gets the configuration, loading it from file if not cached.
    pub fn get_config(&self) -> Result<GeneratorConfig> {
        if let Some(cached) = self.read_cache() {
            return Ok(cached);
        }

        let loaded = AtomicTomlFile::<GeneratorConfig>::new(self.path.clone()).load_or_default()?;
        tracing::debug!(path = %self.path.display(), "Loaded generator config");

        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = Some(loaded.clone());
        }
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    fn read_cache(&self) -> Option<GeneratorConfig> {
        self.config.read().ok().and_then(|guard| guard.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));
        assert_eq!(service.get_config().unwrap(), GeneratorConfig::default());
    }

    #[test]
    fn test_reads_file_and_caches_until_invalidated() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "daily_free_limit = 2\nlong_wait_timeout_secs = 30\n").unwrap();

        let service = ConfigService::with_path(path.clone());
        let config = service.get_config().unwrap();
        assert_eq!(config.daily_free_limit, 2);
        assert_eq!(config.long_wait_timeout_secs, 30);

        std::fs::write(&path, "daily_free_limit = 9\n").unwrap();
        assert_eq!(service.get_config().unwrap().daily_free_limit, 2);

        service.invalidate_cache();
        assert_eq!(service.get_config().unwrap().daily_free_limit, 9);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "daily_free_limit = \"many\"").unwrap();

        let err = ConfigService::with_path(path).get_config().unwrap_err();
        assert!(err.is_serialization());
    }
}
