//! TOML-backed user settings repository.
//!
//! Persists the long-wait notice flag and the daily usage counter in
//! `settings.toml` and caches them in memory.

use crate::paths::TunesmithPaths;
use crate::storage::AtomicTomlFile;
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tunesmith_core::error::{Result, TunesmithError};
use tunesmith_core::settings::{LongWaitNoticeStore, UsageCounter, UserSettings};

/// Clock used to decide which day a generation belongs to.
pub type Today = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Settings repository backed by an [`AtomicTomlFile`].
///
/// All methods are async; file I/O runs on the blocking pool.
#[derive(Clone)]
pub struct TomlSettingsRepository {
    /// Cached settings, refreshed after every write.
    settings: Arc<Mutex<UserSettings>>,
    file: Arc<AtomicTomlFile<UserSettings>>,
    today: Today,
}

impl TomlSettingsRepository {
    /// Opens the settings file at the default location.
    pub async fn new() -> Result<Self> {
        let path = TunesmithPaths::default().settings_file()?;
        Self::with_path(path).await
    }

    /// Opens the settings file at `path` and loads it into the cache.
    pub async fn with_path(path: PathBuf) -> Result<Self> {
        Self::with_clock(path, Arc::new(|| Local::now().date_naive())).await
    }

    pub async fn with_clock(path: PathBuf, today: Today) -> Result<Self> {
        let file = Arc::new(AtomicTomlFile::new(path));
        let loader = file.clone();
        let initial = tokio::task::spawn_blocking(move || loader.load_or_default())
            .await
            .map_err(|e| TunesmithError::internal(format!("Failed to join task: {}", e)))??;

        Ok(Self {
            settings: Arc::new(Mutex::new(initial)),
            file,
            today,
        })
    }

    /// Current cached settings.
    pub async fn snapshot(&self) -> UserSettings {
        self.settings.lock().await.clone()
    }

    async fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut UserSettings) -> bool + Send + 'static,
    {
        // Holding the cache lock across the write keeps in-process updates ordered.
        let mut cached = self.settings.lock().await;
        let file = self.file.clone();
        let updated = tokio::task::spawn_blocking(move || file.update(f))
            .await
            .map_err(|e| TunesmithError::internal(format!("Failed to join task: {}", e)))??;
        *cached = updated;
        Ok(())
    }
}

#[async_trait]
impl UsageCounter for TomlSettingsRepository {
    async fn generations_used_today(&self) -> Result<u32> {
        let today = (self.today)();
        Ok(self.settings.lock().await.usage.count_on(today))
    }

    async fn record_generation(&self) -> Result<()> {
        let today = (self.today)();
        self.update(move |settings| {
            settings.usage.record_on(today);
            true
        })
        .await?;
        tracing::debug!(%today, "Recorded generation usage");
        Ok(())
    }
}

#[async_trait]
impl LongWaitNoticeStore for TomlSettingsRepository {
    async fn has_shown_long_wait_notice(&self) -> Result<bool> {
        Ok(self.settings.lock().await.long_wait_notice_shown)
    }

    async fn mark_long_wait_notice_shown(&self) -> Result<()> {
        if self.has_shown_long_wait_notice().await? {
            return Ok(());
        }
        self.update(|settings| settings.mark_long_wait_notice_shown())
            .await
    }
}
