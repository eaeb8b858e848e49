pub mod generate;
pub mod presets;
pub mod quota;

use anyhow::Result;
use std::path::PathBuf;
use tunesmith_infrastructure::TomlSettingsRepository;

async fn open_settings(path: Option<PathBuf>) -> Result<TomlSettingsRepository> {
    let repository = match path {
        Some(path) => TomlSettingsRepository::with_path(path).await?,
        None => TomlSettingsRepository::new().await?,
    };
    Ok(repository)
}
