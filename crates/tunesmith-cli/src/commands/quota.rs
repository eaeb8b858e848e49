use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tunesmith_application::lifecycle::{GenerationLifecycle, LifecycleSettings};
use tunesmith_core::settings::UsageCounter;
use tunesmith_infrastructure::ConfigService;

pub async fn run(settings_path: Option<PathBuf>) -> Result<()> {
    let config = ConfigService::new()?.get_config()?;
    let settings = Arc::new(super::open_settings(settings_path).await?);
    let used = settings.generations_used_today().await?;

    let (navigation, _) = mpsc::unbounded_channel();
    let lifecycle = GenerationLifecycle::new(
        LifecycleSettings::from(&config),
        settings.clone(),
        settings.clone(),
        navigation,
        config.full_version,
    );

    match lifecycle.remaining_free_generations().await {
        Some(remaining) => println!(
            "{} of {} free generations used today, {} left",
            used, config.daily_free_limit, remaining
        ),
        None => println!("Full version: unlimited generations ({} today)", used),
    }

    let snapshot = settings.snapshot().await;
    if snapshot.long_wait_notice_shown {
        println!("Long generations continue in the background.");
    }
    Ok(())
}
