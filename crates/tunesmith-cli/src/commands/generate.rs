use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tokio::sync::mpsc;
use tunesmith_application::GenerationForm;
use tunesmith_application::lifecycle::{
    GenerationLifecycle, LifecycleError, LifecycleService, LifecycleSettings,
};
use tunesmith_core::entitlement::EntitlementProvider;
use tunesmith_core::generation::{Duration, GenerationBackend, GenerationError, Genre, Mood};
use tunesmith_core::presentation::{NavigationSignal, PresentationState};
use tunesmith_infrastructure::{
    ConfigService, HttpGenerationBackend, TomlSettingsRepository,
    WatchEntitlementProvider,
};

use crate::simulated::{SimulatedBackend, SimulatedFailure};

pub struct GenerateArgs {
    pub prompt: String,
    pub preset: Option<usize>,
    pub genre: Genre,
    pub mood: Mood,
    pub duration: Duration,
    pub full_version: bool,
    pub simulate_secs: Option<u64>,
    pub simulate_failure: Option<SimulatedFailure>,
    pub json: bool,
}

pub async fn run(args: GenerateArgs, settings_path: Option<PathBuf>) -> Result<()> {
    let mut form = GenerationForm::new();
    form.set_prompt(args.prompt);
    form.set_genre(args.genre);
    form.set_mood(args.mood);
    form.set_duration(args.duration);
    if let Some(index) = args.preset {
        if !form.apply_preset(index) {
            bail!(
                "Genre '{}' has no preset #{} (see `tunesmith presets --genre {}`)",
                args.genre,
                index,
                args.genre
            );
        }
    }
    if !form.can_submit() {
        bail!("A prompt is required: pass --prompt or --preset");
    }

    let config = ConfigService::new()?
        .get_config()
        .context("Failed to load config")?;
    let settings = Arc::new(super::open_settings(settings_path).await?);
    let entitlement = WatchEntitlementProvider::new(config.full_version || args.full_version);

    let backend: Arc<dyn GenerationBackend> = match args.simulate_secs {
        Some(secs) => Arc::new(SimulatedBackend::new(
            StdDuration::from_secs(secs),
            args.simulate_failure,
        )),
        None => Arc::new(HttpGenerationBackend::new(config.backend_url.as_deref())?),
    };

    let (navigation_tx, mut navigation) = mpsc::unbounded_channel();
    let lifecycle = GenerationLifecycle::new(
        LifecycleSettings::from(&config),
        settings.clone(),
        settings,
        navigation_tx,
        entitlement.is_full_version(),
    );
    let service = LifecycleService::spawn(lifecycle, backend, &entitlement);
    let mut presentation = service.presentation();

    match service.submit_and_confirm(form.parameters()).await {
        Ok(run_id) => tracing::debug!(run = %run_id, "Submission accepted"),
        Err(LifecycleError::Rejected(GenerationError::EmptyInput)) => {
            println!("The prompt is empty. Describe the music you want.");
            service.shutdown().await;
            return Ok(());
        }
        Err(LifecycleError::Rejected(GenerationError::QuotaExceeded)) => {
            if let Ok(signal) = navigation.try_recv() {
                report_signal(&signal, args.json)?;
            }
            service.shutdown().await;
            return Ok(());
        }
        Err(e) => {
            service.shutdown().await;
            return Err(e.into());
        }
    }

    println!("Generating...");
    let mut last = *presentation.borrow_and_update();
    loop {
        tokio::select! {
            signal = navigation.recv() => {
                if let Some(signal) = signal {
                    report_signal(&signal, args.json)?;
                }
                break;
            }
            changed = presentation.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *presentation.borrow_and_update();
                if report_state(&last, &state) {
                    break;
                }
                last = state;
            }
            _ = tokio::signal::ctrl_c() => {
                println!("Cancelled.");
                break;
            }
        }
    }

    service.shutdown().await;
    Ok(())
}

/// Prints what changed. Returns `true` when the run ended with an alert.
fn report_state(previous: &PresentationState, state: &PresentationState) -> bool {
    if state.show_long_wait_notice && !previous.show_long_wait_notice {
        println!(
            "This is taking longer than usual. You can keep waiting; next time long \
             generations continue in your library."
        );
    }
    if state.show_no_internet_alert {
        println!("No internet connection. Check your network and try again.");
        return true;
    }
    if state.show_server_alert {
        println!("The generation server had a problem. Please try again later.");
        return true;
    }
    false
}

fn report_signal(signal: &NavigationSignal, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(signal)?);
        return Ok(());
    }
    match signal {
        NavigationSignal::NavigateToResult { audio } => {
            println!("Ready: {}", audio.audio_ref);
            println!(
                "  \"{}\" ({}, {}, {}s) id {}",
                audio.prompt,
                audio.genre,
                audio.mood,
                audio.duration.seconds(),
                audio.id
            );
        }
        NavigationSignal::NavigateToLibraryBackground => {
            println!("Still generating. The track will show up in your library when it is done.");
        }
        NavigationSignal::PresentUpgradeOffer { .. } => {
            println!(
                "You have used all free generations for today. Unlock the full version \
                 (--full-version) for unlimited generations."
            );
        }
    }
    Ok(())
}
