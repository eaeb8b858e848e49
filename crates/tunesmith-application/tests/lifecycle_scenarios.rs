//! End-to-end lifecycle scenarios on a paused clock.

use async_trait::async_trait;
use std::future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tunesmith_application::lifecycle::{
    GenerationLifecycle, LifecycleError, LifecycleService, LifecycleSettings,
};
use tunesmith_core::entitlement::EntitlementProvider;
use tunesmith_core::error::Result;
use tunesmith_core::generation::{
    Duration as TrackLength, FailureKind, GeneratedAudio, GenerationBackend, GenerationError,
    GenerationFailure, Genre, Mood, RequestParameters,
};
use tunesmith_core::presentation::{NavigationSignal, OfferReason, PresentationState};
use tunesmith_core::settings::{LongWaitNoticeStore, UsageCounter};

#[derive(Default)]
struct MemorySettings {
    usage: Mutex<u32>,
    long_wait_shown: Mutex<bool>,
}

impl MemorySettings {
    fn with_usage(usage: u32) -> Self {
        Self {
            usage: Mutex::new(usage),
            ..Default::default()
        }
    }

    fn with_notice_seen() -> Self {
        Self {
            long_wait_shown: Mutex::new(true),
            ..Default::default()
        }
    }

    fn notice_seen(&self) -> bool {
        *self.long_wait_shown.lock().unwrap()
    }
}

#[async_trait]
impl UsageCounter for MemorySettings {
    async fn generations_used_today(&self) -> Result<u32> {
        Ok(*self.usage.lock().unwrap())
    }

    async fn record_generation(&self) -> Result<()> {
        *self.usage.lock().unwrap() += 1;
        Ok(())
    }
}

#[async_trait]
impl LongWaitNoticeStore for MemorySettings {
    async fn has_shown_long_wait_notice(&self) -> Result<bool> {
        Ok(*self.long_wait_shown.lock().unwrap())
    }

    async fn mark_long_wait_notice_shown(&self) -> Result<()> {
        *self.long_wait_shown.lock().unwrap() = true;
        Ok(())
    }
}

/// Backend that answers each call after a fixed delay, keyed by prompt.
struct ScriptedBackend {
    script: Vec<(&'static str, Option<Duration>, Option<FailureKind>)>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    fn new() -> Self {
        Self {
            script: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// `prompt` resolves successfully after `delay`, with the prompt as audio id.
    fn succeeds(mut self, prompt: &'static str, delay: Duration) -> Self {
        self.script.push((prompt, Some(delay), None));
        self
    }

    fn fails(mut self, prompt: &'static str, delay: Duration, kind: FailureKind) -> Self {
        self.script.push((prompt, Some(delay), Some(kind)));
        self
    }

    fn hangs(mut self, prompt: &'static str) -> Self {
        self.script.push((prompt, None, None));
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn generate(
        &self,
        params: RequestParameters,
    ) -> std::result::Result<GeneratedAudio, GenerationFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (_, delay, failure) = self
            .script
            .iter()
            .find(|(prompt, _, _)| *prompt == params.prompt)
            .cloned()
            .unwrap_or_else(|| panic!("unscripted prompt {:?}", params.prompt));

        let Some(delay) = delay else {
            return future::pending().await;
        };
        tokio::time::sleep(delay).await;
        match failure {
            Some(kind) => Err(kind.into()),
            None => Ok(audio(&params)),
        }
    }
}

struct TestEntitlement {
    sender: watch::Sender<bool>,
}

impl TestEntitlement {
    fn new(full_version: bool) -> Self {
        let (sender, _) = watch::channel(full_version);
        Self { sender }
    }
}

impl EntitlementProvider for TestEntitlement {
    fn is_full_version(&self) -> bool {
        *self.sender.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}

struct Harness {
    service: LifecycleService,
    backend: Arc<ScriptedBackend>,
    settings: Arc<MemorySettings>,
    entitlement: TestEntitlement,
    navigation: mpsc::UnboundedReceiver<NavigationSignal>,
    presentation: watch::Receiver<PresentationState>,
}

impl Harness {
    fn start(settings: MemorySettings, backend: ScriptedBackend) -> Self {
        Self::start_with(settings, backend, false)
    }

    fn start_with(settings: MemorySettings, backend: ScriptedBackend, full_version: bool) -> Self {
        let settings = Arc::new(settings);
        let backend = Arc::new(backend);
        let entitlement = TestEntitlement::new(full_version);
        let (tx, navigation) = mpsc::unbounded_channel();

        let lifecycle = GenerationLifecycle::new(
            LifecycleSettings::default(),
            settings.clone(),
            settings.clone(),
            tx,
            entitlement.is_full_version(),
        );
        let service = LifecycleService::spawn(lifecycle, backend.clone(), &entitlement);
        let presentation = service.presentation();

        Self {
            service,
            backend,
            settings,
            entitlement,
            navigation,
            presentation,
        }
    }

    fn state(&self) -> PresentationState {
        *self.presentation.borrow()
    }
}

fn params(prompt: &str) -> RequestParameters {
    RequestParameters::new(prompt, Genre::Lofi, Mood::Relaxed, TrackLength::ThirtySeconds)
}

fn audio(params: &RequestParameters) -> GeneratedAudio {
    GeneratedAudio::with_id(
        params.prompt.clone(),
        params,
        format!("memory://{}", params.prompt),
    )
}

fn assert_elapsed(started: Instant, secs: u64) {
    let elapsed = started.elapsed();
    let expected = Duration::from_secs(secs);
    assert!(
        elapsed >= expected && elapsed < expected + Duration::from_millis(10),
        "expected ~{secs}s, got {elapsed:?}"
    );
}

async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_fast_result_navigates_to_result() {
    let mut h = Harness::start(
        MemorySettings::with_usage(2),
        ScriptedBackend::new().succeeds("lofi beats", Duration::from_secs(3)),
    );
    let started = Instant::now();

    h.service
        .submit_and_confirm(params("lofi beats"))
        .await
        .unwrap();
    assert!(h.state().show_loader);

    let signal = h.navigation.recv().await.unwrap();
    assert_elapsed(started, 3);
    assert_eq!(
        signal,
        NavigationSignal::NavigateToResult {
            audio: audio(&params("lofi beats"))
        }
    );
    let state = h.state();
    assert!(!state.show_loader);
    assert!(state.is_result_ready);

    // The timer was disarmed: nothing happens at the 15 second mark.
    tokio::time::sleep(Duration::from_secs(30)).await;
    settle().await;
    assert!(!h.settings.notice_seen());
    assert!(!h.state().show_long_wait_notice);
    assert!(h.navigation.try_recv().is_err());

    h.service.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_empty_prompt_never_reaches_backend() {
    let mut h = Harness::start(MemorySettings::default(), ScriptedBackend::new());

    for prompt in ["", "  ", "\t"] {
        let err = h
            .service
            .submit_and_confirm(params(prompt))
            .await
            .unwrap_err();
        assert_eq!(err, LifecycleError::Rejected(GenerationError::EmptyInput));

        let state = h.state();
        assert!(state.is_empty_prompt_error);
        assert!(!state.show_loader);
    }
    assert_eq!(h.backend.calls(), 0);
    assert!(h.navigation.try_recv().is_err());

    h.service.prompt_edited();
    h.presentation
        .wait_for(|state| !state.is_empty_prompt_error)
        .await
        .unwrap();

    h.service.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_quota_presents_offer() {
    let mut h = Harness::start(MemorySettings::with_usage(5), ScriptedBackend::new());

    let err = h
        .service
        .submit_and_confirm(params("lofi beats"))
        .await
        .unwrap_err();

    assert_eq!(err, LifecycleError::Rejected(GenerationError::QuotaExceeded));
    assert_eq!(
        h.navigation.recv().await.unwrap(),
        NavigationSignal::PresentUpgradeOffer {
            reason: OfferReason::QuotaLimit
        }
    );
    assert_eq!(h.backend.calls(), 0);
    assert!(!h.state().show_loader);

    h.service.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_queued_submission_counts_earlier_acceptance() {
    let mut h = Harness::start(
        MemorySettings::with_usage(4),
        ScriptedBackend::new()
            .hangs("first")
            .succeeds("second", Duration::from_secs(1)),
    );

    // Both events are queued before the first backend call has run.
    assert!(h.service.submit(params("first")));
    let err = h
        .service
        .submit_and_confirm(params("second"))
        .await
        .unwrap_err();

    assert_eq!(err, LifecycleError::Rejected(GenerationError::QuotaExceeded));
    assert_eq!(
        h.navigation.recv().await.unwrap(),
        NavigationSignal::PresentUpgradeOffer {
            reason: OfferReason::QuotaLimit
        }
    );
    assert_eq!(*h.settings.usage.lock().unwrap(), 5);
    settle().await;
    assert_eq!(h.backend.calls(), 1);
    assert!(h.state().show_loader);

    h.service.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_entitlement_update_lifts_quota() {
    let mut h = Harness::start(
        MemorySettings::with_usage(5),
        ScriptedBackend::new().succeeds("lofi beats", Duration::from_secs(1)),
    );

    h.entitlement.sender.send_replace(true);
    h.presentation
        .wait_for(|state| state.is_entitled_full_version)
        .await
        .unwrap();

    h.service
        .submit_and_confirm(params("lofi beats"))
        .await
        .unwrap();
    assert!(matches!(
        h.navigation.recv().await.unwrap(),
        NavigationSignal::NavigateToResult { .. }
    ));
    assert_eq!(h.backend.calls(), 1);

    h.service.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_first_timeout_shows_notice_then_late_result() {
    let mut h = Harness::start(
        MemorySettings::default(),
        ScriptedBackend::new().succeeds("lofi beats", Duration::from_secs(40)),
    );
    let started = Instant::now();

    h.service
        .submit_and_confirm(params("lofi beats"))
        .await
        .unwrap();

    h.presentation
        .wait_for(|state| state.show_long_wait_notice)
        .await
        .unwrap();
    assert_elapsed(started, 15);
    settle().await;
    assert!(h.settings.notice_seen());
    assert!(!h.state().show_loader);
    assert!(h.navigation.try_recv().is_err());

    let signal = h.navigation.recv().await.unwrap();
    assert_elapsed(started, 40);
    assert_eq!(
        signal,
        NavigationSignal::NavigateToResult {
            audio: audio(&params("lofi beats"))
        }
    );
    let state = h.state();
    assert!(!state.show_long_wait_notice);
    assert!(state.is_result_ready);

    h.service.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_repeat_timeout_moves_to_background_and_drops_result() {
    let mut h = Harness::start(
        MemorySettings::with_notice_seen(),
        ScriptedBackend::new().succeeds("lofi beats", Duration::from_secs(40)),
    );
    let started = Instant::now();

    h.service
        .submit_and_confirm(params("lofi beats"))
        .await
        .unwrap();

    assert_eq!(
        h.navigation.recv().await.unwrap(),
        NavigationSignal::NavigateToLibraryBackground
    );
    assert_elapsed(started, 15);
    let state = h.state();
    assert!(!state.show_loader);
    assert!(!state.show_long_wait_notice);

    tokio::time::sleep(Duration::from_secs(30)).await;
    settle().await;
    assert_eq!(h.backend.calls(), 1);
    assert!(!h.state().is_result_ready);
    assert!(h.navigation.try_recv().is_err());

    h.service.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_failure_raises_alert_without_timeout() {
    let mut h = Harness::start(
        MemorySettings::default(),
        ScriptedBackend::new().fails(
            "lofi beats",
            Duration::from_secs(2),
            FailureKind::NotConnectedToInternet,
        ),
    );

    h.service
        .submit_and_confirm(params("lofi beats"))
        .await
        .unwrap();
    h.presentation
        .wait_for(|state| state.show_no_internet_alert)
        .await
        .unwrap();
    assert!(!h.state().show_loader);

    tokio::time::sleep(Duration::from_secs(30)).await;
    settle().await;
    assert!(!h.settings.notice_seen());
    assert!(h.navigation.try_recv().is_err());

    h.service.dismiss_alerts();
    h.presentation
        .wait_for(|state| !state.show_no_internet_alert)
        .await
        .unwrap();

    h.service.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_superseded_run_cannot_touch_new_run() {
    let mut h = Harness::start(
        MemorySettings::default(),
        ScriptedBackend::new()
            .succeeds("first", Duration::from_secs(20))
            .succeeds("second", Duration::from_secs(30)),
    );
    let started = Instant::now();

    h.service.submit_and_confirm(params("first")).await.unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;
    h.service.submit_and_confirm(params("second")).await.unwrap();

    // First run's timer (15s) and result (20s) are both ignored.
    tokio::time::sleep(Duration::from_secs(12)).await;
    settle().await;
    assert!(!h.settings.notice_seen());
    assert!(h.state().show_loader);
    assert!(h.navigation.try_recv().is_err());

    // Second run times out at 25s.
    h.presentation
        .wait_for(|state| state.show_long_wait_notice)
        .await
        .unwrap();
    assert_elapsed(started, 25);

    let signal = h.navigation.recv().await.unwrap();
    assert_elapsed(started, 40);
    assert_eq!(
        signal,
        NavigationSignal::NavigateToResult {
            audio: audio(&params("second"))
        }
    );

    h.service.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_disarms_timer_and_unsubscribes() {
    let h = Harness::start(
        MemorySettings::default(),
        ScriptedBackend::new().hangs("lofi beats"),
    );

    h.service
        .submit_and_confirm(params("lofi beats"))
        .await
        .unwrap();
    assert_eq!(h.entitlement.sender.receiver_count(), 1);

    let context = h.service.context();
    h.service.shutdown().await;
    assert_eq!(h.entitlement.sender.receiver_count(), 0);

    tokio::time::sleep(Duration::from_secs(60)).await;
    settle().await;
    assert!(!h.settings.notice_seen());
    assert!(!context.dispatch(tunesmith_application::lifecycle::LifecycleEvent::PromptEdited));
}
