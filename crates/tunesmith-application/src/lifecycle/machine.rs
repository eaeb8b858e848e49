//! Generation lifecycle state machine.
//!
//! Owns the active run and the presentation state. Every method must be called
//! from the single lifecycle context (see [`super::service`]); the machine
//! itself never spawns tasks, it hands a [`RunTicket`] back to its driver.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tunesmith_core::config::GeneratorConfig;
use tunesmith_core::generation::{
    AlertKind, GeneratedAudio, GenerationError, GenerationFailure, RequestParameters,
};
use tunesmith_core::presentation::{NavigationSignal, OfferReason, PresentationState};
use tunesmith_core::quota::QuotaPolicy;
use tunesmith_core::settings::{LongWaitNoticeStore, UsageCounter};

use super::run::{LifecyclePhase, LifecycleRun, RunId, RunOutcome};

const TARGET: &str = "tunesmith::lifecycle";

/// Work the driver performs for an accepted submission.
#[derive(Debug)]
pub struct RunTicket {
    pub run_id: RunId,
    /// Normalized parameters for the backend.
    pub params: RequestParameters,
    /// When the long-wait fallback fires.
    pub deadline: Instant,
    /// Cancelled as soon as the run resolves or is superseded.
    pub timer: CancellationToken,
}

/// What happened to a backend result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultDisposition {
    /// Success surfaced; result screen requested.
    Shown,
    /// Success arrived with nothing waiting for it.
    Dropped,
    /// Failure surfaced as an alert.
    Alerted(AlertKind),
    /// Result for a superseded or already resolved run.
    Stale,
}

/// What happened to a timer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutDisposition {
    /// First-ever timeout: long-wait notice shown and remembered.
    NoticeShown,
    /// Notice seen before: user routed to the library.
    MovedToBackground,
    /// Timer for a resolved, cancelled, superseded or already timed-out run.
    Ignored,
}

/// Tuning knobs, usually taken from [`GeneratorConfig`].
#[derive(Debug, Clone, Copy)]
pub struct LifecycleSettings {
    pub quota: QuotaPolicy,
    pub long_wait_timeout: Duration,
}

impl From<&GeneratorConfig> for LifecycleSettings {
    fn from(config: &GeneratorConfig) -> Self {
        Self {
            quota: config.quota_policy(),
            long_wait_timeout: config.long_wait_timeout(),
        }
    }
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self::from(&GeneratorConfig::default())
    }
}

/// The request lifecycle.
///
/// `Idle → Submitting → AwaitingResult → {Succeeded, Failed}`. Only one run is
/// tracked; a new submission supersedes the previous one and disarms its timer.
pub struct GenerationLifecycle {
    settings: LifecycleSettings,
    usage: Arc<dyn UsageCounter>,
    notices: Arc<dyn LongWaitNoticeStore>,
    presentation: watch::Sender<PresentationState>,
    navigation: mpsc::UnboundedSender<NavigationSignal>,
    phase: LifecyclePhase,
    next_run_id: RunId,
    active_run: Option<LifecycleRun>,
}

impl GenerationLifecycle {
    /// Creates a lifecycle.
    ///
    /// # Arguments
    ///
    /// * `settings` - Quota and timeout configuration
    /// * `usage` - Today's usage counter, incremented per accepted submission
    /// * `notices` - Persisted long-wait flag
    /// * `navigation` - Where navigation signals are delivered
    /// * `is_full_version` - Entitlement at construction time
    pub fn new(
        settings: LifecycleSettings,
        usage: Arc<dyn UsageCounter>,
        notices: Arc<dyn LongWaitNoticeStore>,
        navigation: mpsc::UnboundedSender<NavigationSignal>,
        is_full_version: bool,
    ) -> Self {
        let (presentation, _) = watch::channel(PresentationState::new(is_full_version));
        Self {
            settings,
            usage,
            notices,
            presentation,
            navigation,
            phase: LifecyclePhase::Idle,
            next_run_id: RunId::default(),
            active_run: None,
        }
    }

    /// Read-only view of the presentation state for the view layer.
    pub fn subscribe(&self) -> watch::Receiver<PresentationState> {
        self.presentation.subscribe()
    }

    pub fn presentation(&self) -> PresentationState {
        *self.presentation.borrow()
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    pub fn active_run(&self) -> Option<&LifecycleRun> {
        self.active_run.as_ref()
    }

    /// Audio of the active run, once it succeeded.
    pub fn generated_audio(&self) -> Option<&GeneratedAudio> {
        match self.active_run.as_ref().map(LifecycleRun::outcome) {
            Some(RunOutcome::Succeeded(audio)) => Some(audio),
            _ => None,
        }
    }

    /// Validates, checks the quota and starts a run.
    ///
    /// # Returns
    ///
    /// - `Ok(RunTicket)`: Run started; the driver must call the backend and arm the timer
    /// - `Err(GenerationError::EmptyInput)`: Blank prompt, empty-prompt flag set
    /// - `Err(GenerationError::QuotaExceeded)`: Upgrade offer emitted
    pub async fn submit(
        &mut self,
        params: RequestParameters,
    ) -> std::result::Result<RunTicket, GenerationError> {
        self.phase = LifecyclePhase::Submitting;
        self.presentation
            .send_modify(PresentationState::clear_outcome_flags);

        let Some(params) = params.normalized() else {
            tracing::debug!(target: TARGET, "Rejected submission with empty prompt");
            self.presentation
                .send_modify(|state| state.is_empty_prompt_error = true);
            self.settle_rejected();
            return Err(GenerationError::EmptyInput);
        };

        let usage = match self.usage.generations_used_today().await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(target: TARGET, "Failed to read usage counter, assuming none: {}", e);
                0
            }
        };
        let unlimited = self.presentation.borrow().is_entitled_full_version;
        if !self.settings.quota.allow(usage, unlimited) {
            tracing::info!(
                target: TARGET,
                usage,
                limit = self.settings.quota.daily_free_limit(),
                "Daily free limit reached"
            );
            self.emit(NavigationSignal::PresentUpgradeOffer {
                reason: OfferReason::QuotaLimit,
            });
            self.settle_rejected();
            return Err(GenerationError::QuotaExceeded);
        }

        // Counted on acceptance so a queued submission sees this one.
        if let Err(e) = self.usage.record_generation().await {
            tracing::warn!(target: TARGET, "Failed to record generation usage: {}", e);
        }

        if let Some(previous) = self.active_run.take() {
            previous.cancel_timer();
            if previous.is_pending() {
                tracing::debug!(target: TARGET, run = %previous.id(), "Superseded pending run");
            }
        }

        let run_id = self.next_run_id;
        self.next_run_id = run_id.next();
        let run = LifecycleRun::start(run_id);
        let ticket = RunTicket {
            run_id,
            params,
            deadline: run.started_at() + self.settings.long_wait_timeout,
            timer: run.timer_token(),
        };
        self.active_run = Some(run);
        self.phase = LifecyclePhase::AwaitingResult;
        self.presentation.send_modify(PresentationState::start_waiting);

        tracing::info!(
            target: TARGET,
            run = %run_id,
            genre = %ticket.params.genre,
            mood = %ticket.params.mood,
            duration = %ticket.params.duration,
            "Generation submitted"
        );
        Ok(ticket)
    }

    /// Handles the backend completion for `run_id`.
    pub fn handle_result(
        &mut self,
        run_id: RunId,
        result: std::result::Result<GeneratedAudio, GenerationFailure>,
    ) -> ResultDisposition {
        let elapsed = match self.active_run.as_ref() {
            Some(run) if run.id() == run_id => {
                // Disarm first so the timeout cannot act on a resolved run.
                run.cancel_timer();
                if !run.is_pending() {
                    return ResultDisposition::Stale;
                }
                run.started_at().elapsed()
            }
            _ => {
                tracing::debug!(target: TARGET, run = %run_id, "Ignoring result for inactive run");
                return ResultDisposition::Stale;
            }
        };

        match result {
            Ok(audio) => self.handle_success(audio, elapsed),
            Err(failure) => self.handle_failure(failure, elapsed),
        }
    }

    fn handle_success(&mut self, audio: GeneratedAudio, elapsed: Duration) -> ResultDisposition {
        self.resolve(RunOutcome::Succeeded(audio.clone()), LifecyclePhase::Succeeded);

        if !self.presentation.borrow().is_waiting_for_result() {
            tracing::debug!(
                target: TARGET,
                audio = %audio.id,
                "Dropping result: nothing is waiting for it"
            );
            return ResultDisposition::Dropped;
        }

        self.presentation.send_modify(|state| {
            state.clear_waiting();
            state.is_result_ready = true;
        });
        tracing::info!(target: TARGET, audio = %audio.id, elapsed_ms = elapsed.as_millis() as u64, "Generation ready");
        self.emit(NavigationSignal::NavigateToResult { audio });
        tracing::info!(target: "tunesmith::analytics", screen = "result", "Screen shown");
        ResultDisposition::Shown
    }

    fn handle_failure(&mut self, failure: GenerationFailure, elapsed: Duration) -> ResultDisposition {
        self.resolve(RunOutcome::Failed(failure.kind()), LifecyclePhase::Failed);

        let alert = failure.alert();
        if failure.is_unclassified() {
            tracing::warn!(target: TARGET, error = %failure, "Unclassified generation failure");
        } else {
            tracing::info!(
                target: TARGET,
                error = %GenerationError::from(&failure),
                elapsed_ms = elapsed.as_millis() as u64,
                "Generation failed"
            );
        }

        self.presentation.send_modify(|state| {
            state.clear_waiting();
            state.raise_alert(alert);
        });
        ResultDisposition::Alerted(alert)
    }

    /// Handles the timer for `run_id` firing.
    pub async fn handle_timeout(&mut self, run_id: RunId) -> TimeoutDisposition {
        match self.active_run.as_mut() {
            Some(run) if run.id() == run_id && run.accepts_timeout() => run.mark_timed_out(),
            _ => return TimeoutDisposition::Ignored,
        }
        tracing::info!(target: TARGET, run = %run_id, "{}", GenerationError::Timeout);

        let seen_before = match self.notices.has_shown_long_wait_notice().await {
            Ok(seen) => seen,
            Err(e) => {
                tracing::warn!(target: TARGET, "Failed to read long-wait flag: {}", e);
                false
            }
        };

        if seen_before {
            self.presentation.send_modify(|state| state.show_loader = false);
            self.emit(NavigationSignal::NavigateToLibraryBackground);
            return TimeoutDisposition::MovedToBackground;
        }

        self.presentation.send_modify(|state| {
            state.show_loader = false;
            state.show_long_wait_notice = true;
        });
        if let Err(e) = self.notices.mark_long_wait_notice_shown().await {
            tracing::warn!(target: TARGET, "Failed to persist long-wait flag: {}", e);
        }
        TimeoutDisposition::NoticeShown
    }

    /// Mirrors an entitlement update into the presentation state.
    pub fn set_entitlement(&mut self, is_full_version: bool) {
        self.presentation.send_if_modified(|state| {
            let changed = state.is_entitled_full_version != is_full_version;
            state.is_entitled_full_version = is_full_version;
            changed
        });
    }

    /// The prompt text changed; the empty-prompt highlight goes away.
    pub fn prompt_edited(&mut self) {
        self.presentation.send_if_modified(|state| {
            std::mem::replace(&mut state.is_empty_prompt_error, false)
        });
    }

    pub fn dismiss_alerts(&mut self) {
        self.presentation.send_if_modified(|state| {
            let had_alert = state.show_no_internet_alert || state.show_server_alert;
            state.show_no_internet_alert = false;
            state.show_server_alert = false;
            had_alert
        });
    }

    /// Closes the long-wait notice. A result arriving afterwards is dropped.
    pub fn dismiss_long_wait_notice(&mut self) {
        self.presentation.send_if_modified(|state| {
            std::mem::replace(&mut state.show_long_wait_notice, false)
        });
    }

    /// The result screen was left; the form is usable again.
    pub fn acknowledge_result(&mut self) {
        self.presentation
            .send_if_modified(|state| std::mem::replace(&mut state.is_result_ready, false));
    }

    /// Free generations left today, `None` when unlimited.
    pub async fn remaining_free_generations(&self) -> Option<u32> {
        let usage = self.usage.generations_used_today().await.unwrap_or(0);
        let unlimited = self.presentation.borrow().is_entitled_full_version;
        self.settings.quota.remaining(usage, unlimited)
    }

    /// Disarms the active run's timer. Used on teardown.
    pub fn cancel_pending(&mut self) {
        if let Some(run) = self.active_run.as_ref() {
            run.cancel_timer();
        }
    }

    /// Phase after a rejected submission: an in-flight run keeps waiting.
    fn settle_rejected(&mut self) {
        self.phase = match self.active_run.as_ref() {
            Some(run) if run.is_pending() => LifecyclePhase::AwaitingResult,
            _ => LifecyclePhase::Idle,
        };
    }

    fn resolve(&mut self, outcome: RunOutcome, phase: LifecyclePhase) {
        if let Some(run) = self.active_run.as_mut() {
            run.resolve(outcome);
        }
        self.phase = phase;
    }

    fn emit(&self, signal: NavigationSignal) {
        if self.navigation.send(signal).is_err() {
            tracing::debug!(target: TARGET, "Navigation receiver dropped");
        }
    }
}
