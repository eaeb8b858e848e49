//! Per-submission run record.

use std::fmt;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tunesmith_core::generation::{FailureKind, GeneratedAudio};

/// Monotonic identifier of a lifecycle run.
///
/// Backend results and timer events carry the id of the run that produced
/// them; events for any other run are stale and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId(u64);

impl RunId {
    pub fn value(&self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self(1)
    }
}

/// Coarse lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecyclePhase {
    #[default]
    Idle,
    Submitting,
    AwaitingResult,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Pending,
    Succeeded(GeneratedAudio),
    Failed(FailureKind),
}

/// State tracked for the active submission.
#[derive(Debug)]
pub struct LifecycleRun {
    id: RunId,
    started_at: Instant,
    timer: CancellationToken,
    timed_out: bool,
    outcome: RunOutcome,
}

impl LifecycleRun {
    pub(crate) fn start(id: RunId) -> Self {
        Self {
            id,
            started_at: Instant::now(),
            timer: CancellationToken::new(),
            timed_out: false,
            outcome: RunOutcome::Pending,
        }
    }

    pub fn id(&self) -> RunId {
        self.id
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn outcome(&self) -> &RunOutcome {
        &self.outcome
    }

    pub fn is_pending(&self) -> bool {
        self.outcome == RunOutcome::Pending
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// Token the timeout task waits on. Cancelling it disarms the timer.
    pub(crate) fn timer_token(&self) -> CancellationToken {
        self.timer.clone()
    }

    /// Disarms the timeout. Cancelling twice, or after it fired, is a no-op.
    pub(crate) fn cancel_timer(&self) {
        self.timer.cancel();
    }

    /// Whether a timer event for this run may still act.
    pub(crate) fn accepts_timeout(&self) -> bool {
        self.is_pending() && !self.timed_out && !self.timer.is_cancelled()
    }

    pub(crate) fn mark_timed_out(&mut self) {
        self.timed_out = true;
    }

    pub(crate) fn resolve(&mut self, outcome: RunOutcome) {
        self.outcome = outcome;
    }
}
