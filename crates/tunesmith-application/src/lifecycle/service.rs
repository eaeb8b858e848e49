//! Single-context driver for [`GenerationLifecycle`].
//!
//! Every mutation of the lifecycle (user commands, backend completions, timer
//! firings, entitlement updates) is funnelled through one event channel and
//! applied by one task. Backend calls and timers run on their own tasks and
//! only ever talk back by dispatching events.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tunesmith_core::entitlement::EntitlementProvider;
use tunesmith_core::generation::{
    GeneratedAudio, GenerationBackend, GenerationError, GenerationFailure, RequestParameters,
};
use tunesmith_core::presentation::PresentationState;

use super::machine::{GenerationLifecycle, RunTicket};
use super::run::RunId;

const TARGET: &str = "tunesmith::lifecycle";

/// Errors returned to callers of [`LifecycleService`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error(transparent)]
    Rejected(#[from] GenerationError),
    #[error("generation lifecycle has shut down")]
    Closed,
}

/// Everything that can mutate the lifecycle.
#[derive(Debug)]
pub enum LifecycleEvent {
    Submit {
        params: RequestParameters,
        reply: Option<oneshot::Sender<Result<RunId, GenerationError>>>,
    },
    BackendResolved {
        run_id: RunId,
        result: Result<GeneratedAudio, GenerationFailure>,
    },
    TimeoutElapsed {
        run_id: RunId,
    },
    EntitlementChanged(bool),
    PromptEdited,
    DismissAlerts,
    DismissLongWaitNotice,
    AcknowledgeResult,
}

/// Handle for posting events onto the lifecycle context.
#[derive(Debug, Clone)]
pub struct UiContext {
    events: mpsc::UnboundedSender<LifecycleEvent>,
}

impl UiContext {
    /// Queues an event. Returns `false` once the context has shut down.
    pub fn dispatch(&self, event: LifecycleEvent) -> bool {
        self.events.send(event).is_ok()
    }
}

/// Running lifecycle plus the handles a view needs.
pub struct LifecycleService {
    context: UiContext,
    presentation: watch::Receiver<PresentationState>,
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

impl LifecycleService {
    /// Starts the lifecycle context on the current runtime.
    ///
    /// The entitlement subscription is held by the context and dropped on
    /// [`shutdown`](Self::shutdown).
    pub fn spawn(
        lifecycle: GenerationLifecycle,
        backend: Arc<dyn GenerationBackend>,
        entitlement: &dyn EntitlementProvider,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let context = UiContext { events: events_tx };
        let presentation = lifecycle.subscribe();
        let shutdown = CancellationToken::new();

        let driver = Driver {
            lifecycle,
            backend,
            context: context.clone(),
            entitlement: entitlement.subscribe(),
        };
        let task = tokio::spawn(driver.run(events_rx, shutdown.clone()));

        Self {
            context,
            presentation,
            shutdown,
            task,
        }
    }

    /// Queues a submission without waiting for it to be processed.
    pub fn submit(&self, params: RequestParameters) -> bool {
        self.context.dispatch(LifecycleEvent::Submit {
            params,
            reply: None,
        })
    }

    /// Submits a request and waits until the lifecycle accepted or rejected it.
    ///
    /// Acceptance only means a run started; the outcome arrives through the
    /// presentation state and navigation signals.
    pub async fn submit_and_confirm(
        &self,
        params: RequestParameters,
    ) -> Result<RunId, LifecycleError> {
        let (reply, rx) = oneshot::channel();
        if !self.context.dispatch(LifecycleEvent::Submit {
            params,
            reply: Some(reply),
        }) {
            return Err(LifecycleError::Closed);
        }
        rx.await
            .map_err(|_| LifecycleError::Closed)?
            .map_err(LifecycleError::from)
    }

    pub fn prompt_edited(&self) -> bool {
        self.context.dispatch(LifecycleEvent::PromptEdited)
    }

    pub fn dismiss_alerts(&self) -> bool {
        self.context.dispatch(LifecycleEvent::DismissAlerts)
    }

    pub fn dismiss_long_wait_notice(&self) -> bool {
        self.context.dispatch(LifecycleEvent::DismissLongWaitNotice)
    }

    pub fn acknowledge_result(&self) -> bool {
        self.context.dispatch(LifecycleEvent::AcknowledgeResult)
    }

    /// Read-only presentation state.
    pub fn presentation(&self) -> watch::Receiver<PresentationState> {
        self.presentation.clone()
    }

    pub fn context(&self) -> UiContext {
        self.context.clone()
    }

    /// Stops the context, disarms the pending timer and drops the
    /// entitlement subscription.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        if let Err(e) = self.task.await {
            tracing::warn!(target: TARGET, "Lifecycle task ended abnormally: {}", e);
        }
    }
}

struct Driver {
    lifecycle: GenerationLifecycle,
    backend: Arc<dyn GenerationBackend>,
    context: UiContext,
    entitlement: watch::Receiver<bool>,
}

impl Driver {
    async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<LifecycleEvent>,
        shutdown: CancellationToken,
    ) {
        let initial = *self.entitlement.borrow_and_update();
        self.lifecycle.set_entitlement(initial);
        let mut entitlement_open = true;

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => self.handle(event).await,
                    None => break,
                },
                changed = self.entitlement.changed(), if entitlement_open => match changed {
                    Ok(()) => {
                        let full_version = *self.entitlement.borrow_and_update();
                        self.lifecycle.set_entitlement(full_version);
                    }
                    Err(_) => {
                        debug!(target: TARGET, "Entitlement source closed");
                        entitlement_open = false;
                    }
                },
            }
        }

        self.lifecycle.cancel_pending();
        info!(target: TARGET, "Lifecycle context stopped");
    }

    async fn handle(&mut self, event: LifecycleEvent) {
        match event {
            LifecycleEvent::Submit { params, reply } => {
                let outcome = match self.lifecycle.submit(params).await {
                    Ok(ticket) => {
                        let run_id = ticket.run_id;
                        self.start(ticket);
                        Ok(run_id)
                    }
                    Err(e) => Err(e),
                };
                if let Some(reply) = reply {
                    let _ = reply.send(outcome);
                }
            }
            LifecycleEvent::BackendResolved { run_id, result } => {
                let disposition = self.lifecycle.handle_result(run_id, result);
                debug!(target: TARGET, run = %run_id, ?disposition, "Backend resolved");
            }
            LifecycleEvent::TimeoutElapsed { run_id } => {
                let disposition = self.lifecycle.handle_timeout(run_id).await;
                debug!(target: TARGET, run = %run_id, ?disposition, "Timer fired");
            }
            LifecycleEvent::EntitlementChanged(full_version) => {
                self.lifecycle.set_entitlement(full_version)
            }
            LifecycleEvent::PromptEdited => self.lifecycle.prompt_edited(),
            LifecycleEvent::DismissAlerts => self.lifecycle.dismiss_alerts(),
            LifecycleEvent::DismissLongWaitNotice => self.lifecycle.dismiss_long_wait_notice(),
            LifecycleEvent::AcknowledgeResult => self.lifecycle.acknowledge_result(),
        }
    }

    /// Launches the backend call and arms the long-wait timer for a run.
    fn start(&self, ticket: RunTicket) {
        let RunTicket {
            run_id,
            params,
            deadline,
            timer,
        } = ticket;

        let backend = self.backend.clone();
        let context = self.context.clone();
        tokio::spawn(async move {
            let result = backend.generate(params).await;
            context.dispatch(LifecycleEvent::BackendResolved { run_id, result });
        });

        let context = self.context.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = timer.cancelled() => {}
                _ = tokio::time::sleep_until(deadline) => {
                    context.dispatch(LifecycleEvent::TimeoutElapsed { run_id });
                }
            }
        });
    }
}
