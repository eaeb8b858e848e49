//! Request lifecycle for music generation.
//!
//! # Module Structure
//!
//! - `run`: Per-submission run record and identifiers
//! - `machine`: The state machine (`GenerationLifecycle`)
//! - `service`: The single-context event loop that drives it

mod machine;
mod run;
mod service;

pub use machine::{
    GenerationLifecycle, LifecycleSettings, ResultDisposition, RunTicket, TimeoutDisposition,
};
pub use run::{LifecyclePhase, LifecycleRun, RunId, RunOutcome};
pub use service::{LifecycleError, LifecycleEvent, LifecycleService, UiContext};
