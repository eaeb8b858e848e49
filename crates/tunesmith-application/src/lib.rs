//! Application layer for Tunesmith.
//!
//! Coordinates the domain collaborators into the generation use case: the
//! form a view edits and the lifecycle that turns a submission into a result,
//! an alert, a long-wait notice or a background hand-off.

pub mod form;
pub mod lifecycle;

pub use form::GenerationForm;
pub use lifecycle::{GenerationLifecycle, LifecycleService};
