//! Domain layer for Tunesmith.
//!
//! Models, collaborator traits and pure policies shared by the infrastructure
//! and application crates.

pub mod config;
pub mod entitlement;
pub mod error;
pub mod generation;
pub mod presentation;
pub mod quota;
pub mod settings;

// Re-export common error type
pub use error::TunesmithError;
