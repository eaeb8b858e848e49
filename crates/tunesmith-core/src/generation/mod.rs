//! Generation domain module.
//!
//! # Module Structure
//!
//! - `params`: Form inputs (`Genre`, `Mood`, `Duration`, `RequestParameters`)
//! - `audio`: The finished artifact (`GeneratedAudio`)
//! - `failure`: Failure taxonomy and alert classification
//! - `backend`: Trait for the remote generation call

mod audio;
mod backend;
mod failure;
mod params;

pub use audio::GeneratedAudio;
pub use backend::GenerationBackend;
pub use failure::{AlertKind, FailureKind, GenerationError, GenerationFailure};
pub use params::{Duration, Genre, Mood, RequestParameters};
