//! Failure taxonomy for generation runs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Network failure kinds reported by a generation backend.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    #[error("not connected to the internet")]
    NotConnectedToInternet,
    #[error("generation server unavailable")]
    ServerUnavailable,
    #[error("invalid server response (status {code})")]
    InvalidServerResponse { code: u16 },
    #[error("unknown network error: {0}")]
    Unknown(String),
}

/// Everything a backend can hand back instead of audio.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationFailure {
    #[error(transparent)]
    Network(#[from] FailureKind),
    /// Non-network failure inside the client (decoding, local IO, ...).
    #[error("local failure: {0}")]
    Local(String),
}

impl GenerationFailure {
    pub fn local(detail: impl Into<String>) -> Self {
        Self::Local(detail.into())
    }

    /// Picks the alert the presentation layer shows for this failure.
    ///
    /// Only a missing connection gets its own alert; every other failure,
    /// including unrecognized and local ones, falls back to the server alert.
    pub fn alert(&self) -> AlertKind {
        match self {
            Self::Network(FailureKind::NotConnectedToInternet) => AlertKind::NoInternet,
            Self::Network(FailureKind::ServerUnavailable)
            | Self::Network(FailureKind::InvalidServerResponse { .. }) => AlertKind::Server,
            Self::Network(FailureKind::Unknown(_)) | Self::Local(_) => AlertKind::Server,
        }
    }

    /// Failures that carry detail worth logging beyond the alert itself.
    pub fn is_unclassified(&self) -> bool {
        matches!(
            self,
            Self::Network(FailureKind::Unknown(_)) | Self::Local(_)
        )
    }

    /// The kind recorded on a failed run. Local failures are reported as
    /// unknown network failures carrying their detail.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Network(kind) => kind.clone(),
            Self::Local(detail) => FailureKind::Unknown(detail.clone()),
        }
    }
}

/// Alert surfaced for a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertKind {
    NoInternet,
    Server,
}

/// Outcome taxonomy of a submission as seen by callers of the lifecycle.
///
/// `EmptyInput` and `QuotaExceeded` are local and never reach a backend;
/// `Timeout` is a soft degradation and is never shown as an alert.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationError {
    #[error("prompt is empty")]
    EmptyInput,
    #[error("daily free generation limit reached")]
    QuotaExceeded,
    #[error("network unavailable")]
    NetworkUnavailable,
    #[error("server error: {0}")]
    ServerError(String),
    #[error("generation is taking longer than expected")]
    Timeout,
}

impl From<&GenerationFailure> for GenerationError {
    fn from(failure: &GenerationFailure) -> Self {
        match failure.alert() {
            AlertKind::NoInternet => Self::NetworkUnavailable,
            AlertKind::Server => Self::ServerError(failure.to_string()),
        }
    }
}
