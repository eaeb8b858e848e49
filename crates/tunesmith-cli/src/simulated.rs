//! Local stand-in for the generation server.

use async_trait::async_trait;
use clap::ValueEnum;
use std::time::Duration;
use tunesmith_core::generation::{
    FailureKind, GeneratedAudio, GenerationBackend, GenerationFailure, RequestParameters,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SimulatedFailure {
    NoInternet,
    Server,
    Unknown,
}

impl SimulatedFailure {
    fn failure(self) -> GenerationFailure {
        match self {
            Self::NoInternet => FailureKind::NotConnectedToInternet.into(),
            Self::Server => FailureKind::ServerUnavailable.into(),
            Self::Unknown => FailureKind::Unknown("connection reset by peer".into()).into(),
        }
    }
}

/// Answers every request after a fixed delay.
pub struct SimulatedBackend {
    delay: Duration,
    failure: Option<SimulatedFailure>,
}

impl SimulatedBackend {
    pub fn new(delay: Duration, failure: Option<SimulatedFailure>) -> Self {
        Self { delay, failure }
    }
}

#[async_trait]
impl GenerationBackend for SimulatedBackend {
    async fn generate(
        &self,
        params: RequestParameters,
    ) -> Result<GeneratedAudio, GenerationFailure> {
        tracing::debug!(delay_secs = self.delay.as_secs(), "Simulating generation");
        tokio::time::sleep(self.delay).await;
        if let Some(failure) = self.failure {
            return Err(failure.failure());
        }
        let slug: String = params
            .prompt
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
            .collect();
        Ok(GeneratedAudio::for_request(
            &params,
            format!("simulated://{slug}-{}s.wav", params.duration.seconds()),
        ))
    }
}
