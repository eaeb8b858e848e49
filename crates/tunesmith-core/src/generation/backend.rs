//! Generation backend trait.

use async_trait::async_trait;

use super::audio::GeneratedAudio;
use super::failure::GenerationFailure;
use super::params::RequestParameters;

/// Performs the remote generation call.
///
/// Each call completes exactly once, with either the finished audio or a
/// failure. Implementations must not retry on their own; retrying is a user
/// decision.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generates audio for already-validated parameters.
    ///
    /// # Arguments
    ///
    /// * `params` - Parameters with a trimmed, non-empty prompt
    ///
    /// # Returns
    ///
    /// - `Ok(GeneratedAudio)`: Generation finished
    /// - `Err(GenerationFailure)`: Network or local failure
    async fn generate(
        &self,
        params: RequestParameters,
    ) -> std::result::Result<GeneratedAudio, GenerationFailure>;
}
