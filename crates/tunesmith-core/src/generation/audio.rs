use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::params::{Duration, Genre, Mood, RequestParameters};

/// A finished generation as returned by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedAudio {
    pub id: String,
    pub prompt: String,
    pub genre: Genre,
    pub mood: Mood,
    pub duration: Duration,
    /// Location of the rendered audio (URL or local path).
    pub audio_ref: String,
}

impl GeneratedAudio {
    /// Builds the artifact for `params` with a fresh identifier.
    pub fn for_request(params: &RequestParameters, audio_ref: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), params, audio_ref)
    }

    pub fn with_id(
        id: impl Into<String>,
        params: &RequestParameters,
        audio_ref: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            prompt: params.prompt.clone(),
            genre: params.genre,
            mood: params.mood,
            duration: params.duration,
            audio_ref: audio_ref.into(),
        }
    }
}
