//! HttpGenerationBackend - REST implementation of the generation backend.
//!
//! Sends `POST {base}/generate` and maps transport and HTTP errors onto the
//! failure taxonomy the lifecycle classifies.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tunesmith_core::error::{Result, TunesmithError};
use tunesmith_core::generation::{
    FailureKind, GeneratedAudio, GenerationBackend, GenerationFailure, RequestParameters,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    genre: String,
    mood: String,
    duration_seconds: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    id: String,
    audio_url: String,
}

/// Backend that talks to the generation worker over HTTP.
#[derive(Clone)]
pub struct HttpGenerationBackend {
    client: Client,
    endpoint: Url,
}

impl HttpGenerationBackend {
    /// Creates a backend for `base_url` (defaults to [`DEFAULT_BASE_URL`]).
    pub fn new(base_url: Option<&str>) -> Result<Self> {
        let base = Url::parse(base_url.unwrap_or(DEFAULT_BASE_URL))
            .map_err(|e| TunesmithError::config(format!("invalid backend URL: {e}")))?;
        let endpoint = base
            .join("generate")
            .map_err(|e| TunesmithError::config(format!("invalid backend URL: {e}")))?;
        let client = Client::builder()
            .build()
            .map_err(|e| TunesmithError::internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl GenerationBackend for HttpGenerationBackend {
    async fn generate(
        &self,
        params: RequestParameters,
    ) -> std::result::Result<GeneratedAudio, GenerationFailure> {
        let body = GenerateRequest {
            prompt: &params.prompt,
            genre: params.genre.to_string(),
            mood: params.mood.to_string(),
            duration_seconds: params.duration.seconds(),
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %body_text, "Generation request rejected");
            return Err(map_http_status(status).into());
        }

        let parsed: GenerateResponse = response.json().await.map_err(|err| {
            GenerationFailure::local(format!("Failed to parse generation response: {err}"))
        })?;

        Ok(GeneratedAudio::with_id(parsed.id, &params, parsed.audio_url))
    }
}

fn map_transport_error(err: reqwest::Error) -> GenerationFailure {
    if err.is_connect() {
        FailureKind::NotConnectedToInternet.into()
    } else if let Some(status) = err.status() {
        map_http_status(status).into()
    } else {
        FailureKind::Unknown(err.to_string()).into()
    }
}

fn map_http_status(status: StatusCode) -> FailureKind {
    match status {
        StatusCode::SERVICE_UNAVAILABLE => FailureKind::ServerUnavailable,
        other => FailureKind::InvalidServerResponse {
            code: other.as_u16(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tunesmith_core::generation::{Duration, Genre, Mood};

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            map_http_status(StatusCode::SERVICE_UNAVAILABLE),
            FailureKind::ServerUnavailable
        );
        assert_eq!(
            map_http_status(StatusCode::UNPROCESSABLE_ENTITY),
            FailureKind::InvalidServerResponse { code: 422 }
        );
        assert_eq!(
            map_http_status(StatusCode::INTERNAL_SERVER_ERROR),
            FailureKind::InvalidServerResponse { code: 500 }
        );
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let backend = HttpGenerationBackend::new(Some("http://worker.local:9000/api/")).unwrap();
        assert_eq!(
            backend.endpoint().as_str(),
            "http://worker.local:9000/api/generate"
        );
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let err = HttpGenerationBackend::new(Some("not a url")).err().unwrap();
        assert!(err.is_config());
    }

    #[tokio::test]
    async fn test_unreachable_worker_is_not_connected() {
        // Port 9 (discard) on localhost is closed in test environments.
        let backend = HttpGenerationBackend::new(Some("http://127.0.0.1:9/")).unwrap();
        let params =
            RequestParameters::new("ambient", Genre::Ambient, Mood::Relaxed, Duration::TenSeconds);

        let failure = backend.generate(params).await.unwrap_err();
        assert_eq!(
            failure,
            GenerationFailure::Network(FailureKind::NotConnectedToInternet)
        );
    }

    #[test]
    fn test_request_body_shape() {
        let params = RequestParameters::new(
            "lofi beats",
            Genre::Lofi,
            Mood::Relaxed,
            Duration::ThirtySeconds,
        );
        let body = GenerateRequest {
            prompt: &params.prompt,
            genre: params.genre.to_string(),
            mood: params.mood.to_string(),
            duration_seconds: params.duration.seconds(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["genre"], "lofi");
        assert_eq!(json["mood"], "relaxed");
        assert_eq!(json["duration_seconds"], 30);
    }
}
