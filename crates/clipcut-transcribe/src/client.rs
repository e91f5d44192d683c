//! AssemblyAI HTTP client.

use std::path::Path;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use clipcut_models::Transcript;

use crate::config::TranscribeConfig;
use crate::error::{TranscribeError, TranscribeResult};
use crate::types::{TranscriptRequest, TranscriptResponse, TranscriptStatus, UploadResponse};

/// Client for the AssemblyAI transcription API.
pub struct AssemblyAiClient {
    http: Client,
    config: TranscribeConfig,
}

impl AssemblyAiClient {
    /// Create a new client. Fails without an API key.
    pub fn new(config: TranscribeConfig) -> TranscribeResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(TranscribeError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> TranscribeResult<Self> {
        Self::new(TranscribeConfig::from_env())
    }

    pub fn config(&self) -> &TranscribeConfig {
        &self.config
    }

    /// Upload a local audio file and return its private URL.
    pub async fn upload(&self, path: impl AsRef<Path>) -> TranscribeResult<String> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let url = format!("{}/upload", self.config.base_url);

        info!(
            file = %path.display(),
            size_kb = data.len() / 1024,
            "Uploading audio for transcription"
        );

        let upload: UploadResponse = self
            .with_retry(|| async {
                let response = self
                    .http
                    .post(&url)
                    .header("authorization", &self.config.api_key)
                    .body(data.clone())
                    .send()
                    .await?;
                parse_json(response).await
            })
            .await?;

        debug!(upload_url = %upload.upload_url, "Audio uploaded");
        Ok(upload.upload_url)
    }

    /// Request a transcript with sentiment analysis. Returns the transcript id.
    pub async fn submit(&self, audio_url: &str) -> TranscribeResult<String> {
        let url = format!("{}/transcript", self.config.base_url);
        let request = TranscriptRequest::new(audio_url);

        let response: TranscriptResponse = self
            .with_retry(|| async {
                let response = self
                    .http
                    .post(&url)
                    .header("authorization", &self.config.api_key)
                    .json(&request)
                    .send()
                    .await?;
                parse_json(response).await
            })
            .await?;

        info!(transcript_id = %response.id, "Transcription requested");
        Ok(response.id)
    }

    /// Fetch the current state of a transcript.
    pub async fn fetch(&self, transcript_id: &str) -> TranscribeResult<TranscriptResponse> {
        let url = format!("{}/transcript/{}", self.config.base_url, transcript_id);

        self.with_retry(|| async {
            let response = self
                .http
                .get(&url)
                .header("authorization", &self.config.api_key)
                .send()
                .await?;
            parse_json(response).await
        })
        .await
    }

    /// Poll until the transcript completes, fails, or the poll budget runs out.
    pub async fn poll(&self, transcript_id: &str) -> TranscribeResult<TranscriptResponse> {
        for attempt in 1..=self.config.max_polls {
            let response = self.fetch(transcript_id).await?;

            match response.status {
                TranscriptStatus::Completed => {
                    info!(transcript_id, polls = attempt, "Transcription completed");
                    return Ok(response);
                }
                TranscriptStatus::Error => {
                    return Err(TranscribeError::TranscriptionFailed(
                        response
                            .error
                            .unwrap_or_else(|| "unknown transcription error".to_string()),
                    ));
                }
                TranscriptStatus::Queued | TranscriptStatus::Processing => {
                    debug!(transcript_id, attempt, status = ?response.status, "Transcript not ready");
                    if attempt < self.config.max_polls {
                        tokio::time::sleep(self.config.poll_interval).await;
                    }
                }
            }
        }

        Err(TranscribeError::PollTimeout(self.config.max_polls))
    }

    /// Upload, submit and poll; returns the raw completed response.
    pub async fn transcribe_response(&self, audio_path: impl AsRef<Path>) -> TranscribeResult<TranscriptResponse> {
        let audio_url = self.upload(audio_path).await?;
        let transcript_id = self.submit(&audio_url).await?;
        self.poll(&transcript_id).await
    }

    /// Transcribe a local audio file.
    pub async fn transcribe(&self, audio_path: impl AsRef<Path>) -> TranscribeResult<Transcript> {
        let response = self.transcribe_response(audio_path).await?;
        Ok(response.to_transcript())
    }

    /// Like [`transcribe`](Self::transcribe), reusing a completed response
    /// cached at `cache_path` and writing one there after a fresh run.
    pub async fn transcribe_cached(
        &self,
        audio_path: impl AsRef<Path>,
        cache_path: impl AsRef<Path>,
    ) -> TranscribeResult<Transcript> {
        let cache_path = cache_path.as_ref();

        if let Some(cached) = read_cached(cache_path).await {
            info!(cache = %cache_path.display(), "Using cached transcript");
            return Ok(cached.to_transcript());
        }

        let response = self.transcribe_response(audio_path).await?;
        let json = serde_json::to_vec_pretty(&response)?;
        if let Err(e) = tokio::fs::write(cache_path, json).await {
            warn!(cache = %cache_path.display(), "Failed to cache transcript: {}", e);
        }

        Ok(response.to_transcript())
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> TranscribeResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = TranscribeResult<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                    warn!(
                        "AssemblyAI request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| TranscribeError::RequestFailed("Unknown error".to_string())))
    }
}

/// Map the status code to an error, then decode the JSON body.
async fn parse_json<T: DeserializeOwned>(response: Response) -> TranscribeResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = format!("AssemblyAI returned {}: {}", status, body);
        return Err(if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            TranscribeError::ServiceUnavailable(message)
        } else {
            TranscribeError::RequestFailed(message)
        });
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| TranscribeError::InvalidResponse(e.to_string()))
}

/// A completed response from the cache file, if there is a usable one.
async fn read_cached(path: &Path) -> Option<TranscriptResponse> {
    let bytes = tokio::fs::read(path).await.ok()?;
    match serde_json::from_slice::<TranscriptResponse>(&bytes) {
        Ok(response) if response.status == TranscriptStatus::Completed => Some(response),
        Ok(_) => None,
        Err(e) => {
            warn!(cache = %path.display(), "Ignoring unreadable transcript cache: {}", e);
            None
        }
    }
}
