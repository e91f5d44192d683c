//! Transcription client error types.

use thiserror::Error;

pub type TranscribeResult<T> = Result<T, TranscribeError>;

#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("ASSEMBLYAI_API_KEY is not set")]
    MissingApiKey,

    #[error("Transcription service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Transcript not ready after {0} polls")]
    PollTimeout(u32),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TranscribeError {
    /// Whether the failed request may succeed if sent again.
    pub fn is_retryable(&self) -> bool {
        match self {
            TranscribeError::ServiceUnavailable(_) => true,
            TranscribeError::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable() {
        assert!(TranscribeError::ServiceUnavailable("503".into()).is_retryable());
        assert!(!TranscribeError::RequestFailed("400".into()).is_retryable());
        assert!(!TranscribeError::TranscriptionFailed("bad audio".into()).is_retryable());
        assert!(!TranscribeError::MissingApiKey.is_retryable());
    }
}
