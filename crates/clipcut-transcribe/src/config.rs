//! Client configuration.

use std::time::Duration;

use crate::error::{TranscribeError, TranscribeResult};

pub const DEFAULT_BASE_URL: &str = "https://api.assemblyai.com/v2";

/// Configuration for the AssemblyAI client.
#[derive(Debug, Clone)]
pub struct TranscribeConfig {
    /// API root, without a trailing slash
    pub base_url: String,
    pub api_key: String,
    /// Delay between status polls
    pub poll_interval: Duration,
    /// Polls before giving up on a transcript
    pub max_polls: u32,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Retries for retryable failures
    pub max_retries: u32,
}

impl Default for TranscribeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            poll_interval: Duration::from_secs(5),
            max_polls: 60,
            request_timeout: Duration::from_secs(300),
            max_retries: 3,
        }
    }
}

impl TranscribeConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("ASSEMBLYAI_BASE_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            api_key: std::env::var("ASSEMBLYAI_API_KEY").unwrap_or_default(),
            poll_interval: std::env::var("ASSEMBLYAI_POLL_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.poll_interval),
            max_polls: std::env::var("ASSEMBLYAI_MAX_POLLS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_polls),
            ..defaults
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_polling(mut self, interval: Duration, max_polls: u32) -> Self {
        self.poll_interval = interval;
        self.max_polls = max_polls;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn validate(&self) -> TranscribeResult<()> {
        if !self.has_api_key() {
            return Err(TranscribeError::MissingApiKey);
        }
        Ok(())
    }
}
