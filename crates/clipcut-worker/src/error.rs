//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

/// Message shown when no clip could be rendered.
pub const NO_CLIPS_MESSAGE: &str = "Failed to create any clips. Please try another video.";

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Please enter a valid YouTube URL")]
    InvalidUrl(String),

    #[error("{}", NO_CLIPS_MESSAGE)]
    NoClips,

    #[error("Job timed out after {0} seconds")]
    Timeout(u64),

    #[error("Processing was cancelled")]
    Cancelled,

    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Media error: {0}")]
    Media(#[from] clipcut_media::MediaError),

    #[error("Transcription error: {0}")]
    Transcribe(#[from] clipcut_transcribe::TranscribeError),

    #[error("Selection error: {0}")]
    Selection(#[from] clipcut_select::SelectionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn job_failed(msg: impl Into<String>) -> Self {
        Self::JobFailed(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Message stored on the task record.
    pub fn user_message(&self) -> String {
        match self {
            WorkerError::InvalidUrl(_) | WorkerError::NoClips => self.to_string(),
            other => format!("Error: {}", other),
        }
    }

    /// Check if this is a permanent failure that should NOT be retried.
    ///
    /// yt-dlp reports inaccessible videos (private, removed, region or age
    /// restricted) in its error text.
    pub fn is_permanent_failure(&self) -> bool {
        if matches!(self, WorkerError::InvalidUrl(_) | WorkerError::NoClips) {
            return true;
        }

        let msg = self.to_string().to_lowercase();
        msg.contains("private video")
            || msg.contains("video unavailable")
            || msg.contains("video has been removed")
            || msg.contains("not available in your country")
            || (msg.contains("age") && msg.contains("restrict"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert_eq!(
            WorkerError::InvalidUrl("x".into()).user_message(),
            "Please enter a valid YouTube URL"
        );
        assert_eq!(WorkerError::NoClips.user_message(), NO_CLIPS_MESSAGE);
        assert_eq!(
            WorkerError::Timeout(60).user_message(),
            "Error: Job timed out after 60 seconds"
        );
        assert_eq!(
            WorkerError::Cancelled.user_message(),
            "Error: Processing was cancelled"
        );
    }

    #[test]
    fn test_permanent_failure() {
        let err = WorkerError::Media(clipcut_media::MediaError::download_failed(
            "yt-dlp failed: ERROR: [youtube] abc: Private video",
        ));
        assert!(err.is_permanent_failure());
        assert!(!WorkerError::Timeout(10).is_permanent_failure());
    }
}
