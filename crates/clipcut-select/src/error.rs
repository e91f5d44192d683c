//! Selection error types.

use clipcut_models::TranscriptError;
use thiserror::Error;

/// Result type for selection operations.
pub type SelectionResult<T> = Result<T, SelectionError>;

/// Selection errors.
///
/// Finding no engaging content is not an error; it produces a fallback plan.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelectionError {
    #[error("Invalid transcript: {0}")]
    InvalidTranscript(#[from] TranscriptError),

    #[error("Invalid selection config: {0}")]
    InvalidConfig(String),
}

impl SelectionError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
