//! Auto-generated chapters of a transcript.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A titled section of the video, as summarized by the transcription service.
///
/// Chapters are descriptive only. They never influence which windows are
/// selected; rendered clips carry the headline of the chapter they fall in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Chapter {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    pub headline: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
}

impl Chapter {
    pub fn new(start: f64, end: f64, headline: impl Into<String>) -> Self {
        Self {
            start,
            end,
            headline: headline.into(),
            summary: String::new(),
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Whether `time` falls in `[start, end)`.
    pub fn contains(&self, time: f64) -> bool {
        self.start <= time && time < self.end
    }
}
