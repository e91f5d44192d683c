//! Configuration for clip window selection.
//!
//! Every threshold the selector and the fallback segmenter use lives here.
//! The defaults match short-form vertical clips of about half a minute.

use serde::{Deserialize, Serialize};

use crate::error::{SelectionError, SelectionResult};

/// Tunable parameters for sentiment selection and fallback segmentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Target (and maximum) clip length in seconds.
    pub clip_duration_secs: f64,

    /// Maximum number of windows in a plan.
    pub max_clips: usize,

    /// Minimum sentiment confidence (0.0-1.0) for a positive sentence to qualify.
    pub min_confidence: f64,

    /// Shortest sentiment window worth rendering, in seconds.
    ///
    /// A fitted window that cannot reach this length (because neighbours or
    /// the transcript edges leave no room) is dropped. Transcripts shorter
    /// than this value only need to be covered entirely.
    pub min_sentiment_window_secs: f64,

    /// Largest gap in seconds between two qualifying sentences that still
    /// joins them into one span.
    pub join_gap_secs: f64,

    /// Seconds at the start of the video the fallback avoids (intros).
    pub lead_in_secs: f64,

    /// Seconds at the end of the video the fallback avoids (outros).
    pub lead_out_secs: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            clip_duration_secs: 30.0,
            max_clips: 5,
            min_confidence: 0.7,
            min_sentiment_window_secs: 5.0,
            join_gap_secs: 2.0,
            lead_in_secs: 5.0,
            lead_out_secs: 5.0,
        }
    }
}

impl SelectionConfig {
    /// Builder-style setter for the clip duration.
    pub fn with_clip_duration(mut self, secs: f64) -> Self {
        self.clip_duration_secs = secs;
        self
    }

    /// Builder-style setter for the maximum clip count.
    pub fn with_max_clips(mut self, max_clips: usize) -> Self {
        self.max_clips = max_clips;
        self
    }

    /// Builder-style setter for the confidence threshold, clamped to [0, 1].
    pub fn with_min_confidence(mut self, confidence: f64) -> Self {
        self.min_confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Builder-style setter for the minimum sentiment window.
    pub fn with_min_sentiment_window(mut self, secs: f64) -> Self {
        self.min_sentiment_window_secs = secs;
        self
    }

    /// Builder-style setter for the join gap.
    pub fn with_join_gap(mut self, secs: f64) -> Self {
        self.join_gap_secs = secs;
        self
    }

    /// Builder-style setter for both fallback margins.
    pub fn with_margins(mut self, lead_in_secs: f64, lead_out_secs: f64) -> Self {
        self.lead_in_secs = lead_in_secs;
        self.lead_out_secs = lead_out_secs;
        self
    }

    /// Reject configurations the selector cannot honour.
    pub fn validate(&self) -> SelectionResult<()> {
        let non_negative = |name: &str, value: f64| {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(SelectionError::invalid_config(format!(
                    "{} must be a finite non-negative number, got {}",
                    name, value
                )))
            }
        };

        if !(self.clip_duration_secs.is_finite() && self.clip_duration_secs > 0.0) {
            return Err(SelectionError::invalid_config(format!(
                "clip_duration_secs must be positive, got {}",
                self.clip_duration_secs
            )));
        }
        if self.max_clips == 0 {
            return Err(SelectionError::invalid_config("max_clips must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(SelectionError::invalid_config(format!(
                "min_confidence must be within [0, 1], got {}",
                self.min_confidence
            )));
        }
        non_negative("min_sentiment_window_secs", self.min_sentiment_window_secs)?;
        non_negative("join_gap_secs", self.join_gap_secs)?;
        non_negative("lead_in_secs", self.lead_in_secs)?;
        non_negative("lead_out_secs", self.lead_out_secs)?;

        if self.min_sentiment_window_secs > self.clip_duration_secs {
            return Err(SelectionError::invalid_config(format!(
                "min_sentiment_window_secs ({}) exceeds clip_duration_secs ({})",
                self.min_sentiment_window_secs, self.clip_duration_secs
            )));
        }

        Ok(())
    }
}
