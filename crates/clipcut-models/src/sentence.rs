//! Sentence-level transcript units.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Sentiment label attached to a sentence by the transcription service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    /// No sentiment analysis was available for this sentence
    #[default]
    #[serde(other)]
    Unknown,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "POSITIVE",
            Sentiment::Negative => "NEGATIVE",
            Sentiment::Neutral => "NEUTRAL",
            Sentiment::Unknown => "UNKNOWN",
        }
    }

    /// Parse a service label, case-insensitively. Unrecognized labels map to `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "POSITIVE" => Sentiment::Positive,
            "NEGATIVE" => Sentiment::Negative,
            "NEUTRAL" => Sentiment::Neutral,
            _ => Sentiment::Unknown,
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A time-stamped sentence of speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Sentence {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Spoken text
    #[serde(default)]
    pub text: String,
    /// Sentiment label
    #[serde(default)]
    pub sentiment: Sentiment,
    /// Confidence of the sentiment label (0.0 - 1.0)
    #[serde(default)]
    pub confidence: f64,
}

impl Sentence {
    /// Create a sentence without sentiment annotation.
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            sentiment: Sentiment::Unknown,
            confidence: 0.0,
        }
    }

    /// Attach a sentiment label and its confidence.
    pub fn with_sentiment(mut self, sentiment: Sentiment, confidence: f64) -> Self {
        self.sentiment = sentiment;
        self.confidence = confidence;
        self
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether this sentence shares any time with `[start, end)`.
    pub fn overlaps(&self, start: f64, end: f64) -> bool {
        self.start < end && self.end > start
    }

    /// Seconds of this sentence covered by `[start, end]`.
    pub fn overlap_secs(&self, start: f64, end: f64) -> f64 {
        (self.end.min(end) - self.start.max(start)).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_from_label() {
        assert_eq!(Sentiment::from_label("POSITIVE"), Sentiment::Positive);
        assert_eq!(Sentiment::from_label("negative"), Sentiment::Negative);
        assert_eq!(Sentiment::from_label(" Neutral "), Sentiment::Neutral);
        assert_eq!(Sentiment::from_label("MIXED"), Sentiment::Unknown);
    }

    #[test]
    fn test_sentiment_serde_unknown_label() {
        let s: Sentiment = serde_json::from_str("\"SARCASTIC\"").unwrap();
        assert_eq!(s, Sentiment::Unknown);
        assert_eq!(serde_json::to_string(&Sentiment::Positive).unwrap(), "\"POSITIVE\"");
    }

    #[test]
    fn test_overlap() {
        let s = Sentence::new(5.0, 10.0, "hello");
        assert!(s.overlaps(8.0, 20.0));
        assert!(!s.overlaps(10.0, 20.0));
        assert!((s.overlap_secs(8.0, 20.0) - 2.0).abs() < 0.001);
        assert_eq!(s.overlap_secs(12.0, 20.0), 0.0);
    }
}
