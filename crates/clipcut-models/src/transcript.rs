//! Transcript of one video: ordered sentences plus total duration.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chapter::Chapter;
use crate::sentence::{Sentence, Sentiment};

/// A transcript that breaks the ordering or range invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TranscriptError {
    #[error("transcript duration must be a finite non-negative number, got {0}")]
    InvalidDuration(f64),

    #[error("sentence {index}: {reason}")]
    InvalidSentence { index: usize, reason: String },
}

impl TranscriptError {
    fn sentence(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidSentence {
            index,
            reason: reason.into(),
        }
    }
}

/// Time-ordered, non-overlapping sentences of one video.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Transcript {
    /// Sentences ordered by start time
    pub sentences: Vec<Sentence>,
    /// Total media duration in seconds
    pub duration: f64,
    /// Chapters ordered by start time; metadata only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chapters: Vec<Chapter>,
}

impl Transcript {
    pub fn new(sentences: Vec<Sentence>, duration: f64) -> Self {
        Self {
            sentences,
            duration,
            chapters: Vec::new(),
        }
    }

    pub fn with_chapters(mut self, chapters: Vec<Chapter>) -> Self {
        self.chapters = chapters;
        self
    }

    /// The chapter covering `time`, if any.
    pub fn chapter_at(&self, time: f64) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.contains(time))
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    /// Structural transcript for media that could not be transcribed.
    ///
    /// Splits `[0, duration]` into back-to-back `step`-second sentences with
    /// no text and no sentiment.
    pub fn uniform(duration: f64, step: f64) -> Self {
        if !(duration.is_finite() && duration > 0.0) || !(step.is_finite() && step > 0.0) {
            return Self::new(Vec::new(), duration.max(0.0));
        }

        let mut sentences = Vec::new();
        let mut start = 0.0;
        while start < duration {
            let end = (start + step).min(duration);
            sentences.push(Sentence::new(start, end, ""));
            start = end;
        }
        Self::new(sentences, duration)
    }

    /// Cap the transcript at `max_duration` seconds.
    ///
    /// Sentences and chapters starting at or after the cap are dropped, and
    /// the last kept ones are clamped to end at the cap.
    pub fn truncated(mut self, max_duration: f64) -> Self {
        if self.duration <= max_duration {
            return self;
        }
        self.sentences.retain(|s| s.start < max_duration);
        if let Some(last) = self.sentences.last_mut() {
            last.end = last.end.min(max_duration);
        }
        self.chapters.retain(|c| c.start < max_duration);
        for chapter in &mut self.chapters {
            chapter.end = chapter.end.min(max_duration);
        }
        self.duration = max_duration;
        self
    }

    /// Sentences sharing any time with `[start, end)`.
    pub fn sentences_in(&self, start: f64, end: f64) -> impl Iterator<Item = &Sentence> {
        self.sentences.iter().filter(move |s| s.overlaps(start, end))
    }

    /// Whether any sentence carries sentiment data.
    pub fn has_sentiment(&self) -> bool {
        self.sentences
            .iter()
            .any(|s| s.sentiment != Sentiment::Unknown)
    }

    /// Check ordering, range and confidence invariants.
    pub fn validate(&self) -> Result<(), TranscriptError> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(TranscriptError::InvalidDuration(self.duration));
        }

        let mut prev_end: Option<f64> = None;
        for (index, s) in self.sentences.iter().enumerate() {
            if !s.start.is_finite() || !s.end.is_finite() {
                return Err(TranscriptError::sentence(index, "timestamps must be finite"));
            }
            if s.start < 0.0 {
                return Err(TranscriptError::sentence(
                    index,
                    format!("start {:.3}s is negative", s.start),
                ));
            }
            if s.end < s.start {
                return Err(TranscriptError::sentence(
                    index,
                    format!("end {:.3}s is before start {:.3}s", s.end, s.start),
                ));
            }
            if !(0.0..=1.0).contains(&s.confidence) {
                return Err(TranscriptError::sentence(
                    index,
                    format!("confidence {} is outside [0, 1]", s.confidence),
                ));
            }
            if s.end > self.duration {
                return Err(TranscriptError::sentence(
                    index,
                    format!(
                        "end {:.3}s exceeds transcript duration {:.3}s",
                        s.end, self.duration
                    ),
                ));
            }
            if let Some(prev) = prev_end {
                if s.start < prev {
                    return Err(TranscriptError::sentence(
                        index,
                        format!(
                            "start {:.3}s overlaps previous sentence ending at {:.3}s",
                            s.start, prev
                        ),
                    ));
                }
            }
            prev_end = Some(s.end);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript() -> Transcript {
        Transcript::new(
            vec![
                Sentence::new(0.0, 4.0, "one"),
                Sentence::new(4.5, 9.0, "two").with_sentiment(Sentiment::Positive, 0.8),
                Sentence::new(9.0, 12.0, "three"),
            ],
            12.0,
        )
    }

    #[test]
    fn test_validate_ok() {
        assert!(transcript().validate().is_ok());
        assert!(Transcript::default().validate().is_ok());
    }

    #[test]
    fn test_validate_end_before_start() {
        let mut t = transcript();
        t.sentences[1].end = 3.0;
        let err = t.validate().unwrap_err();
        assert!(matches!(err, TranscriptError::InvalidSentence { index: 1, .. }));
    }

    #[test]
    fn test_validate_confidence_range() {
        let mut t = transcript();
        t.sentences[2].confidence = 1.5;
        assert!(matches!(
            t.validate(),
            Err(TranscriptError::InvalidSentence { index: 2, .. })
        ));
    }

    #[test]
    fn test_validate_overlap_and_range() {
        let mut t = transcript();
        t.sentences[2].start = 8.0;
        assert!(t.validate().is_err());

        let mut t = transcript();
        t.duration = 10.0;
        assert!(t.validate().is_err());

        let mut t = transcript();
        t.duration = f64::NAN;
        assert!(matches!(t.validate(), Err(TranscriptError::InvalidDuration(_))));
    }

    #[test]
    fn test_uniform() {
        let t = Transcript::uniform(12.0, 5.0);
        assert_eq!(t.len(), 3);
        assert_eq!(t.sentences[2].start, 10.0);
        assert_eq!(t.sentences[2].end, 12.0);
        assert!(!t.has_sentiment());
        assert!(t.validate().is_ok());

        assert!(Transcript::uniform(0.0, 5.0).is_empty());
    }

    #[test]
    fn test_truncated() {
        let t = transcript().truncated(6.0);
        assert_eq!(t.len(), 2);
        assert_eq!(t.sentences[1].end, 6.0);
        assert_eq!(t.duration, 6.0);
        assert!(t.validate().is_ok());
    }

    #[test]
    fn test_chapter_lookup_and_truncation() {
        let t = transcript().with_chapters(vec![
            Chapter::new(0.0, 4.5, "Intro"),
            Chapter::new(4.5, 12.0, "Main point").with_summary("The speaker explains."),
        ]);
        assert_eq!(t.chapter_at(2.0).map(|c| c.headline.as_str()), Some("Intro"));
        assert_eq!(t.chapter_at(4.5).map(|c| c.headline.as_str()), Some("Main point"));
        assert!(t.chapter_at(12.0).is_none());

        let capped = t.truncated(3.0);
        assert_eq!(capped.chapters.len(), 1);
        assert_eq!(capped.chapters[0].end, 3.0);
    }

    #[test]
    fn test_chapters_optional_in_json() {
        let json = serde_json::to_value(transcript()).unwrap();
        assert!(json.get("chapters").is_none());

        let parsed: Transcript =
            serde_json::from_value(serde_json::json!({"sentences": [], "duration": 5.0})).unwrap();
        assert!(parsed.chapters.is_empty());
    }

    #[test]
    fn test_sentences_in() {
        let t = transcript();
        let texts: Vec<&str> = t.sentences_in(3.0, 9.0).map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two"]);
    }
}
