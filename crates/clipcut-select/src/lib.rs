//! Clip window selection for ClipCut.
//!
//! This crate provides:
//! - Sentiment selection: positive, confident sentences grouped into spans,
//!   fitted to the clip length and ranked by score
//! - Fallback segmentation: evenly spaced, sentence-aligned windows used when
//!   no sentiment span qualifies
//! - [`SelectionConfig`]: every threshold both heuristics use
//!
//! # Flow
//!
//! ```text
//! ┌────────────┐    ┌──────────────┐  empty   ┌──────────────┐
//! │ Transcript │───►│  Sentiment   │─────────►│   Fallback   │
//! │ (validated)│    │  selection   │          │ segmentation │
//! └────────────┘    └──────┬───────┘          └──────┬───────┘
//!                          │ ClipPlan (sentiment)    │ ClipPlan (fallback)
//!                          ▼                         ▼
//! ```
//!
//! Everything here is pure and synchronous. Each call works on its own
//! transcript and config, so it can run on any number of tasks at once.

pub mod config;
pub mod error;
pub mod fallback;
pub mod selector;
pub mod spans;

use clipcut_models::{ClipPlan, Transcript};
use tracing::{debug, info};

pub use config::SelectionConfig;
pub use error::{SelectionError, SelectionResult};
pub use fallback::fallback_segments;
pub use selector::select_sentiment_windows;
pub use spans::{group_spans, Span};

/// Build the clip plan for a transcript.
///
/// Tries sentiment selection first and degrades to fallback segmentation
/// when nothing qualifies. The returned plan's `source` tells which one ran.
/// An empty transcript gives the empty plan. Malformed transcripts are
/// rejected with [`SelectionError::InvalidTranscript`] before any work.
pub fn select_clips(transcript: &Transcript, config: &SelectionConfig) -> SelectionResult<ClipPlan> {
    config.validate()?;
    transcript.validate()?;

    if transcript.is_empty() {
        debug!("Empty transcript, nothing to segment");
        return Ok(ClipPlan::empty());
    }

    let windows = select_sentiment_windows(transcript, config);
    if !windows.is_empty() {
        info!(
            clips = windows.len(),
            top_score = windows[0].score,
            "Selected clips from sentiment"
        );
        return Ok(ClipPlan::sentiment(windows));
    }

    let plan = fallback_segments(transcript, config);
    info!(
        clips = plan.len(),
        duration = transcript.duration,
        "No qualifying sentiment, using fallback segmentation"
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipcut_models::{Sentence, Sentiment, TranscriptError, WindowSource};

    #[test]
    fn test_sentiment_plan_tagged() {
        let transcript = Transcript::new(
            vec![
                Sentence::new(0.0, 5.0, "great").with_sentiment(Sentiment::Positive, 0.9),
                Sentence::new(5.0, 40.0, "meh").with_sentiment(Sentiment::Neutral, 0.9),
            ],
            40.0,
        );
        let plan = select_clips(&transcript, &SelectionConfig::default()).unwrap();
        assert_eq!(plan.source, Some(WindowSource::Sentiment));
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SelectionConfig::default().with_max_clips(0);
        let result = select_clips(&Transcript::default(), &config);
        assert!(matches!(result, Err(SelectionError::InvalidConfig(_))));
    }

    #[test]
    fn test_invalid_transcript_carries_index() {
        let transcript = Transcript::new(
            vec![Sentence::new(0.0, 5.0, "a"), Sentence::new(9.0, 6.0, "b")],
            10.0,
        );
        let err = select_clips(&transcript, &SelectionConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            SelectionError::InvalidTranscript(TranscriptError::InvalidSentence { index: 1, .. })
        ));
    }
}
