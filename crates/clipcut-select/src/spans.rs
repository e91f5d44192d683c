//! Grouping of qualifying sentences into scored spans.

use clipcut_models::{Sentence, Sentiment, Transcript};

use crate::config::SelectionConfig;

/// Durations at or below this are treated as zero.
pub(crate) const EPSILON: f64 = 1e-9;

/// A run of qualifying sentences close enough to clip together.
#[derive(Debug, Clone, PartialEq)]
pub struct Span<'a> {
    /// Start of the first member sentence
    pub start: f64,
    /// End of the last member sentence
    pub end: f64,
    /// Duration-weighted mean confidence of the members
    pub score: f64,
    pub members: Vec<&'a Sentence>,
}

impl<'a> Span<'a> {
    fn open(sentence: &'a Sentence) -> Self {
        Self {
            start: sentence.start,
            end: sentence.end,
            score: 0.0,
            members: vec![sentence],
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    fn finish(mut self) -> Self {
        self.score = weighted_confidence(&self.members);
        self
    }
}

/// Positive sentences at or above the confidence threshold.
pub fn qualifying_sentences<'a>(
    transcript: &'a Transcript,
    config: &'a SelectionConfig,
) -> impl Iterator<Item = &'a Sentence> + 'a {
    transcript.sentences.iter().filter(move |s| {
        s.sentiment == Sentiment::Positive && s.confidence >= config.min_confidence
    })
}

/// Group time-ordered sentences into spans.
///
/// A sentence joins the current span when the gap from the previous member's
/// end to its start is at most `join_gap_secs`.
pub fn group_spans<'a>(
    sentences: impl IntoIterator<Item = &'a Sentence>,
    join_gap_secs: f64,
) -> Vec<Span<'a>> {
    let mut spans = Vec::new();
    let mut current: Option<Span<'a>> = None;

    for sentence in sentences {
        current = match current.take() {
            Some(mut span) if sentence.start - span.end <= join_gap_secs + EPSILON => {
                span.end = span.end.max(sentence.end);
                span.members.push(sentence);
                Some(span)
            }
            Some(span) => {
                spans.push(span.finish());
                Some(Span::open(sentence))
            }
            None => Some(Span::open(sentence)),
        };
    }

    if let Some(span) = current {
        spans.push(span.finish());
    }

    spans
}

/// Mean confidence weighted by sentence duration.
///
/// Falls back to the plain mean when every member is zero-length.
fn weighted_confidence(members: &[&Sentence]) -> f64 {
    if members.is_empty() {
        return 0.0;
    }

    let total: f64 = members.iter().map(|s| s.duration()).sum();
    if total <= EPSILON {
        return members.iter().map(|s| s.confidence).sum::<f64>() / members.len() as f64;
    }

    members.iter().map(|s| s.confidence * s.duration()).sum::<f64>() / total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positive(start: f64, end: f64, confidence: f64) -> Sentence {
        Sentence::new(start, end, "").with_sentiment(Sentiment::Positive, confidence)
    }

    #[test]
    fn test_group_joins_small_gaps() {
        let sentences = vec![
            positive(0.0, 4.0, 0.8),
            positive(5.5, 8.0, 0.9),
            positive(12.0, 14.0, 0.75),
        ];

        let spans = group_spans(&sentences, 2.0);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].members.len(), 2);
        assert!((spans[0].start - 0.0).abs() < 0.001);
        assert!((spans[0].end - 8.0).abs() < 0.001);
        assert_eq!(spans[1].members.len(), 1);
    }

    #[test]
    fn test_gap_equal_to_threshold_joins() {
        let sentences = vec![positive(0.0, 3.0, 0.8), positive(5.0, 6.0, 0.8)];
        assert_eq!(group_spans(&sentences, 2.0).len(), 1);
    }

    #[test]
    fn test_score_is_duration_weighted() {
        let sentences = vec![positive(0.0, 9.0, 1.0), positive(9.0, 10.0, 0.0)];
        let spans = group_spans(&sentences, 2.0);
        assert!((spans[0].score - 0.9).abs() < 0.001);
    }

    #[test]
    fn test_zero_length_members_use_plain_mean() {
        let sentences = vec![positive(3.0, 3.0, 0.8), positive(3.0, 3.0, 1.0)];
        let spans = group_spans(&sentences, 2.0);
        assert!((spans[0].score - 0.9).abs() < 0.001);
    }

    #[test]
    fn test_qualifying_filter() {
        let transcript = Transcript::new(
            vec![
                positive(0.0, 2.0, 0.69),
                positive(2.0, 4.0, 0.7),
                Sentence::new(4.0, 6.0, "").with_sentiment(Sentiment::Negative, 0.99),
                Sentence::new(6.0, 8.0, ""),
            ],
            8.0,
        );
        let config = SelectionConfig::default();
        let picked: Vec<_> = qualifying_sentences(&transcript, &config).collect();
        assert_eq!(picked.len(), 1);
        assert!((picked[0].start - 2.0).abs() < 0.001);
    }

    #[test]
    fn test_empty_input() {
        assert!(group_spans(std::iter::empty(), 2.0).is_empty());
    }
}
