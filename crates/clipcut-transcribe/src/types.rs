//! AssemblyAI request/response types and the mapping to [`Transcript`].

use serde::{Deserialize, Serialize};

use clipcut_models::{Chapter, Sentence, Sentiment, Transcript};

/// Response from `POST /upload`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub upload_url: String,
}

/// Body of `POST /transcript`.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptRequest {
    pub audio_url: String,
    pub sentiment_analysis: bool,
    pub auto_chapters: bool,
}

impl TranscriptRequest {
    pub fn new(audio_url: impl Into<String>) -> Self {
        Self {
            audio_url: audio_url.into(),
            sentiment_analysis: true,
            auto_chapters: true,
        }
    }
}

/// Transcript job state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptStatus {
    Queued,
    Processing,
    Completed,
    Error,
}

/// Sentiment result for one sentence; times in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentResult {
    pub text: String,
    pub start: u64,
    pub end: u64,
    pub sentiment: String,
    #[serde(default)]
    pub confidence: f64,
}

/// Word timing; times in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub start: u64,
    pub end: u64,
    #[serde(default)]
    pub confidence: f64,
}

/// Auto chapter; times in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterResult {
    pub start: u64,
    pub end: u64,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub gist: String,
    #[serde(default)]
    pub summary: String,
}

/// Response from `POST /transcript` and `GET /transcript/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptResponse {
    pub id: String,
    pub status: TranscriptStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Audio length in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<Word>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment_analysis_results: Option<Vec<SentimentResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapters: Option<Vec<ChapterResult>>,
}

impl TranscriptResponse {
    /// Build a [`Transcript`] that satisfies the transcript invariants.
    ///
    /// Sentiment results are used when present; otherwise words are grouped
    /// into unlabelled sentences at terminal punctuation. Results are sorted
    /// and overlaps are clamped away. Chapters are carried along as metadata,
    /// headed by their headline (or gist when the headline is blank).
    pub fn to_transcript(&self) -> Transcript {
        let mut sentences: Vec<Sentence> = match self.sentiment_analysis_results.as_deref() {
            Some(results) if !results.is_empty() => results
                .iter()
                .map(|r| {
                    Sentence::new(ms_to_secs(r.start), ms_to_secs(r.end), r.text.trim())
                        .with_sentiment(Sentiment::from_label(&r.sentiment), r.confidence)
                })
                .collect(),
            _ => group_words(self.words.as_deref().unwrap_or_default()),
        };

        sentences.sort_by(|a, b| a.start.total_cmp(&b.start));

        let last_end = sentences.iter().map(|s| s.end).fold(0.0_f64, f64::max);
        let duration = self
            .audio_duration
            .filter(|d| d.is_finite() && *d > 0.0)
            .map_or(last_end, |d| d.max(last_end));

        let mut prev_end = 0.0_f64;
        for sentence in &mut sentences {
            sentence.start = sentence.start.max(prev_end);
            sentence.end = sentence.end.max(sentence.start);
            sentence.confidence = if sentence.confidence.is_finite() {
                sentence.confidence.clamp(0.0, 1.0)
            } else {
                0.0
            };
            prev_end = sentence.end;
        }

        Transcript::new(sentences, duration).with_chapters(self.collect_chapters(duration))
    }

    fn collect_chapters(&self, duration: f64) -> Vec<Chapter> {
        let mut chapters: Vec<Chapter> = self
            .chapters
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(|c| {
                let headline = if c.headline.trim().is_empty() {
                    c.gist.trim()
                } else {
                    c.headline.trim()
                };
                let start = ms_to_secs(c.start).min(duration);
                let end = ms_to_secs(c.end).min(duration);
                (end > start)
                    .then(|| Chapter::new(start, end, headline).with_summary(c.summary.trim()))
            })
            .collect();
        chapters.sort_by(|a, b| a.start.total_cmp(&b.start));
        chapters
    }
}

fn ms_to_secs(ms: u64) -> f64 {
    ms as f64 / 1000.0
}

/// Group words into sentences ending at `.`, `?` or `!`.
fn group_words(words: &[Word]) -> Vec<Sentence> {
    let mut sentences = Vec::new();
    let mut current: Vec<&Word> = Vec::new();

    for word in words {
        current.push(word);
        if word.text.ends_with(['.', '?', '!']) {
            sentences.push(sentence_from_words(&current));
            current.clear();
        }
    }
    if !current.is_empty() {
        sentences.push(sentence_from_words(&current));
    }

    sentences
}

fn sentence_from_words(words: &[&Word]) -> Sentence {
    let start = words.first().map_or(0, |w| w.start);
    let end = words.last().map_or(0, |w| w.end);
    let text = words
        .iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    Sentence::new(ms_to_secs(start), ms_to_secs(end), text)
}
