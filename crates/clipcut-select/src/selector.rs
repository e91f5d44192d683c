//! Sentiment-driven window selection.
//!
//! Spans of positive, confident speech are ranked by score and greedily
//! placed into the plan. Each accepted span is fitted to the clip length:
//! short spans grow into the free time around them, long spans shrink to
//! their densest sub-window.

use clipcut_models::{CandidateWindow, Transcript};
use tracing::debug;

use crate::config::SelectionConfig;
use crate::spans::{group_spans, qualifying_sentences, Span, EPSILON};

/// Ranked, non-overlapping sentiment windows for `transcript`.
///
/// Returns an empty list when no span survives; the caller decides whether
/// to fall back. Assumes a validated transcript and config.
pub fn select_sentiment_windows(
    transcript: &Transcript,
    config: &SelectionConfig,
) -> Vec<CandidateWindow> {
    let mut spans = group_spans(
        qualifying_sentences(transcript, config),
        config.join_gap_secs,
    );
    if spans.is_empty() {
        return Vec::new();
    }

    rank_spans(&mut spans);

    let min_len = config.min_sentiment_window_secs.min(transcript.duration);
    let mut chosen: Vec<CandidateWindow> = Vec::with_capacity(config.max_clips);

    for span in &spans {
        if chosen.len() >= config.max_clips {
            break;
        }

        if chosen
            .iter()
            .any(|w| span.start < w.end && w.start < span.end)
        {
            debug!(
                span_start = span.start,
                span_end = span.end,
                "Skipping span overlapping a selected window"
            );
            continue;
        }

        let Some((start, end)) = fit_window(span, transcript.duration, &chosen, config) else {
            continue;
        };

        let len = end - start;
        if len <= EPSILON || len + EPSILON < min_len {
            debug!(
                span_start = span.start,
                window_secs = len,
                min_secs = min_len,
                "Dropping window below minimum length"
            );
            continue;
        }

        chosen.push(CandidateWindow::sentiment(start, end, span.score));
    }

    chosen
}

/// Score descending, earlier start first on ties.
fn rank_spans(spans: &mut [Span<'_>]) {
    spans.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.start.total_cmp(&b.start))
    });
}

/// Fit a span to the clip length inside the free time around it.
fn fit_window(
    span: &Span<'_>,
    duration: f64,
    chosen: &[CandidateWindow],
    config: &SelectionConfig,
) -> Option<(f64, f64)> {
    let clip = config.clip_duration_secs;

    if span.duration() > clip + EPSILON {
        let start = densest_start(span, clip);
        return Some((start, (start + clip).min(span.end)));
    }

    // Free time between the neighbouring selected windows.
    let lo = chosen
        .iter()
        .filter(|w| w.end <= span.start)
        .map(|w| w.end)
        .fold(0.0_f64, f64::max);
    let hi = chosen
        .iter()
        .filter(|w| w.start >= span.end)
        .map(|w| w.start)
        .fold(duration, f64::min);
    if hi < lo {
        return None;
    }

    let room_left = (span.start - lo).max(0.0);
    let room_right = (hi - span.end).max(0.0);
    let need = clip - span.duration();

    let mut left = (need / 2.0).min(room_left);
    let mut right = (need / 2.0).min(room_right);

    // Room one side cannot use goes to the other.
    let spare = need - left - right;
    if spare > EPSILON {
        let extra_left = spare.min(room_left - left);
        left += extra_left;
        right += (spare - extra_left).min(room_right - right);
    }

    let start = (span.start - left).max(lo);
    let end = (span.end + right).min(hi);
    Some((start, end))
}

/// Start of the `clip`-long sub-window holding the most member confidence.
///
/// Members count in proportion to how much of them the sub-window covers.
/// Candidates start at member starts or end at member ends; ties keep the
/// earliest start.
fn densest_start(span: &Span<'_>, clip: f64) -> f64 {
    let latest = span.end - clip;
    let mut candidates: Vec<f64> = span
        .members
        .iter()
        .flat_map(|s| [s.start, s.end - clip])
        .map(|c| c.clamp(span.start, latest))
        .collect();
    candidates.sort_by(f64::total_cmp);
    candidates.dedup_by(|a, b| (*a - *b).abs() <= EPSILON);

    let mut best_start = span.start;
    let mut best_density = f64::NEG_INFINITY;
    for start in candidates {
        let density = window_density(span, start, start + clip);
        if density > best_density + EPSILON {
            best_density = density;
            best_start = start;
        }
    }
    best_start
}

fn window_density(span: &Span<'_>, start: f64, end: f64) -> f64 {
    span.members
        .iter()
        .map(|s| {
            let len = s.duration();
            if len <= EPSILON {
                if s.start >= start && s.start <= end {
                    s.confidence
                } else {
                    0.0
                }
            } else {
                s.confidence * s.overlap_secs(start, end) / len
            }
        })
        .sum()
}
