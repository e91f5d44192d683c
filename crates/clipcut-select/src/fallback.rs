//! Structural fallback segmentation.
//!
//! Used when no sentiment span survives selection. Windows are placed at
//! evenly spaced anchors and snapped back to sentence starts so clips never
//! open mid-sentence.

use clipcut_models::{CandidateWindow, ClipPlan, Transcript};
use tracing::debug;

use crate::config::SelectionConfig;
use crate::spans::EPSILON;

/// Evenly spaced, sentence-aligned windows without sentiment signal.
///
/// Never fails. Transcripts with no sentences or zero duration give the
/// empty plan; transcripts shorter than one clip give a single window
/// covering all of it.
pub fn fallback_segments(transcript: &Transcript, config: &SelectionConfig) -> ClipPlan {
    let duration = transcript.duration;
    let clip = config.clip_duration_secs;

    if transcript.is_empty() || duration <= EPSILON {
        return ClipPlan::empty();
    }

    if duration < clip {
        return ClipPlan::fallback(vec![CandidateWindow::fallback(0.0, duration)]);
    }

    let (lead_in, lead_out) = if config.lead_in_secs + config.lead_out_secs + clip > duration {
        (0.0, 0.0)
    } else {
        (config.lead_in_secs, config.lead_out_secs)
    };
    let usable = duration - lead_in - lead_out;
    let slots = (config.max_clips + 1) as f64;

    let mut windows: Vec<CandidateWindow> = Vec::with_capacity(config.max_clips);
    let mut floor = 0.0_f64;

    for k in 1..=config.max_clips {
        let anchor = (lead_in + usable * k as f64 / slots).max(floor);

        let Some(start) = snap_start(transcript, anchor, floor) else {
            break;
        };
        let end = (start + clip).min(duration);
        if end - start <= EPSILON {
            break;
        }

        debug!(anchor, start, end, "Placed fallback window");
        windows.push(CandidateWindow::fallback(start, end));
        floor = end;
    }

    // Only the last window can be cut short by the transcript end.
    let truncated = windows
        .last()
        .is_some_and(|w| w.duration() + EPSILON < clip);
    if truncated {
        if let Some(full) = pull_back(transcript, &windows, clip) {
            debug!(clips = full.len(), "Pulled fallback windows back to full length");
            return ClipPlan::fallback(full);
        }

        let min_len = config.min_sentiment_window_secs.min(clip);
        if windows.len() > 1 && windows.last().is_some_and(|w| w.duration() + EPSILON < min_len) {
            debug!("Dropping fallback window below minimum length");
            windows.pop();
        }
    }

    ClipPlan::fallback(windows)
}

/// Re-place `windows` right to left so each one gets the full clip length.
///
/// Every window moves back to the latest sentence start that leaves `clip`
/// seconds before the next window (or the transcript end). Windows only ever
/// move earlier, so order and sentence alignment are kept. Returns `None`
/// when some window finds no such sentence start.
fn pull_back(
    transcript: &Transcript,
    windows: &[CandidateWindow],
    clip: f64,
) -> Option<Vec<CandidateWindow>> {
    let mut hi = transcript.duration;
    let mut placed = Vec::with_capacity(windows.len());

    for window in windows.iter().rev() {
        let bound = window.start.min(hi - clip);
        let start = transcript
            .sentences
            .iter()
            .map(|s| s.start)
            .take_while(|&start| start <= bound + EPSILON)
            .last()?;
        let end = (start + clip).min(hi);
        placed.push(CandidateWindow::fallback(start, end));
        hi = start;
    }

    placed.reverse();
    Some(placed)
}

/// Latest sentence start in `[floor, anchor]`, else the first one after `floor`.
fn snap_start(transcript: &Transcript, anchor: f64, floor: f64) -> Option<f64> {
    let mut starts = transcript
        .sentences
        .iter()
        .map(|s| s.start)
        .filter(|&start| start >= floor);

    let first = starts.next()?;
    if first > anchor {
        return Some(first);
    }

    Some(starts.take_while(|&start| start <= anchor).last().unwrap_or(first))
}
