//! Candidate windows and clip plans produced by segment selection.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which heuristic produced a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WindowSource {
    /// Chosen from positive, high-confidence sentiment spans
    Sentiment,
    /// Chosen structurally, without sentiment signal
    Fallback,
}

impl WindowSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowSource::Sentiment => "sentiment",
            WindowSource::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for WindowSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A time window proposed for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CandidateWindow {
    /// Start time in seconds (inclusive)
    pub start: f64,
    /// End time in seconds (exclusive)
    pub end: f64,
    /// Engagement score, always 0 for fallback windows
    pub score: f64,
    pub source: WindowSource,
}

impl CandidateWindow {
    pub fn sentiment(start: f64, end: f64, score: f64) -> Self {
        Self {
            start,
            end,
            score,
            source: WindowSource::Sentiment,
        }
    }

    pub fn fallback(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            score: 0.0,
            source: WindowSource::Fallback,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    /// Whether two half-open windows share any time.
    pub fn overlaps(&self, other: &CandidateWindow) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Ordered, non-overlapping windows selected for rendering.
///
/// `source` tags how the plan was produced so callers can tell a degraded
/// (fallback) plan from a sentiment plan. It is `None` only for the empty plan.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ClipPlan {
    pub source: Option<WindowSource>,
    pub windows: Vec<CandidateWindow>,
}

impl ClipPlan {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Plan of sentiment windows, already ranked.
    pub fn sentiment(windows: Vec<CandidateWindow>) -> Self {
        Self::tagged(WindowSource::Sentiment, windows)
    }

    /// Plan of fallback windows in chronological order.
    pub fn fallback(windows: Vec<CandidateWindow>) -> Self {
        Self::tagged(WindowSource::Fallback, windows)
    }

    fn tagged(source: WindowSource, windows: Vec<CandidateWindow>) -> Self {
        if windows.is_empty() {
            return Self::empty();
        }
        Self {
            source: Some(source),
            windows,
        }
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn is_fallback(&self) -> bool {
        self.source == Some(WindowSource::Fallback)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CandidateWindow> {
        self.windows.iter()
    }
}

impl<'a> IntoIterator for &'a ClipPlan {
    type Item = &'a CandidateWindow;
    type IntoIter = std::slice::Iter<'a, CandidateWindow>;

    fn into_iter(self) -> Self::IntoIter {
        self.windows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_windows_give_untagged_plan() {
        let plan = ClipPlan::sentiment(Vec::new());
        assert!(plan.is_empty());
        assert_eq!(plan.source, None);
    }

    #[test]
    fn test_window_overlap_is_half_open() {
        let a = CandidateWindow::fallback(0.0, 10.0);
        let b = CandidateWindow::fallback(10.0, 20.0);
        let c = CandidateWindow::sentiment(9.0, 12.0, 0.8);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(b.overlaps(&c));
    }

    #[test]
    fn test_plan_serialization() {
        let plan = ClipPlan::fallback(vec![CandidateWindow::fallback(0.0, 15.0)]);
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["source"], "fallback");
        assert_eq!(json["windows"][0]["score"], 0.0);
        assert!(plan.is_fallback());
    }
}
