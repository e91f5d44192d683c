//! Task status records for submitted videos.
//!
//! A task is one download, transcribe, select and render run for a single
//! YouTube URL. Records are polled by clients while the pipeline runs.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::plan::{CandidateWindow, WindowSource};

/// Progress milestones reported while a task runs.
pub mod progress {
    pub const DOWNLOADING: u8 = 10;
    pub const UPLOADING_AUDIO: u8 = 20;
    pub const TRANSCRIBING: u8 = 30;
    pub const FINDING_MOMENTS: u8 = 40;
    pub const CREATING_CLIPS: u8 = 50;
    pub const DONE: u8 = 100;

    /// Progress once `rendered` clips' worth of encoding out of `total` is
    /// done. Fractions count partially encoded clips.
    pub fn clips_rendered(rendered: f64, total: usize) -> u8 {
        if total == 0 || !rendered.is_finite() {
            return CREATING_CLIPS;
        }
        let span = f64::from(DONE - CREATING_CLIPS);
        let step = (rendered.clamp(0.0, total as f64) * span / total as f64).floor();
        CREATING_CLIPS + step as u8
    }
}

/// Unique identifier for a task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Generate a new random task ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Processing,
    Completed,
    Error,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Processing => "processing",
            TaskStatus::Completed => "completed",
            TaskStatus::Error => "error",
        }
    }

    /// Check if this is a terminal state (no more updates expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Error)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A rendered clip as reported to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClipInfo {
    /// 1-based position in the clip plan
    pub id: usize,
    /// File name relative to the output directory
    pub filename: String,
    /// Start time in the source video (seconds)
    pub start_time: f64,
    /// Clip duration (seconds)
    pub duration: f64,
    /// Transcript text spoken in the clip
    pub text: String,
    pub source: WindowSource,
    pub score: f64,
    /// Headline of the chapter the clip falls in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
}

impl ClipInfo {
    pub fn from_window(
        id: usize,
        filename: impl Into<String>,
        window: &CandidateWindow,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id,
            filename: filename.into(),
            start_time: window.start,
            duration: window.duration(),
            text: text.into(),
            source: window.source,
            score: window.score,
            chapter: None,
        }
    }

    pub fn with_chapter(mut self, headline: impl Into<String>) -> Self {
        self.chapter = Some(headline.into());
        self
    }
}

/// Status record of one task.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TaskRecord {
    pub task_id: TaskId,
    /// Submitted YouTube URL
    pub url: String,
    pub status: TaskStatus,
    /// Human readable description of the current step or outcome
    pub message: String,
    /// Progress percentage (0-100)
    pub progress: u8,
    #[serde(default)]
    pub clips: Vec<ClipInfo>,
    /// How the clip plan was produced, once selection ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_source: Option<WindowSource>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskRecord {
    pub fn new(task_id: TaskId, url: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            task_id,
            url: url.into(),
            status: TaskStatus::Processing,
            message: "Starting process...".to_string(),
            progress: 0,
            clips: Vec::new(),
            plan_source: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Update progress and the step message.
    pub fn set_progress(&mut self, progress: u8, message: impl Into<String>) {
        self.progress = progress.min(100);
        self.message = message.into();
        self.updated_at = Utc::now();
    }

    /// Mark the task as completed with its clips.
    pub fn complete(&mut self, clips: Vec<ClipInfo>, message: impl Into<String>) {
        self.status = TaskStatus::Completed;
        self.progress = progress::DONE;
        self.clips = clips;
        self.message = message.into();
        self.updated_at = Utc::now();
    }

    /// Mark the task as failed. Progress resets to 0.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = TaskStatus::Error;
        self.progress = 0;
        self.message = error.into();
        self.updated_at = Utc::now();
    }
}
