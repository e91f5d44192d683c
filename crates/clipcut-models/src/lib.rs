//! Shared data models for the ClipCut pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Transcripts, sentiment-annotated sentences and chapters
//! - Candidate windows and clip plans
//! - Task status records polled by clients
//! - Timestamp formatting and YouTube URL parsing

pub mod chapter;
pub mod plan;
pub mod sentence;
pub mod task;
pub mod timestamp;
pub mod transcript;
pub mod utils;

// Re-export common types
pub use chapter::Chapter;
pub use plan::{CandidateWindow, ClipPlan, WindowSource};
pub use sentence::{Sentence, Sentiment};
pub use task::{ClipInfo, TaskId, TaskRecord, TaskStatus};
pub use transcript::{Transcript, TranscriptError};
pub use utils::{extract_youtube_id, is_youtube_url, YoutubeIdError, YoutubeIdResult};
