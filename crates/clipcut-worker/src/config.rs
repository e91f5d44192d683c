//! Worker configuration.

use std::path::PathBuf;
use std::time::Duration;

use clipcut_select::SelectionConfig;
use clipcut_transcribe::TranscribeConfig;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Directory finished clips are written to
    pub output_dir: PathBuf,
    /// Directory for downloads, audio and transcript caches
    pub work_dir: PathBuf,
    /// Lower resolution and a faster encoder preset
    pub fast_mode: bool,
    /// Longest stretch of a video that is processed (seconds)
    pub max_video_duration: f64,
    /// Maximum concurrent jobs
    pub max_concurrent_jobs: usize,
    /// Maximum clips rendered in parallel within a single job
    pub max_parallel_renders: usize,
    /// Burn captions into rendered clips
    pub burn_subtitles: bool,
    /// Job timeout
    pub job_timeout: Duration,
    /// Timeout for a single FFmpeg invocation
    pub ffmpeg_timeout: Duration,
    /// Reuse downloads younger than this
    pub download_reuse_ttl: Duration,
    /// How long finished task records stay queryable
    pub task_ttl: Duration,
    pub selection: SelectionConfig,
    pub transcribe: TranscribeConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("clips_output"),
            work_dir: PathBuf::from("temp"),
            fast_mode: true,
            max_video_duration: 3600.0,
            max_concurrent_jobs: 2,
            max_parallel_renders: 3,
            burn_subtitles: true,
            job_timeout: Duration::from_secs(3600), // 1 hour
            ffmpeg_timeout: Duration::from_secs(600),
            download_reuse_ttl: Duration::from_secs(3600),
            task_ttl: crate::store::DEFAULT_TASK_TTL,
            selection: SelectionConfig::default(),
            transcribe: TranscribeConfig::default(),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let selection = SelectionConfig {
            clip_duration_secs: env_parse("CLIPCUT_CLIP_DURATION")
                .unwrap_or(defaults.selection.clip_duration_secs),
            max_clips: env_parse("CLIPCUT_MAX_CLIPS").unwrap_or(defaults.selection.max_clips),
            min_confidence: env_parse("CLIPCUT_MIN_CONFIDENCE")
                .unwrap_or(defaults.selection.min_confidence),
            min_sentiment_window_secs: env_parse("CLIPCUT_MIN_SENTIMENT_WINDOW")
                .unwrap_or(defaults.selection.min_sentiment_window_secs),
            join_gap_secs: env_parse("CLIPCUT_JOIN_GAP").unwrap_or(defaults.selection.join_gap_secs),
            lead_in_secs: env_parse("CLIPCUT_LEAD_IN").unwrap_or(defaults.selection.lead_in_secs),
            lead_out_secs: env_parse("CLIPCUT_LEAD_OUT").unwrap_or(defaults.selection.lead_out_secs),
        };

        Self {
            output_dir: std::env::var("CLIPCUT_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            work_dir: std::env::var("CLIPCUT_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            fast_mode: env_bool("CLIPCUT_FAST_MODE").unwrap_or(defaults.fast_mode),
            max_video_duration: env_parse("CLIPCUT_MAX_VIDEO_DURATION")
                .unwrap_or(defaults.max_video_duration),
            max_concurrent_jobs: env_parse("CLIPCUT_MAX_CONCURRENT_JOBS")
                .unwrap_or(defaults.max_concurrent_jobs),
            max_parallel_renders: env_parse("CLIPCUT_MAX_PARALLEL_RENDERS")
                .unwrap_or(defaults.max_parallel_renders),
            burn_subtitles: env_bool("CLIPCUT_BURN_SUBTITLES").unwrap_or(defaults.burn_subtitles),
            job_timeout: Duration::from_secs(
                env_parse("CLIPCUT_JOB_TIMEOUT_SECS").unwrap_or(3600),
            ),
            ffmpeg_timeout: Duration::from_secs(
                env_parse("CLIPCUT_FFMPEG_TIMEOUT_SECS").unwrap_or(600),
            ),
            download_reuse_ttl: defaults.download_reuse_ttl,
            task_ttl: env_parse("CLIPCUT_TASK_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.task_ttl),
            selection,
            transcribe: TranscribeConfig::from_env(),
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    pub fn with_max_concurrent_jobs(mut self, jobs: usize) -> Self {
        self.max_concurrent_jobs = jobs;
        self
    }

    pub fn with_transcribe(mut self, transcribe: TranscribeConfig) -> Self {
        self.transcribe = transcribe;
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key).ok().and_then(|s| parse_bool(&s))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = WorkerConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("clips_output"));
        assert_eq!(config.max_parallel_renders, 3);
        assert_eq!(config.selection.max_clips, 5);
        assert!((config.max_video_duration - 3600.0).abs() < 0.001);
        assert!(config.fast_mode);
        assert_eq!(config.task_ttl, Duration::from_secs(86_400));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" 0 "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
