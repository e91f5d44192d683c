//! Media tooling for ClipCut: yt-dlp downloads, FFprobe and FFmpeg.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - Progress parsing from `-progress pipe:2`
//! - Cancellation and timeouts via tokio
//! - Video download with reuse of recent files
//! - Audio extraction for transcription
//! - Vertical 1080x1920 clip rendering with burned-in SRT captions

pub mod audio;
pub mod command;
pub mod download;
pub mod error;
pub mod filters;
pub mod fs_utils;
pub mod probe;
pub mod progress;
pub mod render;
pub mod subtitles;

pub use audio::extract_audio;
pub use command::{check_ffmpeg, check_ffprobe, check_ytdlp, FfmpegCommand, FfmpegRunner, ToolReport};
pub use download::{download_video, DownloadOptions};
pub use error::{MediaError, MediaResult};
pub use fs_utils::{is_fresh, move_file, remove_quietly};
pub use probe::{probe_duration, probe_media, MediaInfo};
pub use progress::{FfmpegProgress, ProgressCallback};
pub use render::{clip_filename, render_clip, EncodeOptions, RenderOutcome};
pub use subtitles::{build_srt, escape_filter_path, subtitles_filter, write_srt};
