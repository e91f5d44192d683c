//! Video download using yt-dlp.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::{MediaError, MediaResult};
use crate::fs_utils::{is_fresh, remove_quietly};

/// Format selector capped at 720p for fast mode.
pub const FORMAT_FAST: &str = "bestvideo[height<=720][ext=mp4]+bestaudio[ext=m4a]/best[height<=720]";

/// Best available MP4 format.
pub const FORMAT_BEST: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best";

/// Options for [`download_video`].
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Cap the resolution at 720p
    pub fast_mode: bool,
    /// Reuse an existing download younger than this
    pub reuse_ttl: Duration,
    /// Abort yt-dlp after this long
    pub timeout: Option<Duration>,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            fast_mode: true,
            reuse_ttl: Duration::from_secs(3600),
            timeout: Some(Duration::from_secs(1800)),
        }
    }
}

impl DownloadOptions {
    pub fn with_fast_mode(mut self, fast_mode: bool) -> Self {
        self.fast_mode = fast_mode;
        self
    }

    pub fn with_reuse_ttl(mut self, ttl: Duration) -> Self {
        self.reuse_ttl = ttl;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn format(&self) -> &'static str {
        if self.fast_mode {
            FORMAT_FAST
        } else {
            FORMAT_BEST
        }
    }
}

/// Download a video from URL using yt-dlp.
///
/// A non-empty file at `output_path` younger than `reuse_ttl` is reused
/// without touching the network. Returns whether a fresh download happened.
pub async fn download_video(
    url: &str,
    output_path: impl AsRef<Path>,
    options: &DownloadOptions,
) -> MediaResult<bool> {
    let output_path = output_path.as_ref();

    if is_fresh(output_path, options.reuse_ttl).await {
        info!("Using existing video file: {}", output_path.display());
        return Ok(false);
    }

    which::which("yt-dlp").map_err(|_| MediaError::YtDlpNotFound)?;

    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    info!(
        "Downloading video from {} to {}",
        url,
        output_path.display()
    );

    let args = ytdlp_args(url, output_path, options);
    let child = Command::new("yt-dlp")
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    let output = match options.timeout {
        Some(limit) => tokio::time::timeout(limit, child)
            .await
            .map_err(|_| MediaError::Timeout(limit.as_secs()))??,
        None => child.await?,
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("yt-dlp stderr: {}", stderr);

        if stderr.contains("429") || stderr.contains("Too Many Requests") {
            warn!(url = %url, "YouTube rate limit detected");
        }
        remove_quietly(output_path).await;

        return Err(MediaError::download_failed(format!(
            "yt-dlp failed: {}",
            last_error_line(&stderr)
        )));
    }

    if !output_path.exists() {
        return Err(MediaError::download_failed("Output file not created"));
    }

    let file_size = output_path.metadata()?.len();
    info!(
        output = %output_path.display(),
        size_mb = file_size as f64 / (1024.0 * 1024.0),
        "Downloaded video successfully"
    );

    Ok(true)
}

/// yt-dlp arguments for a single-video MP4 download.
pub fn ytdlp_args(url: &str, output_path: &Path, options: &DownloadOptions) -> Vec<String> {
    vec![
        "--no-playlist".to_string(),
        "--no-progress".to_string(),
        "-f".to_string(),
        options.format().to_string(),
        "--merge-output-format".to_string(),
        "mp4".to_string(),
        "-o".to_string(),
        output_path.to_string_lossy().to_string(),
        url.to_string(),
    ]
}

/// Last non-empty stderr line, which is where yt-dlp reports the cause.
fn last_error_line(stderr: &str) -> &str {
    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("Unknown error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_fast_mode_caps_resolution() {
        let args = ytdlp_args(
            "https://youtu.be/dQw4w9WgXcQ",
            &PathBuf::from("temp/dQw4w9WgXcQ.mp4"),
            &DownloadOptions::default(),
        );
        assert!(args.contains(&FORMAT_FAST.to_string()));
        assert!(args.contains(&"--no-playlist".to_string()));
        assert_eq!(args.last().unwrap(), "https://youtu.be/dQw4w9WgXcQ");
    }

    #[test]
    fn test_quality_mode_format() {
        let options = DownloadOptions::default().with_fast_mode(false);
        let args = ytdlp_args("u", &PathBuf::from("v.mp4"), &options);
        let idx = args.iter().position(|a| a == "-f").unwrap();
        assert_eq!(args[idx + 1], FORMAT_BEST);
    }

    #[test]
    fn test_last_error_line() {
        let stderr = "WARNING: something\nERROR: Video unavailable\n\n";
        assert_eq!(last_error_line(stderr), "ERROR: Video unavailable");
        assert_eq!(last_error_line(""), "Unknown error");
    }

    #[tokio::test]
    async fn test_fresh_download_is_reused() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("video.mp4");
        tokio::fs::write(&path, b"cached").await.unwrap();

        let downloaded = download_video("https://youtu.be/dQw4w9WgXcQ", &path, &DownloadOptions::default())
            .await
            .unwrap();
        assert!(!downloaded);
    }
}
