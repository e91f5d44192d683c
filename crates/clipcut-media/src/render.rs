//! Vertical clip rendering.

use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use clipcut_models::timestamp::format_compact;
use clipcut_models::CandidateWindow;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::filters::build_clip_filter;
use crate::progress::ProgressCallback;
use crate::subtitles::subtitles_filter;

/// Encoder settings for rendered clips.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeOptions {
    pub codec: String,
    pub preset: String,
    pub crf: u8,
    pub audio_codec: String,
    pub audio_bitrate: String,
}

impl EncodeOptions {
    /// Fast preview quality.
    pub fn fast() -> Self {
        Self {
            preset: "ultrafast".to_string(),
            crf: 28,
            ..Self::quality()
        }
    }

    /// Balanced quality for final output.
    pub fn quality() -> Self {
        Self {
            codec: "libx264".to_string(),
            preset: "medium".to_string(),
            crf: 23,
            audio_codec: "aac".to_string(),
            audio_bitrate: "128k".to_string(),
        }
    }

    pub fn for_mode(fast_mode: bool) -> Self {
        if fast_mode {
            Self::fast()
        } else {
            Self::quality()
        }
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self::fast()
    }
}

/// What [`render_clip`] produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOutcome {
    /// Whether captions were burned in
    pub subtitled: bool,
}

/// Build the render command for one window.
pub fn render_command(
    input: &Path,
    output: &Path,
    window: &CandidateWindow,
    srt: Option<&Path>,
    encode: &EncodeOptions,
) -> FfmpegCommand {
    let subtitles = srt.map(subtitles_filter);

    FfmpegCommand::new(input, output)
        .seek(window.start)
        .duration(window.duration())
        .video_filter(build_clip_filter(subtitles.as_deref()))
        .video_codec(&encode.codec)
        .preset(&encode.preset)
        .crf(encode.crf)
        .audio_codec(&encode.audio_codec)
        .audio_bitrate(&encode.audio_bitrate)
        .faststart()
}

/// Render `window` of `input` as a 1080x1920 clip at `output`.
///
/// When burning captions from `srt` fails, the clip is rendered again
/// without them rather than failing the clip. Encoder progress of every
/// attempt goes to `on_progress`.
pub async fn render_clip(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    window: &CandidateWindow,
    srt: Option<&Path>,
    encode: &EncodeOptions,
    runner: &FfmpegRunner,
    on_progress: Option<&ProgressCallback>,
) -> MediaResult<RenderOutcome> {
    let (input, output) = (input.as_ref(), output.as_ref());

    if !input.exists() {
        return Err(MediaError::FileNotFound(input.to_path_buf()));
    }

    info!(
        "Rendering clip: {} -> {} ({:.2}s - {:.2}s)",
        input.display(),
        output.display(),
        window.start,
        window.end
    );

    if let Some(srt) = srt {
        let cmd = render_command(input, output, window, Some(srt), encode);
        match run_render(runner, &cmd, on_progress).await {
            Ok(()) => return Ok(RenderOutcome { subtitled: true }),
            Err(e @ MediaError::FfmpegFailed { .. }) => {
                warn!(
                    output = %output.display(),
                    "Subtitle burn-in failed, rendering without captions: {}",
                    e
                );
            }
            Err(e) => return Err(e),
        }
    }

    let cmd = render_command(input, output, window, None, encode);
    run_render(runner, &cmd, on_progress).await?;
    Ok(RenderOutcome { subtitled: false })
}

async fn run_render(
    runner: &FfmpegRunner,
    cmd: &FfmpegCommand,
    on_progress: Option<&ProgressCallback>,
) -> MediaResult<()> {
    match on_progress {
        Some(callback) => {
            let callback = Arc::clone(callback);
            runner.run_with_progress(cmd, move |p| callback(p)).await
        }
        None => runner.run(cmd).await,
    }
}

/// File name for the `index`-th (1-based) clip of a video.
pub fn clip_filename(video_id: &str, index: usize, window: &CandidateWindow) -> String {
    format!(
        "clip_{}_{}_{}.mp4",
        video_id,
        index,
        format_compact(window.start)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_presets() {
        let fast = EncodeOptions::fast();
        assert_eq!((fast.preset.as_str(), fast.crf), ("ultrafast", 28));
        let quality = EncodeOptions::for_mode(false);
        assert_eq!((quality.preset.as_str(), quality.crf), ("medium", 23));
        assert_eq!(fast.codec, quality.codec);
    }

    #[test]
    fn test_render_command_args() {
        let window = CandidateWindow::sentiment(12.5, 42.5, 0.9);
        let cmd = render_command(
            Path::new("in.mp4"),
            Path::new("out.mp4"),
            &window,
            None,
            &EncodeOptions::fast(),
        );
        let args = cmd.build_args().join(" ");
        assert!(args.contains("-ss 12.500 -t 30.000 -i in.mp4"));
        assert!(args.contains("-c:v libx264 -preset ultrafast -crf 28"));
        assert!(args.contains("-c:a aac -b:a 128k"));
        assert!(!args.contains("subtitles="));
        assert!(args.ends_with("out.mp4"));
    }

    #[test]
    fn test_render_command_with_subtitles() {
        let window = CandidateWindow::fallback(0.0, 10.0);
        let cmd = render_command(
            Path::new("in.mp4"),
            Path::new("out.mp4"),
            &window,
            Some(Path::new("/tmp/c.srt")),
            &EncodeOptions::quality(),
        );
        let args = cmd.build_args();
        let vf = args.iter().position(|a| a == "-vf").unwrap();
        assert!(args[vf + 1].contains(",subtitles=filename='/tmp/c.srt'"));
    }

    #[test]
    fn test_clip_filename() {
        let window = CandidateWindow::sentiment(65.0, 95.0, 0.8);
        assert_eq!(clip_filename("dQw4w9WgXcQ", 2, &window), "clip_dQw4w9WgXcQ_2_1m05s.mp4");
    }

    #[tokio::test]
    async fn test_render_missing_input() {
        let window = CandidateWindow::fallback(0.0, 10.0);
        let result = render_clip(
            "/nonexistent/in.mp4",
            "/nonexistent/out.mp4",
            &window,
            None,
            &EncodeOptions::fast(),
            &FfmpegRunner::new(),
            None,
        )
        .await;
        assert!(matches!(result, Err(MediaError::FileNotFound(_))));
    }
}
