//! Audio extraction for transcription uploads.

use std::path::Path;
use tracing::info;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;

/// Compact MP3 settings; speech transcribes fine at this quality.
pub const AUDIO_BITRATE: &str = "64k";
pub const AUDIO_QUALITY: &str = "5";

/// Build the audio extraction command.
pub fn extract_audio_command(video: &Path, audio: &Path) -> FfmpegCommand {
    FfmpegCommand::new(video, audio)
        .audio_only()
        .audio_codec("libmp3lame")
        .output_args(["-q:a", AUDIO_QUALITY])
        .audio_bitrate(AUDIO_BITRATE)
}

/// Extract the audio track of `video` into an MP3 at `audio`.
///
/// An existing non-empty file at `audio` is reused.
pub async fn extract_audio(
    video: impl AsRef<Path>,
    audio: impl AsRef<Path>,
    runner: &FfmpegRunner,
) -> MediaResult<()> {
    let (video, audio) = (video.as_ref(), audio.as_ref());

    if let Ok(metadata) = tokio::fs::metadata(audio).await {
        if metadata.len() > 0 {
            info!("Using existing audio file: {}", audio.display());
            return Ok(());
        }
    }

    info!("Extracting audio: {} -> {}", video.display(), audio.display());
    runner.run(&extract_audio_command(video, audio)).await
}
