//! SRT generation and the subtitle burn-in filter.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;

use clipcut_models::timestamp::format_srt_timestamp;
use clipcut_models::{CandidateWindow, Transcript};
use tempfile::NamedTempFile;

use crate::error::MediaResult;
use crate::filters::SUBTITLE_FORCE_STYLE;

/// SRT cues for the sentences spoken during `window`.
///
/// Cue times are relative to the window start and clipped to its bounds.
/// Sentences without text are skipped. Returns an empty string when
/// nothing is spoken in the window.
pub fn build_srt(transcript: &Transcript, window: &CandidateWindow) -> String {
    let mut srt = String::new();
    let mut index = 0usize;

    for sentence in transcript.sentences_in(window.start, window.end) {
        let text = sentence.text.trim();
        if text.is_empty() {
            continue;
        }

        let start = (sentence.start.max(window.start)) - window.start;
        let end = (sentence.end.min(window.end)) - window.start;
        if end <= start {
            continue;
        }

        index += 1;
        let _ = writeln!(srt, "{}", index);
        let _ = writeln!(
            srt,
            "{} --> {}",
            format_srt_timestamp(start),
            format_srt_timestamp(end)
        );
        let _ = writeln!(srt, "{}\n", text);
    }

    srt
}

/// Write SRT content to a temp file inside `dir`.
///
/// The file is deleted when the returned handle drops.
pub fn write_srt(dir: &Path, content: &str) -> MediaResult<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("clip-")
        .suffix(".srt")
        .tempfile_in(dir)?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// Escape a path for use inside an FFmpeg filter argument.
pub fn escape_filter_path(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    let mut escaped = String::with_capacity(normalized.len() + 8);
    for ch in normalized.chars() {
        match ch {
            ':' | '\'' | ',' | ';' | '[' | ']' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// `subtitles` filter burning `srt_path` in with the clip caption style.
pub fn subtitles_filter(srt_path: &Path) -> String {
    format!(
        "subtitles=filename='{}':charenc=UTF-8:force_style='{}'",
        escape_filter_path(srt_path),
        SUBTITLE_FORCE_STYLE
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipcut_models::Sentence;

    fn transcript() -> Transcript {
        Transcript::new(
            vec![
                Sentence::new(0.0, 4.0, "Before the clip."),
                Sentence::new(4.0, 9.5, "This one starts early."),
                Sentence::new(9.5, 10.0, "   "),
                Sentence::new(10.0, 14.25, "Fully inside."),
                Sentence::new(14.25, 30.0, "Runs past the end."),
            ],
            30.0,
        )
    }

    #[test]
    fn test_build_srt_relative_times() {
        let window = CandidateWindow::sentiment(5.0, 20.0, 0.9);
        let srt = build_srt(&transcript(), &window);

        let expected = "1\n00:00:00,000 --> 00:00:04,500\nThis one starts early.\n\n\
                        2\n00:00:05,000 --> 00:00:09,250\nFully inside.\n\n\
                        3\n00:00:09,250 --> 00:00:15,000\nRuns past the end.\n\n";
        assert_eq!(srt, expected);
    }

    #[test]
    fn test_build_srt_empty_window() {
        let window = CandidateWindow::fallback(40.0, 50.0);
        assert!(build_srt(&transcript(), &window).is_empty());
    }

    #[test]
    fn test_escape_filter_path() {
        let escaped = escape_filter_path(Path::new("/tmp/a:b,c'd[1].srt"));
        assert_eq!(escaped, "/tmp/a\\:b\\,c\\'d\\[1\\].srt");
    }

    #[test]
    fn test_write_srt() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = write_srt(dir.path(), "1\n00:00:00,000 --> 00:00:01,000\nHi\n\n").unwrap();
        let content = std::fs::read_to_string(file.path()).unwrap();
        assert!(content.contains("Hi"));
        assert_eq!(file.path().extension().unwrap(), "srt");
    }

    #[test]
    fn test_subtitles_filter() {
        let filter = subtitles_filter(Path::new("/work/clip.srt"));
        assert!(filter.starts_with("subtitles=filename='/work/clip.srt':charenc=UTF-8"));
        assert!(filter.contains("Alignment=10"));
    }
}
