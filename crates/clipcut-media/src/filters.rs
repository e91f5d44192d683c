//! FFmpeg video filter definitions.

/// Output frame width for vertical clips.
pub const VERTICAL_WIDTH: u32 = 1080;

/// Output frame height for vertical clips.
pub const VERTICAL_HEIGHT: u32 = 1920;

/// Fit the source into a 1080x1920 frame, padding the rest with black.
pub const FILTER_VERTICAL_PAD: &str = concat!(
    "scale=1080:1920:force_original_aspect_ratio=decrease,",
    "pad=1080:1920:(ow-iw)/2:(oh-ih)/2:color=black"
);

/// libass style for burned-in captions: centered, boxed, above the bottom edge.
pub const SUBTITLE_FORCE_STYLE: &str =
    "FontSize=24,Alignment=10,BorderStyle=4,Outline=1,Shadow=0,MarginV=35";

/// Video filter chain for a clip, with an optional subtitle filter appended.
pub fn build_clip_filter(subtitles: Option<&str>) -> String {
    match subtitles {
        Some(subs) => format!("{},{}", FILTER_VERTICAL_PAD, subs),
        None => FILTER_VERTICAL_PAD.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertical_pad_dimensions() {
        assert!(FILTER_VERTICAL_PAD.contains(&format!("{}:{}", VERTICAL_WIDTH, VERTICAL_HEIGHT)));
        assert!(FILTER_VERTICAL_PAD.ends_with("color=black"));
    }

    #[test]
    fn test_build_clip_filter() {
        assert_eq!(build_clip_filter(None), FILTER_VERTICAL_PAD);
        let with_subs = build_clip_filter(Some("subtitles=filename='a.srt'"));
        assert!(with_subs.starts_with(FILTER_VERTICAL_PAD));
        assert!(with_subs.ends_with(",subtitles=filename='a.srt'"));
    }
}
