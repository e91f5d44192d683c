//! YouTube URL parsing and validation.

use thiserror::Error;
use url::Url;

/// Errors that can occur during YouTube ID extraction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum YoutubeIdError {
    #[error("URL is not a valid YouTube URL")]
    InvalidYoutubeUrl,
    #[error("Video ID has invalid format")]
    InvalidVideoId,
    #[error("Video ID not found in URL")]
    VideoIdNotFound,
}

/// Result type for YouTube ID extraction.
pub type YoutubeIdResult<T> = Result<T, YoutubeIdError>;

/// Extract the 11-character video ID from a YouTube URL.
///
/// Supported forms:
/// - `https://www.youtube.com/watch?v=VIDEO_ID`
/// - `https://youtu.be/VIDEO_ID`
/// - `https://youtube.com/{embed,v,shorts,live}/VIDEO_ID`
/// - `m.` and `music.` subdomains, missing scheme, extra query parameters
pub fn extract_youtube_id(url: &str) -> YoutubeIdResult<String> {
    let url = url.trim();
    let with_scheme;
    let url = if url.contains("://") {
        url
    } else {
        with_scheme = format!("https://{}", url);
        &with_scheme
    };

    let parsed = Url::parse(url).map_err(|_| YoutubeIdError::InvalidYoutubeUrl)?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(YoutubeIdError::InvalidYoutubeUrl);
    }
    let host = parsed
        .host_str()
        .ok_or(YoutubeIdError::InvalidYoutubeUrl)?
        .to_ascii_lowercase();
    let host = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("m."))
        .or_else(|| host.strip_prefix("music."))
        .unwrap_or(host.as_str());

    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let candidate = match host {
        "youtu.be" => segments.first().map(|id| id.to_string()),
        "youtube.com" => match segments.as_slice() {
            ["watch", ..] => parsed
                .query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned()),
            ["embed" | "v" | "shorts" | "live", id, ..] => Some(id.to_string()),
            _ => None,
        },
        _ => return Err(YoutubeIdError::InvalidYoutubeUrl),
    };

    match candidate {
        Some(id) => validate_youtube_id(id),
        None => Err(YoutubeIdError::VideoIdNotFound),
    }
}

/// Whether `url` points at a single YouTube video.
pub fn is_youtube_url(url: &str) -> bool {
    extract_youtube_id(url).is_ok()
}

fn validate_youtube_id(id: String) -> YoutubeIdResult<String> {
    let valid_chars = id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if id.len() != 11 || !valid_chars {
        return Err(YoutubeIdError::InvalidVideoId);
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_youtube_id_success_cases() {
        let id = "dQw4w9WgXcQ";
        for url in [
            "https://youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://youtube.com/embed/dQw4w9WgXcQ",
            "https://youtube.com/shorts/dQw4w9WgXcQ",
            "https://youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?t=30",
            "  www.youtube.com/watch?v=dQw4w9WgXcQ  ",
            "https://YOUTUBE.COM/watch?v=dQw4w9WgXcQ",
        ] {
            assert_eq!(extract_youtube_id(url).unwrap(), id, "url: {}", url);
        }
    }

    #[test]
    fn test_extract_youtube_id_error_cases() {
        assert_eq!(
            extract_youtube_id("https://example.com/watch?v=dQw4w9WgXcQ"),
            Err(YoutubeIdError::InvalidYoutubeUrl)
        );
        assert_eq!(
            extract_youtube_id("https://notyoutube.com/watch?v=dQw4w9WgXcQ"),
            Err(YoutubeIdError::InvalidYoutubeUrl)
        );
        assert_eq!(
            extract_youtube_id("ftp://youtube.com/watch?v=dQw4w9WgXcQ"),
            Err(YoutubeIdError::InvalidYoutubeUrl)
        );
        assert_eq!(
            extract_youtube_id("https://youtube.com"),
            Err(YoutubeIdError::VideoIdNotFound)
        );
        assert_eq!(
            extract_youtube_id("https://youtu.be/"),
            Err(YoutubeIdError::VideoIdNotFound)
        );
        assert_eq!(
            extract_youtube_id("https://youtube.com/watch?v=abc123"),
            Err(YoutubeIdError::InvalidVideoId)
        );
        assert_eq!(
            extract_youtube_id("https://youtube.com/watch?v="),
            Err(YoutubeIdError::InvalidVideoId)
        );
    }

    #[test]
    fn test_is_youtube_url() {
        assert!(is_youtube_url("https://youtu.be/dQw4w9WgXcQ"));
        assert!(!is_youtube_url("not a url"));
        assert!(!is_youtube_url(""));
    }
}
