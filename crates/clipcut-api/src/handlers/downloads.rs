//! Clip download handler.

use std::path::{Component, Path as FsPath, PathBuf};

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Serve a rendered clip from the output directory as an attachment.
pub async fn download_clip(
    State(state): State<AppState>,
    Path(requested): Path<String>,
) -> ApiResult<Response> {
    let path = resolve_clip_path(&state.output_dir, &requested).await?;

    let bytes = tokio::fs::read(&path).await?;
    let filename = attachment_name(&path);
    debug!(path = %path.display(), size = bytes.len(), "Serving clip");
    metrics::record_clip_download();

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type(&path).to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        Body::from(bytes),
    )
        .into_response())
}

/// Map a requested relative path onto a file inside `base`.
///
/// Only plain path segments are accepted. Existing files are canonicalized
/// and must still live under `base`, so symlinks cannot point outside it.
pub async fn resolve_clip_path(base: &FsPath, requested: &str) -> ApiResult<PathBuf> {
    let requested = requested.trim_start_matches('/');
    let relative = FsPath::new(requested);

    let plain = !requested.is_empty()
        && !requested.contains('\\')
        && !requested.contains('\0')
        && relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if !plain {
        warn!(path = %requested, "Rejected download path");
        return Err(ApiError::bad_request("Invalid file path"));
    }

    let candidate = base.join(relative);
    let not_found = || ApiError::not_found("File not found");

    let (Ok(resolved), Ok(root)) = (
        tokio::fs::canonicalize(&candidate).await,
        tokio::fs::canonicalize(base).await,
    ) else {
        return Err(not_found());
    };

    if !resolved.starts_with(&root) {
        warn!(path = %requested, "Download path escapes the output directory");
        return Err(ApiError::bad_request("Invalid file path"));
    }

    match tokio::fs::metadata(&resolved).await {
        Ok(meta) if meta.is_file() => Ok(resolved),
        _ => Err(not_found()),
    }
}

fn content_type(path: &FsPath) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("mp4") => "video/mp4",
        Some("srt") => "application/x-subrip",
        _ => "application/octet-stream",
    }
}

/// File name safe to place inside a quoted header parameter.
fn attachment_name(path: &FsPath) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("clip.mp4")
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
