//! Health check handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use clipcut_media::ToolReport;

use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: ReadinessChecks,
    pub active_jobs: usize,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    pub ffmpeg: CheckStatus,
    pub ffprobe: CheckStatus,
    pub ytdlp: CheckStatus,
    pub output_dir: CheckStatus,
    /// Informational only; without a key the pipeline falls back to
    /// structural segmentation.
    pub transcription: CheckStatus,
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckStatus {
    fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            error: None,
        }
    }

    fn error(msg: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            error: Some(msg.into()),
        }
    }

    fn disabled(msg: impl Into<String>) -> Self {
        Self {
            status: "disabled".to_string(),
            error: Some(msg.into()),
        }
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn tool(found: bool, name: &str) -> Self {
        if found {
            Self::ok()
        } else {
            Self::error(format!("{} not found in PATH", name))
        }
    }
}

/// Readiness check endpoint (readiness probe).
/// Checks the external tools and that the output directory is usable.
pub async fn ready(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let tools = tokio::task::spawn_blocking(ToolReport::detect)
        .await
        .unwrap_or(ToolReport {
            ffmpeg: None,
            ffprobe: None,
            ytdlp: None,
        });

    let output_dir = match tokio::fs::create_dir_all(&state.output_dir).await {
        Ok(()) => CheckStatus::ok(),
        Err(e) => CheckStatus::error(format!("{}: {}", state.output_dir.display(), e)),
    };

    let transcription = if state.executor.pipeline().has_transcriber() {
        CheckStatus::ok()
    } else {
        CheckStatus::disabled("ASSEMBLYAI_API_KEY not set")
    };

    let checks = ReadinessChecks {
        ffmpeg: CheckStatus::tool(tools.ffmpeg.is_some(), "ffmpeg"),
        ffprobe: CheckStatus::tool(tools.ffprobe.is_some(), "ffprobe"),
        ytdlp: CheckStatus::tool(tools.ytdlp.is_some(), "yt-dlp"),
        output_dir,
        transcription,
    };

    let all_ok = checks.ffmpeg.is_ok()
        && checks.ffprobe.is_ok()
        && checks.ytdlp.is_ok()
        && checks.output_dir.is_ok();

    let response = ReadinessResponse {
        status: if all_ok { "ready" } else { "degraded" }.to_string(),
        checks,
        active_jobs: state.executor.active_jobs(),
    };

    if all_ok {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}
