//! Task submission and status handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect};
use axum::{Form, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use clipcut_models::{is_youtube_url, TaskId, TaskRecord, TaskStatus};
use clipcut_worker::JobRequest;

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

const INVALID_URL_MESSAGE: &str = "Please enter a valid YouTube URL";

/// JSON body for `POST /api/generate-clips`.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateClipsRequest {
    #[validate(length(min = 1, max = 2048))]
    pub youtube_url: String,
    #[validate(range(min = 1, max = 20))]
    pub max_clips: Option<usize>,
    #[validate(range(min = 5.0, max = 300.0))]
    pub clip_duration: Option<f64>,
}

/// Form body for the browser endpoints.
#[derive(Debug, Deserialize)]
pub struct GenerateClipsForm {
    #[serde(default)]
    pub youtube_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub task_id: TaskId,
    pub status: TaskStatus,
}

/// Submit a video for processing.
///
/// Returns `202 Accepted` with the new task id; progress is polled through
/// the status endpoints.
pub async fn generate_clips(
    State(state): State<AppState>,
    Json(request): Json<GenerateClipsRequest>,
) -> ApiResult<(StatusCode, Json<SubmitResponse>)> {
    let url = request.youtube_url.trim();
    if !is_youtube_url(url) {
        return Err(ApiError::bad_request(INVALID_URL_MESSAGE));
    }
    request.validate()?;

    let mut job = JobRequest::new(url);
    if let Some(max_clips) = request.max_clips {
        job = job.with_max_clips(max_clips);
    }
    if let Some(secs) = request.clip_duration {
        job = job.with_clip_duration(secs);
    }

    let record = submit(&state, job).await;
    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitResponse {
            task_id: record.task_id,
            status: record.status,
        }),
    ))
}

/// Form submission; redirects the browser to the status page of the new task.
pub async fn generate_clips_form(
    State(state): State<AppState>,
    Form(form): Form<GenerateClipsForm>,
) -> ApiResult<impl IntoResponse> {
    let url = form.youtube_url.trim();
    if !is_youtube_url(url) {
        return Err(ApiError::bad_request(INVALID_URL_MESSAGE));
    }

    let record = submit(&state, JobRequest::new(url)).await;
    Ok(Redirect::to(&format!("/status/{}", record.task_id)))
}

/// Current record of a task.
pub async fn task_status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<TaskRecord>> {
    state
        .store()
        .get(&TaskId::from_string(task_id))
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Task not found"))
}

async fn submit(state: &AppState, job: JobRequest) -> TaskRecord {
    let record = state.executor.submit(job).await;
    info!(task_id = %record.task_id, url = %record.url, "Task submitted");
    metrics::record_task_submitted();
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_validation() {
        let ok = GenerateClipsRequest {
            youtube_url: "https://youtu.be/dQw4w9WgXcQ".to_string(),
            max_clips: Some(3),
            clip_duration: Some(30.0),
        };
        assert!(ok.validate().is_ok());

        let too_many = GenerateClipsRequest {
            max_clips: Some(50),
            ..ok
        };
        assert!(too_many.validate().is_err());

        let too_short = GenerateClipsRequest {
            youtube_url: "https://youtu.be/dQw4w9WgXcQ".to_string(),
            max_clips: None,
            clip_duration: Some(1.0),
        };
        assert!(too_short.validate().is_err());
    }

    #[test]
    fn test_optional_fields_default_to_none() {
        let request: GenerateClipsRequest =
            serde_json::from_str(r#"{"youtube_url": "https://youtu.be/dQw4w9WgXcQ"}"#).unwrap();
        assert!(request.max_clips.is_none());
        assert!(request.clip_duration.is_none());
        assert!(request.validate().is_ok());
    }
}
