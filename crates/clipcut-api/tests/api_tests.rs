//! Router tests driven through `tower::ServiceExt::oneshot`.

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use clipcut_api::{create_router, ApiConfig, AppState};
use clipcut_worker::WorkerConfig;

const VALID_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

struct TestApp {
    router: Router,
    state: AppState,
    dir: TempDir,
}

/// Router whose jobs fail immediately: the work dir sits below a regular
/// file, so no download is ever attempted.
fn test_app(config: ApiConfig) -> TestApp {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"").unwrap();

    let worker = WorkerConfig::default()
        .with_output_dir(dir.path().join("clips"))
        .with_work_dir(blocker.join("temp"));
    std::fs::create_dir_all(dir.path().join("clips")).unwrap();

    let state = AppState::new(config, worker);
    TestApp {
        router: create_router(state.clone(), None),
        state,
        dir,
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = test_app(ApiConfig::default());
    let response = app.router.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert!(response.headers().contains_key("x-request-id"));

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_request_id_echoed() {
    let app = test_app(ApiConfig::default());
    let request = Request::builder()
        .uri("/healthz")
        .header("X-Request-ID", "abc-123")
        .body(Body::empty())
        .unwrap();
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc-123");
}

#[tokio::test]
async fn test_ready_reports_checks() {
    let app = test_app(ApiConfig::default());
    let response = app.router.oneshot(get("/ready")).await.unwrap();

    let status = response.status();
    assert!(status == StatusCode::OK || status == StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["checks"]["output_dir"]["status"], "ok");
    assert_eq!(body["checks"]["transcription"]["status"], "disabled");
}

#[tokio::test]
async fn test_unknown_task_is_not_found() {
    let app = test_app(ApiConfig::default());
    for uri in ["/status/missing", "/check_status/missing", "/api/status/missing"] {
        let response = app.router.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        let body = body_json(response).await;
        assert_eq!(body["detail"], "Task not found");
        assert_eq!(body["code"], "not_found");
    }
}

#[tokio::test]
async fn test_invalid_url_rejected() {
    let app = test_app(ApiConfig::default());
    let response = app
        .router
        .oneshot(json_post(
            "/api/generate-clips",
            serde_json::json!({"youtube_url": "https://example.com/video"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["detail"], "Please enter a valid YouTube URL");
    assert_eq!(body["code"], "bad_request");
    assert!(app.state.store().is_empty().await);
}

#[tokio::test]
async fn test_out_of_range_override_rejected() {
    let app = test_app(ApiConfig::default());
    let response = app
        .router
        .oneshot(json_post(
            "/api/generate-clips",
            serde_json::json!({"youtube_url": VALID_URL, "max_clips": 0}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn test_submit_returns_accepted_and_task_is_tracked() {
    let app = test_app(ApiConfig::default());
    let response = app
        .router
        .clone()
        .oneshot(json_post(
            "/api/generate-clips",
            serde_json::json!({"youtube_url": VALID_URL, "max_clips": 2, "clip_duration": 20.0}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = body_json(response).await;
    assert_eq!(body["status"], "processing");
    let task_id = body["task_id"].as_str().unwrap().to_string();

    // The job fails creating its work dir; wait for the terminal record.
    let mut record = Value::Null;
    for _ in 0..100 {
        let response = app
            .router
            .clone()
            .oneshot(get(&format!("/status/{}", task_id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        record = body_json(response).await;
        if record["status"] != "processing" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert_eq!(record["task_id"], task_id.as_str());
    assert_eq!(record["url"], VALID_URL);
    assert_eq!(record["status"], "error");
    assert!(record["message"].as_str().unwrap().starts_with("Error:"));
}

#[tokio::test]
async fn test_form_submit_redirects_to_status() {
    let app = test_app(ApiConfig::default());
    for path in ["/generate-clips", "/process"] {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("youtube_url=https%3A%2F%2Fyoutu.be%2FdQw4w9WgXcQ"))
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", path);
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert!(location.starts_with("/status/"));
    }
    assert_eq!(app.state.store().len().await, 2);
}

#[tokio::test]
async fn test_form_submit_with_bad_url() {
    let app = test_app(ApiConfig::default());
    let request = Request::builder()
        .method("POST")
        .uri("/process")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("youtube_url=not+a+url"))
        .unwrap();
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_download_serves_clip_as_attachment() {
    let app = test_app(ApiConfig::default());
    std::fs::write(
        app.dir.path().join("clips").join("clip_dQw4w9WgXcQ_1_0m15s.mp4"),
        b"fake video",
    )
    .unwrap();

    let response = app
        .router
        .oneshot(get("/download/clip_dQw4w9WgXcQ_1_0m15s.mp4"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "video/mp4");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"clip_dQw4w9WgXcQ_1_0m15s.mp4\""
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"fake video");
}

#[tokio::test]
async fn test_download_guards() {
    let app = test_app(ApiConfig::default());
    std::fs::write(app.dir.path().join("secret.txt"), b"outside").unwrap();

    let response = app
        .router
        .clone()
        .oneshot(get("/download/..%2Fsecret.txt"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .router
        .oneshot(get("/download/missing.mp4"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_api_rate_limited_per_client() {
    let app = test_app(ApiConfig::default().with_rate_limit(1));
    let request = |ip: &str| {
        Request::builder()
            .method("POST")
            .uri("/api/generate-clips")
            .header(header::CONTENT_TYPE, "application/json")
            .header("X-Forwarded-For", ip)
            .body(Body::from(
                serde_json::json!({"youtube_url": "bad"}).to_string(),
            ))
            .unwrap()
    };

    let first = app.router.clone().oneshot(request("203.0.113.9")).await.unwrap();
    assert_eq!(first.status(), StatusCode::BAD_REQUEST);

    let second = app.router.clone().oneshot(request("203.0.113.9")).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body_json(second).await["code"], "rate_limited");

    let other = app.router.oneshot(request("203.0.113.10")).await.unwrap();
    assert_eq!(other.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_metrics_route_absent_without_handle() {
    let app = test_app(ApiConfig::default());
    let response = app.router.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
