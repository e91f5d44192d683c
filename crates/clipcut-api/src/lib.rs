//! Axum HTTP API for ClipCut.
//!
//! This crate provides:
//! - Task submission (JSON and browser form) backed by the in-process job executor
//! - Task status polling and clip downloads from the output directory
//! - Rate limiting, security headers and request ids
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use routes::create_router;
pub use state::AppState;
