//! Clip generation worker.
//!
//! This crate provides:
//! - The processing pipeline (download, transcribe, select, render)
//! - An in-memory task status store shared with the API
//! - A job executor with bounded concurrency and timeouts
//! - Structured per-task logging

pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod pipeline;
pub mod store;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult, NO_CLIPS_MESSAGE};
pub use executor::JobExecutor;
pub use logging::TaskLogger;
pub use pipeline::{clip_text, JobRequest, Pipeline};
pub use store::{TaskStore, DEFAULT_TASK_TTL};
