//! AssemblyAI transcription client for ClipCut.
//!
//! This crate provides:
//! - Audio upload, transcript submission and status polling
//! - Retries with exponential backoff on transient failures
//! - Mapping of sentiment analysis results to a validated [`Transcript`]
//! - An on-disk cache of completed responses
//!
//! [`Transcript`]: clipcut_models::Transcript

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::AssemblyAiClient;
pub use config::TranscribeConfig;
pub use error::{TranscribeError, TranscribeResult};
pub use types::{TranscriptResponse, TranscriptStatus};
