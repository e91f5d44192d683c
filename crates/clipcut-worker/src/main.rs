//! `clipcut` command line: run one job locally or check dependencies.

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use clipcut_media::ToolReport;
use clipcut_models::TaskStatus;
use clipcut_worker::{JobExecutor, JobRequest, TaskStore, WorkerConfig};

const USAGE: &str = "usage: clipcut <youtube_url> [--max-clips N] [--clip-duration SECS]\n       clipcut --check";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    dotenvy::dotenv().ok();
    init_tracing()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = WorkerConfig::from_env();

    if args.iter().any(|a| a == "--check") {
        let ok = check_dependencies(&config);
        std::process::exit(if ok { 0 } else { 1 });
    }

    let request = parse_request(&args)?;
    info!("Worker config: {:?}", config);

    let store = TaskStore::with_ttl(config.task_ttl);
    let executor = JobExecutor::new(config, store);
    let record = executor.run_to_completion(request).await;

    println!("{}", serde_json::to_string_pretty(&record)?);

    if record.status != TaskStatus::Completed {
        error!("{}", record.message);
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("clipcut=info".parse()?);

    // Logs go to stderr so stdout carries only the JSON record.
    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true),
            )
            .with(env_filter)
            .init();
    }
    Ok(())
}

fn parse_request(args: &[String]) -> anyhow::Result<JobRequest> {
    let mut url = None;
    let mut request_max_clips = None;
    let mut request_clip_duration = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--max-clips" => {
                let value = iter.next().context(USAGE)?;
                request_max_clips = Some(value.parse().context("--max-clips expects a number")?);
            }
            "--clip-duration" => {
                let value = iter.next().context(USAGE)?;
                request_clip_duration =
                    Some(value.parse().context("--clip-duration expects seconds")?);
            }
            "-h" | "--help" => anyhow::bail!(USAGE),
            other if url.is_none() && !other.starts_with("--") => url = Some(other.to_string()),
            other => anyhow::bail!("unexpected argument '{}'\n{}", other, USAGE),
        }
    }

    let mut request = JobRequest::new(url.context(USAGE)?);
    request.max_clips = request_max_clips;
    request.clip_duration = request_clip_duration;
    Ok(request)
}

/// Print the status of every external dependency. Returns whether all are present.
fn check_dependencies(config: &WorkerConfig) -> bool {
    let tools = ToolReport::detect();
    let report = [
        ("ffmpeg", tools.ffmpeg.is_some()),
        ("ffprobe", tools.ffprobe.is_some()),
        ("yt-dlp", tools.ytdlp.is_some()),
        ("ASSEMBLYAI_API_KEY", config.transcribe.has_api_key()),
    ];

    for (name, present) in report {
        println!("{:<20} {}", name, if present { "ok" } else { "MISSING" });
    }
    report.iter().all(|(_, present)| *present)
}
