//! End-to-end processing of one submitted video.
//!
//! Download, probe, extract audio, transcribe, select windows and render
//! each window as a vertical clip, reporting progress to the [`TaskStore`]
//! along the way.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch, Semaphore};
use tracing::Instrument;

use clipcut_media::{
    build_srt, clip_filename, download_video, extract_audio, move_file, probe_duration,
    render_clip, write_srt, DownloadOptions, EncodeOptions, FfmpegProgress, FfmpegRunner,
    ProgressCallback,
};
use clipcut_models::task::progress;
use clipcut_models::{extract_youtube_id, CandidateWindow, ClipInfo, ClipPlan, TaskId, Transcript};
use clipcut_select::{select_clips, SelectionConfig};
use clipcut_transcribe::AssemblyAiClient;

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::TaskLogger;
use crate::store::TaskStore;

/// Sentence length of the structural transcript used without speech data.
const STRUCTURAL_STEP_SECS: f64 = 5.0;

/// A clip generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequest {
    pub url: String,
    /// Overrides the configured maximum number of clips
    #[serde(default)]
    pub max_clips: Option<usize>,
    /// Overrides the configured clip duration (seconds)
    #[serde(default)]
    pub clip_duration: Option<f64>,
}

impl JobRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_clips: None,
            clip_duration: None,
        }
    }

    pub fn with_max_clips(mut self, max_clips: usize) -> Self {
        self.max_clips = Some(max_clips);
        self
    }

    pub fn with_clip_duration(mut self, secs: f64) -> Self {
        self.clip_duration = Some(secs);
        self
    }

    /// `base` with this request's overrides applied.
    pub fn selection_config(&self, base: &SelectionConfig) -> SelectionConfig {
        let mut config = base.clone();
        if let Some(max_clips) = self.max_clips {
            config.max_clips = max_clips;
        }
        if let Some(secs) = self.clip_duration {
            config.clip_duration_secs = secs;
            config.min_sentiment_window_secs = config.min_sentiment_window_secs.min(secs);
        }
        config
    }
}

/// Progress reported by clip renders running in parallel.
#[derive(Debug, Clone, Copy)]
enum RenderEvent {
    /// Share of a clip encoded so far, in `[0, 1]`
    Encoding { clip: usize, fraction: f64 },
    /// A clip finished, successfully or not
    Finished { clip: usize },
}

/// Runs clip generation jobs against the shared task store.
pub struct Pipeline {
    config: WorkerConfig,
    store: TaskStore,
    transcriber: Option<Arc<AssemblyAiClient>>,
    runner: FfmpegRunner,
    cancel_tx: watch::Sender<bool>,
}

impl Pipeline {
    /// Create a pipeline. Without an AssemblyAI key every job uses
    /// structural segmentation.
    pub fn new(config: WorkerConfig, store: TaskStore) -> Self {
        let transcriber = match AssemblyAiClient::new(config.transcribe.clone()) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                tracing::warn!("Transcription disabled: {}", e);
                None
            }
        };
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let runner = FfmpegRunner::new()
            .with_timeout(config.ffmpeg_timeout.as_secs())
            .with_cancel(cancel_rx);

        Self {
            config,
            store,
            transcriber,
            runner,
            cancel_tx,
        }
    }

    /// Kill running FFmpeg processes and fail the jobs they belong to.
    ///
    /// Permanent: every later render fails as cancelled too.
    pub fn cancel(&self) {
        self.cancel_tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }

    fn ensure_running(&self) -> WorkerResult<()> {
        if self.is_cancelled() {
            return Err(WorkerError::Cancelled);
        }
        Ok(())
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn has_transcriber(&self) -> bool {
        self.transcriber.is_some()
    }

    /// Run a job to its terminal state.
    ///
    /// The outcome is always written to the store: completed with the
    /// rendered clips, or failed with a user-facing message and progress 0.
    pub async fn run(&self, task_id: &TaskId, request: &JobRequest) -> WorkerResult<Vec<ClipInfo>> {
        let logger = TaskLogger::new(task_id, "generate_clips");
        let span = logger.create_span();

        async {
            logger.log_start(&request.url);
            let started = Instant::now();
            let result = self.process(task_id, request, &logger).await;
            metrics::histogram!("clipcut_task_duration_seconds")
                .record(started.elapsed().as_secs_f64());

            match result {
                Ok(clips) => {
                    let message = format!(
                        "Created {} clips from the most engaging parts of your video!",
                        clips.len()
                    );
                    logger.log_completion(&message);
                    metrics::counter!("clipcut_tasks_total", "outcome" => "completed").increment(1);
                    self.store.complete(task_id, clips.clone(), message).await;
                    Ok(clips)
                }
                Err(e) => {
                    logger.log_error(&e.to_string());
                    metrics::counter!("clipcut_tasks_total", "outcome" => "error").increment(1);
                    self.store.fail(task_id, e.user_message()).await;
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn process(
        &self,
        task_id: &TaskId,
        request: &JobRequest,
        logger: &TaskLogger,
    ) -> WorkerResult<Vec<ClipInfo>> {
        self.ensure_running()?;
        let selection = request.selection_config(&self.config.selection);
        selection.validate()?;

        let video_id = extract_youtube_id(&request.url)
            .map_err(|e| WorkerError::InvalidUrl(e.to_string()))?;

        tokio::fs::create_dir_all(&self.config.work_dir).await?;
        tokio::fs::create_dir_all(&self.config.output_dir).await?;

        self.step(task_id, logger, progress::DOWNLOADING, "Downloading video...")
            .await;
        let video_path = self.config.work_dir.join(format!("{}.mp4", video_id));
        let download = DownloadOptions::default()
            .with_fast_mode(self.config.fast_mode)
            .with_reuse_ttl(self.config.download_reuse_ttl);
        download_video(&request.url, &video_path, &download).await?;

        let duration = probe_duration(&video_path).await?;
        let processed = duration.min(self.config.max_video_duration);
        if duration > processed {
            logger.log_warning(&format!(
                "Video is {:.0}s long, processing the first {:.0}s",
                duration, processed
            ));
        }

        self.step(task_id, logger, progress::UPLOADING_AUDIO, "Extracting audio...")
            .await;
        let audio_path = self.config.work_dir.join(format!("{}.mp3", video_id));
        extract_audio(&video_path, &audio_path, &self.runner).await?;

        self.step(task_id, logger, progress::TRANSCRIBING, "Transcribing audio...")
            .await;
        let transcript = self
            .transcribe(logger, &video_id, &audio_path, processed)
            .await;

        self.step(
            task_id,
            logger,
            progress::FINDING_MOMENTS,
            "Finding the most engaging moments...",
        )
        .await;
        let plan = select_clips(&transcript, &selection)?;
        self.store.set_plan_source(task_id, plan.source).await;
        if let Some(source) = plan.source {
            metrics::counter!("clipcut_plans_total", "source" => source.as_str()).increment(1);
        }
        if plan.is_empty() {
            return Err(WorkerError::NoClips);
        }

        self.step(
            task_id,
            logger,
            progress::CREATING_CLIPS,
            &format!("Creating {} clips...", plan.len()),
        )
        .await;
        self.ensure_running()?;
        let clips = self
            .render_plan(task_id, logger, &plan, &transcript, &video_id, &video_path)
            .await;

        self.ensure_running()?;
        if clips.is_empty() {
            return Err(WorkerError::NoClips);
        }
        Ok(clips)
    }

    /// Transcript for the first `processed` seconds.
    ///
    /// Degrades to a structural transcript when the service is unavailable,
    /// fails, or hears no speech, so fallback segmentation still has
    /// boundaries to work with.
    async fn transcribe(
        &self,
        logger: &TaskLogger,
        video_id: &str,
        audio_path: &Path,
        processed: f64,
    ) -> Transcript {
        let structural = || Transcript::uniform(processed, STRUCTURAL_STEP_SECS);

        let Some(client) = &self.transcriber else {
            logger.log_warning("No transcription service configured, using structural segmentation");
            return structural();
        };

        let cache_path = self
            .config
            .work_dir
            .join(format!("{}.transcript.json", video_id));
        match client.transcribe_cached(audio_path, &cache_path).await {
            Ok(transcript) if transcript.is_empty() => {
                logger.log_warning("Transcript has no sentences, using structural segmentation");
                structural()
            }
            Ok(transcript) => {
                logger.log_progress(
                    progress::TRANSCRIBING,
                    &format!(
                        "Transcribed {} sentences (sentiment: {})",
                        transcript.len(),
                        transcript.has_sentiment()
                    ),
                );
                transcript.truncated(processed)
            }
            Err(e) => {
                logger.log_warning(&format!(
                    "Transcription failed, using structural segmentation: {}",
                    e
                ));
                structural()
            }
        }
    }

    /// Render every window, at most `max_parallel_renders` at a time.
    ///
    /// Encoder progress of all renders is folded into the task progress
    /// between `CREATING_CLIPS` and `DONE`. Failed clips are logged and
    /// skipped. The result keeps plan order.
    async fn render_plan(
        &self,
        task_id: &TaskId,
        logger: &TaskLogger,
        plan: &ClipPlan,
        transcript: &Transcript,
        video_id: &str,
        video_path: &Path,
    ) -> Vec<ClipInfo> {
        let total = plan.len();
        let semaphore = Semaphore::new(self.config.max_parallel_renders.max(1));
        let encode = EncodeOptions::for_mode(self.config.fast_mode);
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let renders = plan.iter().enumerate().map(|(clip, window)| {
            let (semaphore, encode) = (&semaphore, &encode);
            let events = events_tx.clone();
            async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    return None;
                };

                let index = clip + 1;
                let on_progress = encoding_progress(clip, window, events.clone());
                let result = self
                    .render_one(
                        task_id,
                        index,
                        window,
                        transcript,
                        video_id,
                        video_path,
                        encode,
                        &on_progress,
                    )
                    .await;
                let _ = events.send(RenderEvent::Finished { clip });

                match result {
                    Ok(info) => Some(info),
                    Err(e) => {
                        logger.log_warning(&format!("Clip {} failed: {}", index, e));
                        metrics::counter!("clipcut_clip_failures_total").increment(1);
                        None
                    }
                }
            }
        });
        let renders = join_all(renders);
        // The report loop ends once every render has dropped its sender.
        drop(events_tx);

        let report = self.report_render_progress(task_id, total, events_rx);
        let (clips, ()) = tokio::join!(renders, report);
        clips.into_iter().flatten().collect()
    }

    /// Write render progress to the store until every sender is gone.
    ///
    /// Progress never moves backwards, even when a clip is encoded again
    /// without captions.
    async fn report_render_progress(
        &self,
        task_id: &TaskId,
        total: usize,
        mut events: mpsc::UnboundedReceiver<RenderEvent>,
    ) {
        let mut encoded = vec![0.0_f64; total];
        let mut finished = 0;
        let mut reported = progress::CREATING_CLIPS;

        while let Some(event) = events.recv().await {
            let message = match event {
                RenderEvent::Encoding { clip, fraction } => {
                    if let Some(done) = encoded.get_mut(clip) {
                        *done = done.max(fraction.clamp(0.0, 1.0));
                    }
                    format!("Creating clip {} of {}...", clip + 1, total)
                }
                RenderEvent::Finished { clip } => {
                    if let Some(done) = encoded.get_mut(clip) {
                        *done = 1.0;
                    }
                    finished += 1;
                    format!("Created clip {} of {}", finished, total)
                }
            };

            let value = progress::clips_rendered(encoded.iter().sum(), total);
            if value > reported || matches!(event, RenderEvent::Finished { .. }) {
                reported = reported.max(value);
                self.store.set_progress(task_id, reported, message).await;
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn render_one(
        &self,
        task_id: &TaskId,
        index: usize,
        window: &CandidateWindow,
        transcript: &Transcript,
        video_id: &str,
        video_path: &Path,
        encode: &EncodeOptions,
        on_progress: &ProgressCallback,
    ) -> WorkerResult<ClipInfo> {
        let filename = clip_filename(video_id, index, window);
        let work_path: PathBuf = self
            .config
            .work_dir
            .join(format!("{}-{}", task_id, filename));

        // Held until rendering finishes; the temp file is removed on drop.
        let srt_file = if self.config.burn_subtitles {
            let srt = build_srt(transcript, window);
            if srt.is_empty() {
                None
            } else {
                Some(write_srt(&self.config.work_dir, &srt)?)
            }
        } else {
            None
        };

        let outcome = render_clip(
            video_path,
            &work_path,
            window,
            srt_file.as_ref().map(|f| f.path()),
            encode,
            &self.runner,
            Some(on_progress),
        )
        .await?;
        move_file(&work_path, self.config.output_dir.join(&filename)).await?;

        metrics::counter!(
            "clipcut_clips_rendered_total",
            "subtitled" => if outcome.subtitled { "true" } else { "false" }
        )
        .increment(1);

        Ok(clip_info(index, filename, window, transcript))
    }

    async fn step(&self, task_id: &TaskId, logger: &TaskLogger, progress: u8, message: &str) {
        logger.log_progress(progress, message);
        self.store.set_progress(task_id, progress, message).await;
    }
}

/// Callback that forwards the encoded share of `window` as render events.
fn encoding_progress(
    clip: usize,
    window: &CandidateWindow,
    events: mpsc::UnboundedSender<RenderEvent>,
) -> ProgressCallback {
    let total_ms = (window.duration() * 1000.0).round() as i64;
    Arc::new(move |p: FfmpegProgress| {
        let fraction = p.percentage(total_ms) / 100.0;
        let _ = events.send(RenderEvent::Encoding { clip, fraction });
    })
}

/// Client-facing record of a rendered window, labelled with the chapter
/// its midpoint falls in.
pub fn clip_info(
    index: usize,
    filename: impl Into<String>,
    window: &CandidateWindow,
    transcript: &Transcript,
) -> ClipInfo {
    let info = ClipInfo::from_window(index, filename, window, clip_text(transcript, window));
    match transcript.chapter_at(window.midpoint()) {
        Some(chapter) => info.with_chapter(&chapter.headline),
        None => info,
    }
}

/// Text spoken during `window`.
pub fn clip_text(transcript: &Transcript, window: &CandidateWindow) -> String {
    transcript
        .sentences_in(window.start, window.end)
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipcut_models::{Chapter, Sentence, TaskStatus};

    fn pipeline(dir: &Path) -> Pipeline {
        let config = WorkerConfig::default()
            .with_work_dir(dir.join("temp"))
            .with_output_dir(dir.join("clips"));
        Pipeline::new(config, TaskStore::new())
    }

    #[test]
    fn test_selection_overrides() {
        let base = SelectionConfig::default();
        let config = JobRequest::new("u")
            .with_max_clips(2)
            .with_clip_duration(3.0)
            .selection_config(&base);
        assert_eq!(config.max_clips, 2);
        assert!((config.clip_duration_secs - 3.0).abs() < 0.001);
        assert!(config.validate().is_ok());

        let untouched = JobRequest::new("u").selection_config(&base);
        assert_eq!(untouched, base);
    }

    #[test]
    fn test_clip_text() {
        let transcript = Transcript::new(
            vec![
                Sentence::new(0.0, 5.0, "First."),
                Sentence::new(5.0, 10.0, " Second. "),
                Sentence::new(10.0, 15.0, ""),
                Sentence::new(15.0, 20.0, "Outside."),
            ],
            20.0,
        );
        let window = CandidateWindow::sentiment(2.0, 15.0, 0.9);
        assert_eq!(clip_text(&transcript, &window), "First. Second.");
    }

    #[test]
    fn test_clip_info_carries_chapter() {
        let transcript = Transcript::new(vec![Sentence::new(0.0, 30.0, "Hello.")], 30.0)
            .with_chapters(vec![
                Chapter::new(0.0, 12.0, "Intro"),
                Chapter::new(12.0, 30.0, "Demo"),
            ]);

        let window = CandidateWindow::sentiment(8.0, 20.0, 0.9);
        let info = clip_info(1, "clip_1.mp4", &window, &transcript);
        assert_eq!(info.chapter.as_deref(), Some("Demo"));
        assert_eq!(info.text, "Hello.");

        let untitled = clip_info(1, "clip_1.mp4", &window, &Transcript::new(Vec::new(), 30.0));
        assert!(untitled.chapter.is_none());
    }

    #[tokio::test]
    async fn test_render_progress_never_moves_backwards() {
        let dir = tempfile::TempDir::new().unwrap();
        let pipeline = pipeline(dir.path());
        let task_id = pipeline.store().create("u").await.task_id;

        let (tx, rx) = mpsc::unbounded_channel();
        let window = CandidateWindow::fallback(0.0, 10.0);
        let first_clip = encoding_progress(0, &window, tx.clone());

        // Half of clip 1 encoded, clip 2 done, then clip 1 restarts its encode.
        first_clip(FfmpegProgress {
            out_time_ms: 5000,
            ..Default::default()
        });
        tx.send(RenderEvent::Finished { clip: 1 }).unwrap();
        first_clip(FfmpegProgress {
            out_time_ms: 1000,
            ..Default::default()
        });
        drop(first_clip);
        drop(tx);

        pipeline.report_render_progress(&task_id, 2, rx).await;

        let record = pipeline.store().get(&task_id).await.unwrap();
        assert_eq!(record.progress, 87);
        assert_eq!(record.message, "Created clip 1 of 2");
    }

    #[tokio::test]
    async fn test_cancelled_pipeline_fails_jobs() {
        let dir = tempfile::TempDir::new().unwrap();
        let pipeline = pipeline(dir.path());
        assert!(!pipeline.is_cancelled());

        pipeline.cancel();
        assert!(pipeline.is_cancelled());

        let task_id = pipeline.store().create("u").await.task_id;
        let result = pipeline
            .run(&task_id, &JobRequest::new("https://youtu.be/dQw4w9WgXcQ"))
            .await;
        assert!(matches!(result, Err(WorkerError::Cancelled)));

        let record = pipeline.store().get(&task_id).await.unwrap();
        assert_eq!(record.status, TaskStatus::Error);
        assert_eq!(record.message, "Error: Processing was cancelled");
    }

    #[test]
    fn test_no_api_key_disables_transcription() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(!pipeline(dir.path()).has_transcriber());
    }

    #[tokio::test]
    async fn test_invalid_url_fails_task() {
        let dir = tempfile::TempDir::new().unwrap();
        let pipeline = pipeline(dir.path());
        let task_id = pipeline.store().create("https://example.com/video").await.task_id;

        let result = pipeline
            .run(&task_id, &JobRequest::new("https://example.com/video"))
            .await;
        assert!(matches!(result, Err(WorkerError::InvalidUrl(_))));

        let record = pipeline.store().get(&task_id).await.unwrap();
        assert_eq!(record.status, TaskStatus::Error);
        assert_eq!(record.progress, 0);
        assert_eq!(record.message, "Please enter a valid YouTube URL");
    }

    #[tokio::test]
    async fn test_invalid_override_fails_task() {
        let dir = tempfile::TempDir::new().unwrap();
        let pipeline = pipeline(dir.path());
        let task_id = pipeline.store().create("u").await.task_id;

        let request = JobRequest::new("https://youtu.be/dQw4w9WgXcQ").with_max_clips(0);
        let result = pipeline.run(&task_id, &request).await;
        assert!(matches!(result, Err(WorkerError::Selection(_))));
        assert_eq!(
            pipeline.store().get(&task_id).await.unwrap().status,
            TaskStatus::Error
        );
    }
}
