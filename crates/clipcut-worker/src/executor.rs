//! Job executor.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{info, warn};

use clipcut_models::TaskRecord;

use crate::config::WorkerConfig;
use crate::error::WorkerError;
use crate::pipeline::{JobRequest, Pipeline};
use crate::store::TaskStore;

/// Runs submitted jobs in the background, bounded by `max_concurrent_jobs`.
#[derive(Clone)]
pub struct JobExecutor {
    pipeline: Arc<Pipeline>,
    job_semaphore: Arc<Semaphore>,
    max_jobs: usize,
    job_timeout: Duration,
}

impl JobExecutor {
    /// Create a new job executor.
    pub fn new(config: WorkerConfig, store: TaskStore) -> Self {
        let max_jobs = config.max_concurrent_jobs.max(1);
        let job_timeout = config.job_timeout;

        info!(
            "Starting job executor with {} max concurrent jobs",
            max_jobs
        );

        Self {
            pipeline: Arc::new(Pipeline::new(config, store)),
            job_semaphore: Arc::new(Semaphore::new(max_jobs)),
            max_jobs,
            job_timeout,
        }
    }

    pub fn store(&self) -> &TaskStore {
        self.pipeline.store()
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Jobs currently holding a slot.
    pub fn active_jobs(&self) -> usize {
        self.max_jobs - self.job_semaphore.available_permits()
    }

    /// Register a task and start processing it in the background.
    ///
    /// Returns the initial record immediately; poll the store for progress.
    pub async fn submit(&self, request: JobRequest) -> TaskRecord {
        let record = self.store().create(&request.url).await;
        let executor = self.clone();
        let task_record = record.clone();

        tokio::spawn(async move {
            executor.execute(task_record, request).await;
        });

        record
    }

    /// Register a task and process it on the current task.
    ///
    /// Returns the terminal record.
    pub async fn run_to_completion(&self, request: JobRequest) -> TaskRecord {
        let record = self.store().create(&request.url).await;
        let task_id = record.task_id.clone();
        self.execute(record, request).await;
        self.store()
            .get(&task_id)
            .await
            .unwrap_or_else(|| TaskRecord::new(task_id, ""))
    }

    async fn execute(&self, record: TaskRecord, request: JobRequest) {
        let task_id = record.task_id;

        let _permit = match Arc::clone(&self.job_semaphore).try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                self.store()
                    .set_progress(&task_id, 0, "Waiting for a free worker...")
                    .await;
                match Arc::clone(&self.job_semaphore).acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        self.store()
                            .fail(&task_id, "Error: worker is shutting down")
                            .await;
                        return;
                    }
                }
            }
        };

        // The pipeline records its own outcome; only a timeout is recorded here.
        if tokio::time::timeout(self.job_timeout, self.pipeline.run(&task_id, &request))
            .await
            .is_err()
        {
            let err = WorkerError::Timeout(self.job_timeout.as_secs());
            warn!(task_id = %task_id, "{}", err);
            self.store().fail(&task_id, err.user_message()).await;
        }
    }

    /// Stop accepting slots and wait up to `timeout` for running jobs.
    ///
    /// Jobs still running at the deadline are cancelled: their FFmpeg
    /// processes are killed and their tasks fail.
    pub async fn shutdown(&self, timeout: Duration) {
        let deadline = tokio::time::Instant::now() + timeout;
        while self.active_jobs() > 0 && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        self.job_semaphore.close();

        let remaining = self.active_jobs();
        if remaining > 0 {
            warn!("Cancelling {} jobs still running at shutdown", remaining);
            self.pipeline.cancel();
        } else {
            info!("Job executor stopped");
        }
    }
}
