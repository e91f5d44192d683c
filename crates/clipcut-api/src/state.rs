//! Application state.

use std::path::PathBuf;
use std::sync::Arc;

use clipcut_worker::{JobExecutor, TaskStore, WorkerConfig};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub executor: JobExecutor,
    /// Directory finished clips are served from.
    pub output_dir: PathBuf,
}

impl AppState {
    /// Create application state around a fresh executor and task store.
    pub fn new(config: ApiConfig, worker: WorkerConfig) -> Self {
        let output_dir = worker.output_dir.clone();
        let store = TaskStore::with_ttl(worker.task_ttl);
        let executor = JobExecutor::new(worker, store);
        Self {
            config: Arc::new(config),
            executor,
            output_dir,
        }
    }

    pub fn store(&self) -> &TaskStore {
        self.executor.store()
    }
}
