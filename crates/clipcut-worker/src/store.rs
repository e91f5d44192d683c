//! In-memory task status store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;

use clipcut_models::{ClipInfo, TaskId, TaskRecord, WindowSource};

/// Default retention for finished task records.
pub const DEFAULT_TASK_TTL: Duration = Duration::from_secs(24 * 3600);

/// Shared status records for submitted tasks.
///
/// Cloning is cheap; clones see the same records. Updates to unknown ids
/// are ignored, and terminal records are never changed again. Completed and
/// failed records are dropped once they have been finished for longer than
/// the store's TTL; processing records are always kept.
#[derive(Debug, Clone)]
pub struct TaskStore {
    tasks: Arc<RwLock<HashMap<TaskId, TaskRecord>>>,
    ttl: Duration,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_TASK_TTL)
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            tasks: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Register a new processing task for `url`.
    ///
    /// Expired terminal records are swept first.
    pub async fn create(&self, url: impl Into<String>) -> TaskRecord {
        let record = TaskRecord::new(TaskId::new(), url);
        let mut tasks = self.tasks.write().await;
        Self::sweep(&mut tasks, self.ttl);
        tasks.insert(record.task_id.clone(), record.clone());
        record
    }

    /// Remove terminal records finished more than `ttl` ago.
    ///
    /// Returns the number of records removed.
    pub async fn evict_expired(&self) -> usize {
        let mut tasks = self.tasks.write().await;
        Self::sweep(&mut tasks, self.ttl)
    }

    fn sweep(tasks: &mut HashMap<TaskId, TaskRecord>, ttl: Duration) -> usize {
        let now = Utc::now();
        let before = tasks.len();
        tasks.retain(|_, record| {
            let expired = record.is_terminal()
                && (now - record.updated_at)
                    .to_std()
                    .map(|age| age >= ttl)
                    .unwrap_or(false);
            !expired
        });

        let removed = before - tasks.len();
        if removed > 0 {
            tracing::debug!(removed, "Evicted expired task records");
        }
        removed
    }

    pub async fn get(&self, task_id: &TaskId) -> Option<TaskRecord> {
        self.tasks.read().await.get(task_id).cloned()
    }

    pub async fn set_progress(&self, task_id: &TaskId, progress: u8, message: impl Into<String>) {
        self.update(task_id, |r| r.set_progress(progress, message)).await;
    }

    pub async fn set_plan_source(&self, task_id: &TaskId, source: Option<WindowSource>) {
        self.update(task_id, |r| r.plan_source = source).await;
    }

    pub async fn complete(&self, task_id: &TaskId, clips: Vec<ClipInfo>, message: impl Into<String>) {
        self.update(task_id, |r| r.complete(clips, message)).await;
    }

    pub async fn fail(&self, task_id: &TaskId, error: impl Into<String>) {
        self.update(task_id, |r| r.fail(error)).await;
    }

    /// All records, newest first.
    pub async fn list(&self) -> Vec<TaskRecord> {
        let mut records: Vec<TaskRecord> = self.tasks.read().await.values().cloned().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }

    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }

    async fn update(&self, task_id: &TaskId, apply: impl FnOnce(&mut TaskRecord)) {
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(task_id) {
            Some(record) if !record.is_terminal() => apply(record),
            Some(_) => tracing::debug!(task_id = %task_id, "Ignoring update to finished task"),
            None => tracing::warn!(task_id = %task_id, "Update for unknown task"),
        }
    }
}
