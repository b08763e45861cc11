//! Shared task store: the one mutable resource of the orchestration core.
//!
//! All task records, the append-only error history, and the cross-task context
//! cache live behind a single coarse `RwLock`. Mutation goes through the
//! operations here so concurrent agent invocations serialize correctly; the
//! backing maps are never exposed. Reads hand out cloned snapshots.
//!
//! # Invariants
//! - An id, once inserted, maps to the same task for the store's lifetime
//! - `append_subtask` is an atomic read-modify-write; concurrent appends to
//!   the same parent never lose entries
//! - Status transitions are forward-only; terminal states absorb later updates

mod task;

pub use task::{
    CodeContext, ErrorKind, ErrorRecord, Task, TaskStatus, TaskType, UnknownTaskType,
};

use std::collections::HashMap;

use tokio::sync::RwLock;

/// Errors reported synchronously by store mutations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("task {id} already exists")]
    DuplicateTask { id: String },
}

#[derive(Default)]
struct StoreInner {
    tasks: HashMap<String, Task>,
    context_cache: HashMap<String, HashMap<String, serde_json::Value>>,
    errors: Vec<ErrorRecord>,
    /// Per-parent monotonic counters backing child id synthesis. Kept outside
    /// `Task` so task records stay immutable apart from status and subtasks.
    child_ordinals: HashMap<String, u64>,
}

/// Concurrency-safe repository of all tasks and error history.
pub struct TaskStore {
    inner: RwLock<StoreInner>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
        }
    }

    /// Insert a new task.
    ///
    /// # Errors
    /// `DuplicateTask` if the id is already present; the existing task is left
    /// untouched.
    pub async fn add_task(&self, task: Task) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.tasks.contains_key(&task.id) {
            return Err(StoreError::DuplicateTask { id: task.id });
        }
        tracing::debug!(task_id = %task.id, task_type = %task.task_type, "task added");
        inner.tasks.insert(task.id.clone(), task);
        Ok(())
    }

    /// Snapshot of a task by id. Not-found is a normal outcome.
    pub async fn get_task(&self, id: &str) -> Option<Task> {
        self.inner.read().await.tasks.get(id).cloned()
    }

    /// Advance a task's status.
    ///
    /// Silent no-op for unknown ids, terminal states, and backward
    /// transitions: callers race legitimately and must not crash on a task
    /// that was settled or never stored here.
    pub async fn update_task_status(&self, id: &str, status: TaskStatus) {
        let mut inner = self.inner.write().await;
        match inner.tasks.get_mut(id) {
            Some(task) if task.status.can_advance_to(status) => {
                tracing::debug!(task_id = %id, from = ?task.status, to = ?status, "status updated");
                task.status = status;
            }
            Some(task) => {
                tracing::debug!(task_id = %id, current = ?task.status, requested = ?status,
                    "ignoring non-forward status transition");
            }
            None => {
                tracing::debug!(task_id = %id, "status update for unknown task ignored");
            }
        }
    }

    /// Append a child id to a parent's subtask list.
    ///
    /// Atomic with respect to other mutations on the same parent; a missing
    /// parent is ignored.
    pub async fn append_subtask(&self, parent_id: &str, child_id: &str) {
        let mut inner = self.inner.write().await;
        match inner.tasks.get_mut(parent_id) {
            Some(parent) => parent.subtasks.push(child_id.to_string()),
            None => {
                tracing::warn!(parent_id = %parent_id, child_id = %child_id,
                    "subtask append for unknown parent ignored");
            }
        }
    }

    /// Reserve the next child ordinal for a parent.
    ///
    /// The counter is monotonic and never reused, so ids synthesized from it
    /// stay collision-free under concurrent or repeated handling passes. The
    /// parent does not need to exist in this store.
    pub async fn reserve_child_ordinal(&self, parent_id: &str) -> u64 {
        let mut inner = self.inner.write().await;
        let counter = inner.child_ordinals.entry(parent_id.to_string()).or_insert(0);
        let ordinal = *counter;
        *counter += 1;
        ordinal
    }

    /// Append to the error history.
    pub async fn add_error(&self, record: ErrorRecord) {
        tracing::warn!(task_id = %record.task_id, kind = %record.kind, error = %record.message,
            "error recorded");
        self.inner.write().await.errors.push(record);
    }

    /// Snapshot of the error history, oldest first.
    pub async fn error_history(&self) -> Vec<ErrorRecord> {
        self.inner.read().await.errors.clone()
    }

    /// Cached auxiliary context for a task, or an empty map if none cached.
    pub async fn get_related_context(&self, task_id: &str) -> HashMap<String, serde_json::Value> {
        self.inner
            .read()
            .await
            .context_cache
            .get(task_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Cache auxiliary context for cross-task sharing.
    pub async fn put_related_context(
        &self,
        task_id: impl Into<String>,
        context: HashMap<String, serde_json::Value>,
    ) {
        self.inner
            .write()
            .await
            .context_cache
            .insert(task_id.into(), context);
    }

    /// Number of stored tasks.
    pub async fn task_count(&self) -> usize {
        self.inner.read().await.tasks.len()
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}
