//! Routing of submitted tasks to their owning agents.
//!
//! The wire form of a task names its type as a string; the dispatcher
//! validates it into [`TaskType`] *before* touching the store, so a bad
//! submission never leaves a record behind. From there, routing is an
//! exhaustive match over the enum: adding a task type without an owner fails
//! at compile time.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agents::{Agent, AgentOutcome};
use crate::store::{
    CodeContext, StoreError, Task, TaskStatus, TaskStore, TaskType, UnknownTaskType,
};

/// Wire form of a task submission.
///
/// `id` is optional; the system assigns a uuid when the caller leaves it out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSubmission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Task type name (`architecture`, `code`, `review`, `fix`)
    #[serde(rename = "type")]
    pub kind: String,

    pub description: String,

    #[serde(default)]
    pub context: Vec<CodeContext>,

    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl TaskSubmission {
    pub fn new(kind: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            kind: kind.into(),
            description: description.into(),
            context: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_context(mut self, context: Vec<CodeContext>) -> Self {
        self.context = context;
        self
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, serde_json::Value>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Errors surfaced to the submitting caller.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The submission named a type outside the routing table; nothing was
    /// stored.
    #[error("invalid task type: {0}")]
    InvalidTaskType(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Maps each task type to the agent variant responsible and invokes it.
pub struct Dispatcher {
    store: Arc<TaskStore>,
    architect: Arc<dyn Agent>,
    coder: Arc<dyn Agent>,
    reviewer: Arc<dyn Agent>,
    devops: Arc<dyn Agent>,
}

impl Dispatcher {
    pub fn new(
        store: Arc<TaskStore>,
        architect: Arc<dyn Agent>,
        coder: Arc<dyn Agent>,
        reviewer: Arc<dyn Agent>,
        devops: Arc<dyn Agent>,
    ) -> Self {
        Self {
            store,
            architect,
            coder,
            reviewer,
            devops,
        }
    }

    /// architecture -> Architect, code -> Coder, review -> Reviewer,
    /// fix -> DevOps.
    fn agent_for(&self, task_type: TaskType) -> &Arc<dyn Agent> {
        match task_type {
            TaskType::Architecture => &self.architect,
            TaskType::Code => &self.coder,
            TaskType::Review => &self.reviewer,
            TaskType::Fix => &self.devops,
        }
    }

    /// Record a submitted task and run it through its owning agent.
    ///
    /// # Errors
    /// - `InvalidTaskType` for an unknown type name (store untouched)
    /// - `Store(DuplicateTask)` for an id collision (existing task untouched)
    pub async fn submit(&self, submission: TaskSubmission) -> Result<AgentOutcome, DispatchError> {
        let task_type: TaskType = submission
            .kind
            .parse()
            .map_err(|UnknownTaskType(kind)| DispatchError::InvalidTaskType(kind))?;

        let id = submission
            .id
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let task = Task::new(&id, task_type, submission.description)
            .with_context(submission.context)
            .with_metadata(submission.metadata);

        self.store.add_task(task.clone()).await?;
        self.store
            .update_task_status(&id, TaskStatus::InProgress)
            .await;

        let agent = self.agent_for(task_type);
        tracing::info!(task_id = %id, role = agent.role(), "dispatching task");
        Ok(agent.handle_task(&task).await)
    }

    /// Snapshot of a task's current state.
    pub async fn get_status(&self, task_id: &str) -> Option<Task> {
        self.store.get_task(task_id).await
    }

    pub fn store(&self) -> &Arc<TaskStore> {
        &self.store
    }
}
