//! Core task types shared by the store, agents, and transport layer.
//!
//! # Invariants
//! - `Task::id` is immutable after creation and unique within a store
//! - `status` only advances along Pending -> InProgress -> {Completed, Failed}
//! - `status` and `subtasks` are the only fields mutated after creation, and
//!   only through [`TaskStore`](super::TaskStore) operations

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of work a task represents; determines which agent handles it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    /// High-level planning; broken down into code subtasks
    Architecture,
    /// Code generation or modification
    Code,
    /// Code review producing fix tasks
    Review,
    /// Deployment/build triage
    Fix,
}

impl TaskType {
    /// Wire-form name of this task type.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Architecture => "architecture",
            TaskType::Code => "code",
            TaskType::Review => "review",
            TaskType::Fix => "fix",
        }
    }
}

impl FromStr for TaskType {
    type Err = UnknownTaskType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "architecture" => Ok(TaskType::Architecture),
            "code" => Ok(TaskType::Code),
            "review" => Ok(TaskType::Review),
            "fix" => Ok(TaskType::Fix),
            other => Err(UnknownTaskType(other.to_string())),
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task type string that names none of the known kinds.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown task type: {0}")]
pub struct UnknownTaskType(pub String);

/// Status of a task in its lifecycle.
///
/// # State Machine
/// ```text
/// Pending -> InProgress -> Completed
///                      \-> Failed
/// ```
/// Completed and Failed are terminal; the store silently ignores attempts to
/// leave them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting to be picked up
    Pending,
    /// Currently being handled by an agent
    InProgress,
    /// Agent finished its own step successfully
    Completed,
    /// Agent could not produce actionable output or a capability failed
    Failed,
}

impl TaskStatus {
    /// Check if the status is terminal.
    ///
    /// # Property
    /// `is_terminal() => no further transition is applied`
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    fn rank(&self) -> u8 {
        match self {
            TaskStatus::Pending => 0,
            TaskStatus::InProgress => 1,
            TaskStatus::Completed | TaskStatus::Failed => 2,
        }
    }

    /// Check whether moving to `next` is a forward transition.
    ///
    /// Skipping InProgress (Pending -> Completed) is forward; anything that
    /// would leave a terminal state or move backwards is not.
    pub fn can_advance_to(&self, next: TaskStatus) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }
}

/// Evidence attached to a task: a file, an excerpt, an error, or any mix.
///
/// Immutable once attached; purely descriptive payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// 1-based inclusive line range within `file_path`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl CodeContext {
    /// Context entry for a source file.
    pub fn for_file(path: impl Into<String>) -> Self {
        Self {
            file_path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Context entry carrying free-standing content (no file association).
    pub fn from_content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Context entry carrying only failure text.
    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn with_lines(mut self, start: u32, end: u32) -> Self {
        self.start_line = Some(start);
        self.end_line = Some(end);
        self
    }
}

/// The unit of work flowing through the system.
///
/// Tasks form a forest: `parent_task_id` is a weak back-reference (relation
/// only, no ownership) and `subtasks` lists child ids in creation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Globally unique identifier, caller- or system-assigned
    pub id: String,

    /// Dispatch target
    #[serde(rename = "type")]
    pub task_type: TaskType,

    /// Free-text goal
    pub description: String,

    /// Evidence entries, insertion order = relevance order
    #[serde(default)]
    pub context: Vec<CodeContext>,

    /// Out-of-band parameters (e.g. a build identifier)
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,

    /// Weak reference to the originating task. May not resolve in this store;
    /// that is "unknown parent", not an error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_task_id: Option<String>,

    /// Child task ids, appended as children are created
    #[serde(default)]
    pub subtasks: Vec<String>,

    #[serde(default = "default_status")]
    pub status: TaskStatus,
}

fn default_status() -> TaskStatus {
    TaskStatus::Pending
}

impl Task {
    /// Create a pending task with no context, metadata, or links.
    pub fn new(
        id: impl Into<String>,
        task_type: TaskType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            task_type,
            description: description.into(),
            context: Vec::new(),
            metadata: HashMap::new(),
            parent_task_id: None,
            subtasks: Vec::new(),
            status: TaskStatus::Pending,
        }
    }

    pub fn with_context(mut self, context: Vec<CodeContext>) -> Self {
        self.context = context;
        self
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, serde_json::Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_task_id = Some(parent_id.into());
        self
    }

    /// File paths referenced by this task's context entries, in order.
    pub fn context_files(&self) -> Vec<String> {
        self.context
            .iter()
            .filter_map(|c| c.file_path.clone())
            .collect()
    }

    /// Look up a metadata value as a string.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }
}

/// Classification of recorded failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    #[serde(rename = "code_change_error")]
    CodeChange,
    #[serde(rename = "completion_error")]
    Completion,
    #[serde(rename = "log_fetch_error")]
    LogFetch,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::CodeChange => "code_change_error",
            ErrorKind::Completion => "completion_error",
            ErrorKind::LogFetch => "log_fetch_error",
        };
        f.write_str(name)
    }
}

/// One entry in the append-only error history. Never mutated or removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub task_id: String,
    pub kind: ErrorKind,
    pub message: String,
    pub recorded_at: DateTime<Utc>,
}

impl ErrorRecord {
    pub fn new(task_id: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            kind,
            message: message.into(),
            recorded_at: Utc::now(),
        }
    }
}
