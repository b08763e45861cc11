//! Agent result payloads.

use serde::{Deserialize, Serialize};

/// Whether an agent's own handling step succeeded.
///
/// Success is independent of whether downstream child tasks later fail; there
/// is no cross-task error propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Failed,
}

/// Result of one task handling pass, naming every child task created so
/// callers can track them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentOutcome {
    pub status: OutcomeStatus,

    /// Subtasks created by the architect
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<String>,

    /// Fix tasks created by the reviewer
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fix_tasks: Vec<String>,

    /// Review task created by devops triage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_task: Option<String>,

    /// Fix task created by devops build-failure handling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_task: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentOutcome {
    pub fn success() -> Self {
        Self {
            status: OutcomeStatus::Success,
            subtasks: Vec::new(),
            fix_tasks: Vec::new(),
            review_task: None,
            fix_task: None,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Failed,
            subtasks: Vec::new(),
            fix_tasks: Vec::new(),
            review_task: None,
            fix_task: None,
            error: Some(error.into()),
        }
    }

    pub fn with_subtasks(mut self, ids: Vec<String>) -> Self {
        self.subtasks = ids;
        self
    }

    pub fn with_fix_tasks(mut self, ids: Vec<String>) -> Self {
        self.fix_tasks = ids;
        self
    }

    pub fn with_review_task(mut self, id: impl Into<String>) -> Self {
        self.review_task = Some(id.into());
        self
    }

    pub fn with_fix_task(mut self, id: impl Into<String>) -> Self {
        self.fix_task = Some(id.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}
