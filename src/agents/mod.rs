//! Role-specific task handlers.
//!
//! # Agent Variants
//! - **ArchitectAgent**: breaks architecture tasks into code subtasks
//! - **CoderAgent**: generates changes, applies them, and commits
//! - **ReviewerAgent**: turns review findings into fix tasks
//! - **DevOpsAgent**: triages deployments and build failures
//!
//! # Contract
//! Every variant follows the same handling pass: build a role prompt from the
//! task, make one completion call, derive child tasks from the response,
//! register them in the store, and settle the originating task's status.
//! Capability failures are caught here and converted into failed outcomes plus
//! error-history entries; they never propagate to the dispatcher.

mod architect;
mod coder;
pub mod context;
mod devops;
pub mod parser;
mod reviewer;
mod types;

pub use architect::ArchitectAgent;
pub use coder::CoderAgent;
pub use devops::DevOpsAgent;
pub use reviewer::ReviewerAgent;
pub use types::{AgentOutcome, OutcomeStatus};

use async_trait::async_trait;

use crate::store::{ErrorKind, ErrorRecord, StoreError, Task, TaskStatus, TaskStore, TaskType};
use context::format_context;
use parser::ChildTaskSpec;

/// Common contract for all agent variants.
///
/// # Invariants
/// - `handle_task` never panics; failures come back as a Failed outcome
/// - On return, the originating task is in a terminal state and every child
///   id named in the outcome resolves in the store
#[async_trait]
pub trait Agent: Send + Sync {
    /// Human-readable role name, used in logs and routing diagnostics.
    fn role(&self) -> &'static str;

    /// Process one task to completion or failure.
    async fn handle_task(&self, task: &Task) -> AgentOutcome;
}

/// Standard user-content layout: goal, evidence, then the role instruction.
pub(crate) fn task_prompt(task: &Task, instruction: &str) -> String {
    format!(
        "Task: {}\nContext: {}\n\n{}",
        task.description,
        format_context(&task.context),
        instruction
    )
}

/// Create child tasks from parsed specs and link them under `parent`.
///
/// Child ids are `{parent}_{label}_{ordinal}` with ordinals reserved from the
/// store's per-parent counter, so ids stay unique under concurrent or repeated
/// handling passes while creation order still reads off the id.
///
/// # Postconditions
/// - Every returned id resolves in the store
/// - The parent's `subtasks` grew by exactly `specs.len()`
/// - Each child's `parent_task_id` equals `parent.id`
pub(crate) async fn spawn_children(
    store: &TaskStore,
    parent: &Task,
    label: &str,
    child_type: TaskType,
    specs: Vec<ChildTaskSpec>,
) -> Result<Vec<String>, StoreError> {
    let mut ids = Vec::with_capacity(specs.len());
    for spec in specs {
        let ordinal = store.reserve_child_ordinal(&parent.id).await;
        let child_id = format!("{}_{}_{}", parent.id, label, ordinal);
        let child = Task::new(&child_id, child_type, spec.description)
            .with_context(spec.context)
            .with_parent(&parent.id);
        store.add_task(child).await?;
        store.append_subtask(&parent.id, &child_id).await;
        ids.push(child_id);
    }
    Ok(ids)
}

/// Record a capability failure and settle the task as failed.
pub(crate) async fn fail_task(
    store: &TaskStore,
    task: &Task,
    kind: ErrorKind,
    message: impl Into<String>,
) -> AgentOutcome {
    let message = message.into();
    store
        .add_error(ErrorRecord::new(&task.id, kind, &message))
        .await;
    store.update_task_status(&task.id, TaskStatus::Failed).await;
    AgentOutcome::failure(message)
}

/// Settle the task as failed without an error-history entry (no actionable
/// output is not a capability failure).
pub(crate) async fn fail_without_output(
    store: &TaskStore,
    task: &Task,
    message: impl Into<String>,
) -> AgentOutcome {
    store.update_task_status(&task.id, TaskStatus::Failed).await;
    AgentOutcome::failure(message)
}
