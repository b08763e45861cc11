//! Code generation agent.

use std::sync::Arc;

use async_trait::async_trait;

use super::{fail_task, task_prompt, Agent, AgentOutcome};
use crate::integrations::{CodeApplier, SourceControl};
use crate::llm::CompletionClient;
use crate::store::{ErrorKind, Task, TaskStatus, TaskStore};

const ROLE_PREAMBLE: &str =
    "You are an expert programmer. Generate or modify code based on the given requirements.";

const INSTRUCTION: &str = "Provide the implementation or code changes needed.";

const APPLY_FAILED: &str = "Failed to apply changes";

/// Generates a change, applies it to the workspace, and commits the touched
/// files. Creates no child tasks.
pub struct CoderAgent {
    store: Arc<TaskStore>,
    llm: Arc<dyn CompletionClient>,
    applier: Arc<dyn CodeApplier>,
    scm: Arc<dyn SourceControl>,
}

impl CoderAgent {
    pub fn new(
        store: Arc<TaskStore>,
        llm: Arc<dyn CompletionClient>,
        applier: Arc<dyn CodeApplier>,
        scm: Arc<dyn SourceControl>,
    ) -> Self {
        Self {
            store,
            llm,
            applier,
            scm,
        }
    }
}

#[async_trait]
impl Agent for CoderAgent {
    fn role(&self) -> &'static str {
        "coder"
    }

    async fn handle_task(&self, task: &Task) -> AgentOutcome {
        tracing::info!(task_id = %task.id, "generating code changes");

        let request = task_prompt(task, INSTRUCTION);
        let response = match self.llm.complete(ROLE_PREAMBLE, &request).await {
            Ok(response) => response,
            Err(e) => {
                return fail_task(&self.store, task, ErrorKind::Completion, e.to_string()).await
            }
        };

        if !self.applier.apply(task, &response).await {
            return fail_task(&self.store, task, ErrorKind::CodeChange, APPLY_FAILED).await;
        }

        // Commit whichever files the task's evidence names.
        let files = task.context_files();
        let message = format!("feat: {}", task.description);
        if !self.scm.commit(&files, &message).await {
            return fail_task(&self.store, task, ErrorKind::CodeChange, APPLY_FAILED).await;
        }

        self.store
            .update_task_status(&task.id, TaskStatus::Completed)
            .await;
        tracing::info!(task_id = %task.id, files = files.len(), "changes applied and committed");
        AgentOutcome::success()
    }
}
