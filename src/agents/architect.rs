//! Architecture planning agent.

use std::sync::Arc;

use async_trait::async_trait;

use super::parser::ResponseParser;
use super::{fail_task, fail_without_output, spawn_children, task_prompt, Agent, AgentOutcome};
use crate::llm::CompletionClient;
use crate::store::{ErrorKind, Task, TaskStatus, TaskStore, TaskType};

const ROLE_PREAMBLE: &str =
    "You are an expert software architect. Break down tasks into clear, actionable subtasks.";

const INSTRUCTION: &str =
    "Break this task into smaller subtasks and provide architectural guidance.";

/// Breaks an architecture task into one or more `code` subtasks.
///
/// A plan that yields no subtasks is a failure: an architecture task with
/// nothing to delegate means the model produced no actionable output.
pub struct ArchitectAgent {
    store: Arc<TaskStore>,
    llm: Arc<dyn CompletionClient>,
    parser: Arc<dyn ResponseParser>,
}

impl ArchitectAgent {
    pub fn new(
        store: Arc<TaskStore>,
        llm: Arc<dyn CompletionClient>,
        parser: Arc<dyn ResponseParser>,
    ) -> Self {
        Self { store, llm, parser }
    }
}

#[async_trait]
impl Agent for ArchitectAgent {
    fn role(&self) -> &'static str {
        "architect"
    }

    async fn handle_task(&self, task: &Task) -> AgentOutcome {
        tracing::info!(task_id = %task.id, "planning architecture");

        let request = task_prompt(task, INSTRUCTION);
        let response = match self.llm.complete(ROLE_PREAMBLE, &request).await {
            Ok(response) => response,
            Err(e) => {
                return fail_task(&self.store, task, ErrorKind::Completion, e.to_string()).await
            }
        };

        let specs = self.parser.parse(&response);
        if specs.is_empty() {
            tracing::warn!(task_id = %task.id, "plan contained no subtasks");
            return fail_without_output(&self.store, task, "No actionable subtasks derived").await;
        }

        let subtasks =
            match spawn_children(&self.store, task, "subtask", TaskType::Code, specs).await {
                Ok(ids) => ids,
                Err(e) => return fail_without_output(&self.store, task, e.to_string()).await,
            };

        self.store
            .update_task_status(&task.id, TaskStatus::Completed)
            .await;
        tracing::info!(task_id = %task.id, subtasks = subtasks.len(), "architecture plan recorded");
        AgentOutcome::success().with_subtasks(subtasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::parser::{ChildTaskSpec, ListResponseParser};
    use crate::agents::testing::{FailingCompletion, StaticCompletion, StaticParser};
    use crate::store::Task;

    fn architecture_task() -> Task {
        Task::new("arch1", TaskType::Architecture, "split the billing service")
    }

    #[tokio::test]
    async fn plan_creates_linked_code_subtasks() {
        let store = Arc::new(TaskStore::new());
        store.add_task(architecture_task()).await.unwrap();
        let agent = ArchitectAgent::new(
            Arc::clone(&store),
            Arc::new(StaticCompletion("1. Extract invoice module\n2. Add API facade")),
            Arc::new(ListResponseParser),
        );

        let outcome = agent.handle_task(&store.get_task("arch1").await.unwrap()).await;

        assert!(outcome.is_success());
        assert_eq!(outcome.subtasks, ["arch1_subtask_0", "arch1_subtask_1"]);

        let parent = store.get_task("arch1").await.unwrap();
        assert_eq!(parent.status, TaskStatus::Completed);
        assert_eq!(parent.subtasks, outcome.subtasks);

        for (id, description) in outcome
            .subtasks
            .iter()
            .zip(["Extract invoice module", "Add API facade"])
        {
            let child = store.get_task(id).await.unwrap();
            assert_eq!(child.task_type, TaskType::Code);
            assert_eq!(child.description, description);
            assert_eq!(child.parent_task_id.as_deref(), Some("arch1"));
            assert_eq!(child.status, TaskStatus::Pending);
        }
    }

    #[tokio::test]
    async fn empty_plan_fails_the_task() {
        let store = Arc::new(TaskStore::new());
        store.add_task(architecture_task()).await.unwrap();
        let agent = ArchitectAgent::new(
            Arc::clone(&store),
            Arc::new(StaticCompletion("The task is already well factored.")),
            Arc::new(ListResponseParser),
        );

        let outcome = agent.handle_task(&store.get_task("arch1").await.unwrap()).await;

        assert!(!outcome.is_success());
        let parent = store.get_task("arch1").await.unwrap();
        assert_eq!(parent.status, TaskStatus::Failed);
        assert!(parent.subtasks.is_empty());
    }

    #[tokio::test]
    async fn completion_failure_records_error_and_creates_no_children() {
        let store = Arc::new(TaskStore::new());
        store.add_task(architecture_task()).await.unwrap();
        let agent = ArchitectAgent::new(
            Arc::clone(&store),
            Arc::new(FailingCompletion),
            Arc::new(StaticParser(vec![ChildTaskSpec::new("never created")])),
        );

        let outcome = agent.handle_task(&store.get_task("arch1").await.unwrap()).await;

        assert!(!outcome.is_success());
        assert_eq!(store.get_task("arch1").await.unwrap().status, TaskStatus::Failed);
        assert_eq!(store.task_count().await, 1);

        let history = store.error_history().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, ErrorKind::Completion);
        assert_eq!(history[0].task_id, "arch1");
    }
}
