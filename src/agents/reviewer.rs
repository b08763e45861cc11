//! Code review agent.

use std::sync::Arc;

use async_trait::async_trait;

use super::parser::ResponseParser;
use super::{fail_task, fail_without_output, spawn_children, task_prompt, Agent, AgentOutcome};
use crate::llm::CompletionClient;
use crate::store::{ErrorKind, Task, TaskStatus, TaskStore, TaskType};

const ROLE_PREAMBLE: &str =
    "You are an expert code reviewer. Analyze code changes and suggest improvements.";

const INSTRUCTION: &str = "Review the code/error and suggest specific improvements or fixes.";

const NO_SUGGESTIONS: &str = "No actionable suggestions found";

/// Turns review findings into `code`-typed fix tasks, one per suggestion.
pub struct ReviewerAgent {
    store: Arc<TaskStore>,
    llm: Arc<dyn CompletionClient>,
    parser: Arc<dyn ResponseParser>,
}

impl ReviewerAgent {
    pub fn new(
        store: Arc<TaskStore>,
        llm: Arc<dyn CompletionClient>,
        parser: Arc<dyn ResponseParser>,
    ) -> Self {
        Self { store, llm, parser }
    }
}

#[async_trait]
impl Agent for ReviewerAgent {
    fn role(&self) -> &'static str {
        "reviewer"
    }

    async fn handle_task(&self, task: &Task) -> AgentOutcome {
        tracing::info!(task_id = %task.id, "reviewing changes");

        let request = task_prompt(task, INSTRUCTION);
        let response = match self.llm.complete(ROLE_PREAMBLE, &request).await {
            Ok(response) => response,
            Err(e) => {
                return fail_task(&self.store, task, ErrorKind::Completion, e.to_string()).await
            }
        };

        let suggestions = self.parser.parse(&response);
        if suggestions.is_empty() {
            tracing::warn!(task_id = %task.id, "review yielded no suggestions");
            return fail_without_output(&self.store, task, NO_SUGGESTIONS).await;
        }

        let fix_tasks =
            match spawn_children(&self.store, task, "fix", TaskType::Code, suggestions).await {
                Ok(ids) => ids,
                Err(e) => return fail_without_output(&self.store, task, e.to_string()).await,
            };

        self.store
            .update_task_status(&task.id, TaskStatus::Completed)
            .await;
        tracing::info!(task_id = %task.id, fix_tasks = fix_tasks.len(), "review produced fixes");
        AgentOutcome::success().with_fix_tasks(fix_tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::parser::ListResponseParser;
    use crate::agents::testing::StaticCompletion;
    use crate::store::Task;

    fn review_task() -> Task {
        Task::new("r1", TaskType::Review, "review the cache layer")
    }

    #[tokio::test]
    async fn suggestions_become_fix_tasks() {
        let store = Arc::new(TaskStore::new());
        store.add_task(review_task()).await.unwrap();
        let agent = ReviewerAgent::new(
            Arc::clone(&store),
            Arc::new(StaticCompletion("- Guard against zero TTL\n- Drop the unwrap in evict")),
            Arc::new(ListResponseParser),
        );

        let outcome = agent.handle_task(&store.get_task("r1").await.unwrap()).await;

        assert!(outcome.is_success());
        assert_eq!(outcome.fix_tasks, ["r1_fix_0", "r1_fix_1"]);
        assert_eq!(store.get_task("r1").await.unwrap().status, TaskStatus::Completed);

        let fix = store.get_task("r1_fix_0").await.unwrap();
        assert_eq!(fix.task_type, TaskType::Code);
        assert_eq!(fix.description, "Guard against zero TTL");
        assert_eq!(fix.parent_task_id.as_deref(), Some("r1"));
    }

    #[tokio::test]
    async fn zero_suggestions_fails_with_empty_subtasks() {
        let store = Arc::new(TaskStore::new());
        store.add_task(review_task()).await.unwrap();
        let agent = ReviewerAgent::new(
            Arc::clone(&store),
            Arc::new(StaticCompletion("The cache layer looks solid.")),
            Arc::new(ListResponseParser),
        );

        let outcome = agent.handle_task(&store.get_task("r1").await.unwrap()).await;

        assert!(!outcome.is_success());
        assert_eq!(outcome.error.as_deref(), Some(NO_SUGGESTIONS));
        assert!(outcome.fix_tasks.is_empty());

        // The serialized outcome must not carry a populated fix_tasks key.
        let json = serde_json::to_value(&outcome).unwrap();
        assert!(json.get("fix_tasks").is_none());

        let parent = store.get_task("r1").await.unwrap();
        assert_eq!(parent.status, TaskStatus::Failed);
        assert!(parent.subtasks.is_empty());
    }
}
