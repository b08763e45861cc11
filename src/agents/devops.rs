//! Deployment and build triage agent.

use std::sync::Arc;

use async_trait::async_trait;

use super::parser::ChildTaskSpec;
use super::{fail_task, spawn_children, task_prompt, Agent, AgentOutcome};
use crate::integrations::BuildLogs;
use crate::llm::CompletionClient;
use crate::store::{CodeContext, ErrorKind, Task, TaskStatus, TaskStore, TaskType};

const TRIAGE_PREAMBLE: &str =
    "You are a DevOps expert. Analyze build logs and deployment issues.";

const BUILD_FAILURE_PREAMBLE: &str =
    "You are a DevOps expert. Analyze build failures and suggest fixes.";

/// Triages deployment issues.
///
/// `fix` tasks follow the build-failure path: fetch the build logs named by
/// `metadata["build_id"]` and spawn a `code` task carrying them as evidence.
/// Anything else is analyzed as a deployment issue and handed to review.
/// Either path produces exactly one child.
pub struct DevOpsAgent {
    store: Arc<TaskStore>,
    llm: Arc<dyn CompletionClient>,
    logs: Arc<dyn BuildLogs>,
}

impl DevOpsAgent {
    pub fn new(
        store: Arc<TaskStore>,
        llm: Arc<dyn CompletionClient>,
        logs: Arc<dyn BuildLogs>,
    ) -> Self {
        Self { store, llm, logs }
    }

    async fn handle_build_failure(&self, task: &Task) -> AgentOutcome {
        let Some(build_id) = task.metadata_str("build_id") else {
            return fail_task(
                &self.store,
                task,
                ErrorKind::LogFetch,
                "missing build_id metadata",
            )
            .await;
        };

        let build_logs = self.logs.fetch_build_logs(build_id).await;
        if build_logs.is_empty() {
            return fail_task(
                &self.store,
                task,
                ErrorKind::LogFetch,
                format!("no build logs for build {build_id}"),
            )
            .await;
        }

        let request = format!(
            "Build logs:\n{build_logs}\n\nAnalyze the build failure and suggest specific fixes."
        );
        let response = match self.llm.complete(BUILD_FAILURE_PREAMBLE, &request).await {
            Ok(response) => response,
            Err(e) => {
                return fail_task(&self.store, task, ErrorKind::Completion, e.to_string()).await
            }
        };

        // The child carries the raw logs and the proposed fixes as evidence.
        let spec = ChildTaskSpec::new("Apply build failure fixes").with_context(vec![
            CodeContext::from_content(build_logs).with_error("Build failed"),
            CodeContext::from_content(response),
        ]);

        let ids = match spawn_children(&self.store, task, "fix", TaskType::Code, vec![spec]).await {
            Ok(ids) => ids,
            Err(e) => return fail_task(&self.store, task, ErrorKind::CodeChange, e.to_string()).await,
        };

        self.store
            .update_task_status(&task.id, TaskStatus::Completed)
            .await;
        tracing::info!(task_id = %task.id, fix_task = %ids[0], "build failure routed to fix task");
        AgentOutcome::success().with_fix_task(ids.into_iter().next().unwrap_or_default())
    }

    async fn handle_deployment_issue(&self, task: &Task) -> AgentOutcome {
        let request = task_prompt(task, "Analyze the deployment issue and suggest fixes.");
        let response = match self.llm.complete(TRIAGE_PREAMBLE, &request).await {
            Ok(response) => response,
            Err(e) => {
                return fail_task(&self.store, task, ErrorKind::Completion, e.to_string()).await
            }
        };

        let spec = ChildTaskSpec::new("Review suggested deployment fixes")
            .with_context(vec![CodeContext::from_content(response)]);

        let ids =
            match spawn_children(&self.store, task, "review", TaskType::Review, vec![spec]).await {
                Ok(ids) => ids,
                Err(e) => {
                    return fail_task(&self.store, task, ErrorKind::CodeChange, e.to_string()).await
                }
            };

        self.store
            .update_task_status(&task.id, TaskStatus::Completed)
            .await;
        tracing::info!(task_id = %task.id, review_task = %ids[0], "deployment issue routed to review");
        AgentOutcome::success().with_review_task(ids.into_iter().next().unwrap_or_default())
    }
}

#[async_trait]
impl Agent for DevOpsAgent {
    fn role(&self) -> &'static str {
        "devops"
    }

    async fn handle_task(&self, task: &Task) -> AgentOutcome {
        tracing::info!(task_id = %task.id, task_type = %task.task_type, "triaging");
        if task.task_type == TaskType::Fix {
            self.handle_build_failure(task).await
        } else {
            self.handle_deployment_issue(task).await
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::agents::testing::{StaticCompletion, StubLogs};

    fn fix_task(build_id: Option<&str>) -> Task {
        let mut metadata = HashMap::new();
        if let Some(id) = build_id {
            metadata.insert("build_id".to_string(), serde_json::json!(id));
        }
        Task::new("d1", TaskType::Fix, "deployment failed").with_metadata(metadata)
    }

    #[tokio::test]
    async fn build_failure_spawns_code_fix_with_log_evidence() {
        let store = Arc::new(TaskStore::new());
        store.add_task(fix_task(Some("42"))).await.unwrap();
        let agent = DevOpsAgent::new(
            Arc::clone(&store),
            Arc::new(StaticCompletion("Pin the compiler version.")),
            Arc::new(StubLogs("error: compile failed")),
        );

        let outcome = agent.handle_task(&store.get_task("d1").await.unwrap()).await;

        assert!(outcome.is_success());
        let fix_id = outcome.fix_task.unwrap();

        let child = store.get_task(&fix_id).await.unwrap();
        assert_eq!(child.task_type, TaskType::Code);
        assert_eq!(child.description, "Apply build failure fixes");
        assert_eq!(child.parent_task_id.as_deref(), Some("d1"));
        assert!(child
            .context
            .iter()
            .any(|c| c.content.as_deref() == Some("error: compile failed")
                && c.error_message.as_deref() == Some("Build failed")));

        let parent = store.get_task("d1").await.unwrap();
        assert_eq!(parent.status, TaskStatus::Completed);
        assert_eq!(parent.subtasks, [fix_id]);
    }

    #[tokio::test]
    async fn empty_build_logs_fail_the_task() {
        let store = Arc::new(TaskStore::new());
        store.add_task(fix_task(Some("42"))).await.unwrap();
        let agent = DevOpsAgent::new(
            Arc::clone(&store),
            Arc::new(StaticCompletion("unused")),
            Arc::new(StubLogs("")),
        );

        let outcome = agent.handle_task(&store.get_task("d1").await.unwrap()).await;

        assert!(!outcome.is_success());
        assert_eq!(store.get_task("d1").await.unwrap().status, TaskStatus::Failed);
        assert_eq!(store.error_history().await[0].kind, ErrorKind::LogFetch);
        // No child was created.
        assert_eq!(store.task_count().await, 1);
    }

    #[tokio::test]
    async fn missing_build_id_fails_the_task() {
        let store = Arc::new(TaskStore::new());
        store.add_task(fix_task(None)).await.unwrap();
        let agent = DevOpsAgent::new(
            Arc::clone(&store),
            Arc::new(StaticCompletion("unused")),
            Arc::new(StubLogs("logs exist but are never fetched")),
        );

        let outcome = agent.handle_task(&store.get_task("d1").await.unwrap()).await;

        assert!(!outcome.is_success());
        assert_eq!(store.error_history().await[0].kind, ErrorKind::LogFetch);
    }

    #[tokio::test]
    async fn deployment_issue_spawns_review_task() {
        let store = Arc::new(TaskStore::new());
        store
            .add_task(Task::new("d2", TaskType::Review, "investigate rollout stall"))
            .await
            .unwrap();
        let agent = DevOpsAgent::new(
            Arc::clone(&store),
            Arc::new(StaticCompletion("Scale down the canary first.")),
            Arc::new(StubLogs("")),
        );

        let outcome = agent.handle_task(&store.get_task("d2").await.unwrap()).await;

        assert!(outcome.is_success());
        let review_id = outcome.review_task.unwrap();
        let child = store.get_task(&review_id).await.unwrap();
        assert_eq!(child.task_type, TaskType::Review);
        assert_eq!(child.description, "Review suggested deployment fixes");
        assert_eq!(
            child.context[0].content.as_deref(),
            Some("Scale down the canary first.")
        );
        assert_eq!(store.get_task("d2").await.unwrap().status, TaskStatus::Completed);
    }
}
