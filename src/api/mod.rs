//! HTTP surface over the orchestration core.
//!
//! ## Endpoints
//!
//! - `POST /tasks` - Submit a task and run it through its agent
//! - `GET /tasks/:id` - Task snapshot
//! - `POST /webhooks/railway` - Build/deploy webhook; failures open a review task
//! - `GET /health` - Health check
//!
//! Transport concerns stop here: the handlers translate between HTTP and
//! [`Dispatcher`] and add nothing else.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::dispatch::{DispatchError, Dispatcher, TaskSubmission};
use crate::store::CodeContext;

pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tasks", post(create_task))
        .route("/tasks/:id", get(get_task))
        .route("/webhooks/railway", post(railway_webhook))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until shutdown.
pub async fn serve(host: &str, port: u16, dispatcher: Arc<Dispatcher>) -> anyhow::Result<()> {
    let state = Arc::new(AppState { dispatcher });
    let app = router(state);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(submission): Json<TaskSubmission>,
) -> Response {
    match state.dispatcher.submit(submission).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e @ DispatchError::InvalidTaskType(_)) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response()
        }
        Err(e @ DispatchError::Store(_)) => {
            (StatusCode::CONFLICT, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}

async fn get_task(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.dispatcher.get_status(&id).await {
        Some(task) => (StatusCode::OK, Json(task)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Task not found" })),
        )
            .into_response(),
    }
}

/// Railway build/deploy webhook payload (only the fields we read).
#[derive(Debug, Deserialize)]
struct RailwayWebhook {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

async fn railway_webhook(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RailwayWebhook>,
) -> Response {
    if payload.status.as_deref() == Some("failed") {
        let build_id = payload.id.unwrap_or_default();
        let submission = TaskSubmission::new("review", "Review Railway build failure")
            .with_id(format!("fix_{build_id}"))
            .with_context(vec![CodeContext::from_error(
                payload.error.unwrap_or_default(),
            )]);

        if let Err(e) = state.dispatcher.submit(submission).await {
            // Webhook retries are the sender's concern; report and move on.
            tracing::warn!(build_id = %build_id, error = %e, "webhook review task not created");
        }
    }
    Json(json!({ "status": "processing" })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::parser::ListResponseParser;
    use crate::agents::testing::{RecordingSourceControl, StaticCompletion, StubApplier, StubLogs};
    use crate::agents::{ArchitectAgent, CoderAgent, DevOpsAgent, ReviewerAgent};
    use crate::llm::CompletionClient;
    use crate::store::TaskStore;

    fn test_state() -> Arc<AppState> {
        let store = Arc::new(TaskStore::new());
        let llm: Arc<dyn CompletionClient> = Arc::new(StaticCompletion("- Tighten the validation"));
        let parser = Arc::new(ListResponseParser);
        let dispatcher = Dispatcher::new(
            Arc::clone(&store),
            Arc::new(ArchitectAgent::new(
                Arc::clone(&store),
                Arc::clone(&llm),
                parser.clone(),
            )),
            Arc::new(CoderAgent::new(
                Arc::clone(&store),
                Arc::clone(&llm),
                Arc::new(StubApplier(true)),
                Arc::new(RecordingSourceControl::new(true)),
            )),
            Arc::new(ReviewerAgent::new(
                Arc::clone(&store),
                Arc::clone(&llm),
                parser,
            )),
            Arc::new(DevOpsAgent::new(
                Arc::clone(&store),
                Arc::clone(&llm),
                Arc::new(StubLogs("error: oom")),
            )),
        );
        Arc::new(AppState {
            dispatcher: Arc::new(dispatcher),
        })
    }

    #[tokio::test]
    async fn create_then_fetch_round_trip() {
        let state = test_state();

        let submission = TaskSubmission::new("review", "check the diff").with_id("r1");
        let response = create_task(State(Arc::clone(&state)), Json(submission)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = get_task(State(Arc::clone(&state)), Path("r1".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = get_task(State(state), Path("missing".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_type_maps_to_bad_request() {
        let state = test_state();
        let response =
            create_task(State(state), Json(TaskSubmission::new("bogus", "nope"))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn duplicate_id_maps_to_conflict() {
        let state = test_state();
        let first = TaskSubmission::new("review", "first").with_id("dup");
        let second = TaskSubmission::new("review", "second").with_id("dup");

        create_task(State(Arc::clone(&state)), Json(first)).await;
        let response = create_task(State(state), Json(second)).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn failed_build_webhook_opens_review_task() {
        let state = test_state();

        let payload = RailwayWebhook {
            status: Some("failed".to_string()),
            id: Some("b42".to_string()),
            error: Some("exit code 1".to_string()),
        };
        let response = railway_webhook(State(Arc::clone(&state)), Json(payload)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let task = state.dispatcher.get_status("fix_b42").await.unwrap();
        assert_eq!(task.context[0].error_message.as_deref(), Some("exit code 1"));
    }

    #[tokio::test]
    async fn successful_build_webhook_is_ignored() {
        let state = test_state();
        let payload = RailwayWebhook {
            status: Some("success".to_string()),
            id: Some("b43".to_string()),
            error: None,
        };
        railway_webhook(State(Arc::clone(&state)), Json(payload)).await;
        assert!(state.dispatcher.get_status("fix_b43").await.is_none());
    }
}
