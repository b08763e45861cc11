//! codecrew - HTTP server entry point.

use std::sync::Arc;

use codecrew::agents::parser::ListResponseParser;
use codecrew::agents::{ArchitectAgent, CoderAgent, DevOpsAgent, ReviewerAgent};
use codecrew::integrations::{BuildLogs, GitHubClient, RailwayClient, WorkspaceWriter};
use codecrew::llm::{AnthropicClient, CompletionClient};
use codecrew::{api, Config, Dispatcher, TaskStore};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "codecrew=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    info!(
        "Loaded configuration: model={}, repo={}/{}",
        config.model, config.github.owner, config.github.repo
    );
    if config.railway.api_key.is_none() {
        warn!("RAILWAY_API_KEY not set; build log retrieval will fail soft");
    }

    let store = Arc::new(TaskStore::new());

    let llm: Arc<dyn CompletionClient> = Arc::new(AnthropicClient::with_timeout(
        &config.anthropic_api_key,
        &config.model,
        config.max_completion_tokens,
        config.completion_timeout,
    ));
    let parser = Arc::new(ListResponseParser);
    let applier = Arc::new(WorkspaceWriter::new(&config.workspace_path));
    let scm = Arc::new(GitHubClient::new(
        &config.github.api_url,
        &config.github.token,
        &config.github.owner,
        &config.github.repo,
        &config.github.branch,
        &config.workspace_path,
    ));
    let logs: Arc<dyn BuildLogs> = Arc::new(RailwayClient::new(
        &config.railway.api_url,
        config.railway.api_key.clone().unwrap_or_default(),
    ));

    let dispatcher = Arc::new(Dispatcher::new(
        Arc::clone(&store),
        Arc::new(ArchitectAgent::new(
            Arc::clone(&store),
            Arc::clone(&llm),
            parser.clone(),
        )),
        Arc::new(CoderAgent::new(
            Arc::clone(&store),
            Arc::clone(&llm),
            applier,
            scm,
        )),
        Arc::new(ReviewerAgent::new(
            Arc::clone(&store),
            Arc::clone(&llm),
            parser,
        )),
        Arc::new(DevOpsAgent::new(Arc::clone(&store), llm, logs)),
    ));

    info!("Starting server on {}:{}", config.host, config.port);
    api::serve(&config.host, config.port, dispatcher).await
}
