//! Configuration management.
//!
//! Everything is set via environment variables:
//! - `ANTHROPIC_API_KEY` - Required. API key for model completions.
//! - `CLAUDE_MODEL` - Optional. Model identifier. Defaults to `claude-sonnet-4-20250514`.
//! - `MAX_COMPLETION_TOKENS` - Optional. Completion token cap. Defaults to `1000`.
//! - `COMPLETION_TIMEOUT_SECS` - Optional. Per-call upper bound. Defaults to `120`.
//! - `GITHUB_TOKEN` - Required. Token for commit-and-push.
//! - `GITHUB_API_URL` - Optional. Defaults to `https://api.github.com`.
//! - `REPO_OWNER` / `REPO_NAME` - Required. Target repository.
//! - `MAIN_BRANCH` - Optional. Defaults to `main`.
//! - `RAILWAY_API_KEY` - Optional. Enables build log retrieval.
//! - `RAILWAY_API_URL` - Optional. Defaults to `https://railway.app/api/v2`.
//! - `WORKSPACE_PATH` - Optional. Where code changes land. Defaults to the current directory.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `8000`.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// GitHub integration settings.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub token: String,
    pub api_url: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

/// Railway integration settings.
#[derive(Debug, Clone)]
pub struct RailwayConfig {
    /// Absent key leaves build-log fetches failing soft (empty logs).
    pub api_key: Option<String>,
    pub api_url: String,
}

/// Orchestrator configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Anthropic API key
    pub anthropic_api_key: String,

    /// Model identifier for completions
    pub model: String,

    /// Token cap per completion call
    pub max_completion_tokens: u32,

    /// Upper bound for one completion round trip
    pub completion_timeout: Duration,

    pub github: GitHubConfig,

    pub railway: RailwayConfig,

    /// Directory code changes are written into
    pub workspace_path: PathBuf,

    pub host: String,

    pub port: u16,
}

fn require(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn parse_var<T: std::str::FromStr>(name: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    std::env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue(name.to_string(), e.to_string()))
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// `MissingEnvVar` for any absent required variable, `InvalidValue` for
    /// unparseable numeric ones.
    pub fn from_env() -> Result<Self, ConfigError> {
        let anthropic_api_key = require("ANTHROPIC_API_KEY")?;

        let model = std::env::var("CLAUDE_MODEL")
            .unwrap_or_else(|_| "claude-sonnet-4-20250514".to_string());

        let max_completion_tokens = parse_var("MAX_COMPLETION_TOKENS", "1000")?;
        let timeout_secs: u64 = parse_var("COMPLETION_TIMEOUT_SECS", "120")?;

        let github = GitHubConfig {
            token: require("GITHUB_TOKEN")?,
            api_url: std::env::var("GITHUB_API_URL")
                .unwrap_or_else(|_| "https://api.github.com".to_string()),
            owner: require("REPO_OWNER")?,
            repo: require("REPO_NAME")?,
            branch: std::env::var("MAIN_BRANCH").unwrap_or_else(|_| "main".to_string()),
        };

        let railway = RailwayConfig {
            api_key: std::env::var("RAILWAY_API_KEY").ok(),
            api_url: std::env::var("RAILWAY_API_URL")
                .unwrap_or_else(|_| "https://railway.app/api/v2".to_string()),
        };

        let workspace_path = std::env::var("WORKSPACE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_var("PORT", "8000")?;

        Ok(Self {
            anthropic_api_key,
            model,
            max_completion_tokens,
            completion_timeout: Duration::from_secs(timeout_secs),
            github,
            railway,
            workspace_path,
            host,
            port,
        })
    }
}
