//! Developer-tooling capabilities the core consumes but does not implement.
//!
//! Each contract folds failure into its return value (`false` / empty string)
//! instead of raising: agents treat those as capability failures and settle
//! the task, never crash.

mod github;
mod railway;
mod workspace;

pub use github::GitHubClient;
pub use railway::RailwayClient;
pub use workspace::WorkspaceWriter;

use async_trait::async_trait;

use crate::store::Task;

/// Source-control integration: land a set of files with a message.
#[async_trait]
pub trait SourceControl: Send + Sync {
    /// Commit and push the given files. `false` denotes failure, not a fault.
    async fn commit(&self, files: &[String], message: &str) -> bool;
}

/// CI/deployment log retrieval.
#[async_trait]
pub trait BuildLogs: Send + Sync {
    /// Fetch the logs for a build. An empty string denotes failure or absence.
    async fn fetch_build_logs(&self, build_id: &str) -> String;
}

/// Applies model-proposed code changes to the working tree.
#[async_trait]
pub trait CodeApplier: Send + Sync {
    /// Apply `proposed` changes for `task`. `false` denotes failure.
    async fn apply(&self, task: &Task, proposed: &str) -> bool;
}
