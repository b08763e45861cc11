//! GitHub commit integration via the git-data API.
//!
//! Builds a commit the low-level way (blob -> tree -> commit -> ref update) so
//! multiple files land atomically on the target branch.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::SourceControl;

/// Commits workspace files to a GitHub repository branch.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    token: String,
    owner: String,
    repo: String,
    branch: String,
    workspace_root: PathBuf,
}

impl GitHubClient {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
        workspace_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            token: token.into(),
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
            workspace_root: workspace_root.into(),
        }
    }

    fn repo_url(&self, tail: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.base_url, self.owner, self.repo, tail
        )
    }

    async fn get_json(&self, url: &str) -> anyhow::Result<Value> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github.v3+json")
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn post_json(&self, url: &str, body: Value) -> anyhow::Result<Value> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github.v3+json")
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    fn sha_of(value: &Value, pointer: &str) -> anyhow::Result<String> {
        value
            .pointer(pointer)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("missing {pointer} in GitHub response"))
    }

    async fn commit_inner(&self, files: &[String], message: &str) -> anyhow::Result<()> {
        let head = self
            .get_json(&self.repo_url(&format!("git/ref/heads/{}", self.branch)))
            .await?;
        let head_sha = Self::sha_of(&head, "/object/sha")?;

        let mut tree_items = Vec::with_capacity(files.len());
        for file_path in files {
            let content =
                tokio::fs::read_to_string(self.workspace_root.join(Path::new(file_path))).await?;

            let blob = self
                .post_json(
                    &self.repo_url("git/blobs"),
                    json!({ "content": content, "encoding": "utf-8" }),
                )
                .await?;

            tree_items.push(json!({
                "path": file_path,
                "mode": "100644",
                "type": "blob",
                "sha": Self::sha_of(&blob, "/sha")?,
            }));
        }

        let tree = self
            .post_json(
                &self.repo_url("git/trees"),
                json!({ "base_tree": head_sha, "tree": tree_items }),
            )
            .await?;

        let commit = self
            .post_json(
                &self.repo_url("git/commits"),
                json!({
                    "message": message,
                    "tree": Self::sha_of(&tree, "/sha")?,
                    "parents": [head_sha],
                }),
            )
            .await?;

        self.client
            .patch(self.repo_url(&format!("git/refs/heads/{}", self.branch)))
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github.v3+json")
            .json(&json!({ "sha": Self::sha_of(&commit, "/sha")?, "force": true }))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

#[async_trait]
impl SourceControl for GitHubClient {
    async fn commit(&self, files: &[String], message: &str) -> bool {
        if files.is_empty() {
            tracing::debug!("commit requested with no files, nothing to push");
            return true;
        }
        match self.commit_inner(files, message).await {
            Ok(()) => {
                tracing::info!(branch = %self.branch, files = files.len(), "changes pushed");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to push changes");
                false
            }
        }
    }
}
