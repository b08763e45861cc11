//! Applies model-proposed changes to the workspace.
//!
//! The model is prompted to answer with fenced code blocks whose info string
//! is the file path, e.g.
//!
//! ````text
//! ```src/parser.rs
//! pub fn parse() {}
//! ```
//! ````
//!
//! Blocks with a bare language tag (no `/` or `.`) are prose illustrations and
//! are ignored.

use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use super::CodeApplier;
use crate::store::Task;

/// Matches a fenced block: info string on the fence line, body until the
/// closing fence.
static FILE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^```([^\n`]+?)[ \t]*\n(.*?)^```[ \t]*$").expect("valid block regex")
});

/// Writes path-annotated code blocks under a workspace root.
pub struct WorkspaceWriter {
    root: PathBuf,
}

impl WorkspaceWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Validate a block's info string as a workspace-relative file path.
    ///
    /// Rejects absolute paths and any `..`/prefix components so a response
    /// cannot write outside the workspace.
    fn sanitize(&self, candidate: &str) -> Option<PathBuf> {
        if candidate.contains(char::is_whitespace) {
            return None;
        }
        // A bare language tag carries neither separator nor extension.
        if !candidate.contains('/') && !candidate.contains('.') {
            return None;
        }
        let path = Path::new(candidate);
        if path
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            Some(self.root.join(path))
        } else {
            None
        }
    }
}

#[async_trait]
impl CodeApplier for WorkspaceWriter {
    async fn apply(&self, task: &Task, proposed: &str) -> bool {
        let mut written = 0usize;
        for captures in FILE_BLOCK.captures_iter(proposed) {
            let info = captures.get(1).map_or("", |m| m.as_str());
            let body = captures.get(2).map_or("", |m| m.as_str());

            let Some(target) = self.sanitize(info) else {
                if info.contains('/') || info.contains('.') {
                    tracing::error!(task_id = %task.id, path = %info, "rejected unsafe file path");
                    return false;
                }
                continue;
            };

            if let Some(parent) = target.parent() {
                if let Err(e) = tokio::fs::create_dir_all(parent).await {
                    tracing::error!(task_id = %task.id, error = %e, "failed to create directory");
                    return false;
                }
            }
            if let Err(e) = tokio::fs::write(&target, body).await {
                tracing::error!(task_id = %task.id, path = %target.display(), error = %e,
                    "failed to write file");
                return false;
            }
            tracing::debug!(task_id = %task.id, path = %target.display(), "file written");
            written += 1;
        }

        if written == 0 {
            tracing::warn!(task_id = %task.id, "response contained no applicable file blocks");
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TaskType;

    fn task() -> Task {
        Task::new("t1", TaskType::Code, "write files")
    }

    #[tokio::test]
    async fn writes_path_annotated_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let writer = WorkspaceWriter::new(dir.path());

        let proposed = "Here is the change:\n\n\
            ```src/lib.rs\npub mod parser;\n```\n\n\
            and a helper:\n\n\
            ```src/parser.rs\npub fn parse() {}\n```\n";

        assert!(writer.apply(&task(), proposed).await);
        let lib = std::fs::read_to_string(dir.path().join("src/lib.rs")).unwrap();
        assert_eq!(lib, "pub mod parser;\n");
        let parser = std::fs::read_to_string(dir.path().join("src/parser.rs")).unwrap();
        assert_eq!(parser, "pub fn parse() {}\n");
    }

    #[tokio::test]
    async fn ignores_language_tagged_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let writer = WorkspaceWriter::new(dir.path());

        // Only a prose illustration, nothing to apply.
        let proposed = "```rust\nlet x = 1;\n```\n";
        assert!(!writer.apply(&task(), proposed).await);
    }

    #[tokio::test]
    async fn rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let writer = WorkspaceWriter::new(dir.path());

        let proposed = "```../evil.sh\nrm -rf /\n```\n";
        assert!(!writer.apply(&task(), proposed).await);
        assert!(!dir.path().parent().unwrap().join("evil.sh").exists());
    }

    #[tokio::test]
    async fn empty_response_applies_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let writer = WorkspaceWriter::new(dir.path());
        assert!(!writer.apply(&task(), "no code here").await);
    }
}
