//! # codecrew
//!
//! Coordination core for collaborating AI development agents.
//!
//! Four role-specific agents (architect, coder, reviewer, devops) work on
//! hierarchical tasks held in a shared, concurrency-safe store. Agents call a
//! language-model backend and developer-tooling services through injected
//! capability contracts, and spawn follow-up tasks that feed back into the
//! same store.
//!
//! ## Task Flow
//! 1. A task arrives via the API (or a webhook)
//! 2. The dispatcher validates its type and records it in the store
//! 3. The owning agent builds a prompt from the task's evidence, makes one
//!    completion call, and derives child tasks from the response
//! 4. Children land in the store, linked under their parent; the originating
//!    task settles as completed or failed
//!
//! ## Modules
//! - `store`: shared task store and error history
//! - `agents`: the four role handlers plus prompt/parsing utilities
//! - `dispatch`: type-to-agent routing
//! - `llm`: completion capability and its Anthropic implementation
//! - `integrations`: source control, build logs, workspace application
//! - `api`: thin HTTP transport

pub mod agents;
pub mod api;
pub mod config;
pub mod dispatch;
pub mod integrations;
pub mod llm;
pub mod store;

pub use agents::{Agent, AgentOutcome, OutcomeStatus};
pub use config::Config;
pub use dispatch::{DispatchError, Dispatcher, TaskSubmission};
pub use store::{CodeContext, Task, TaskStatus, TaskStore, TaskType};
