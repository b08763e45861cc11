//! Model completion capability.
//!
//! The core depends on one black-box operation: turn a role preamble plus user
//! content into text. [`CompletionClient`] is that contract;
//! [`AnthropicClient`] is the production implementation. Agents make exactly
//! one attempt per handling pass; retry policy, if any, layers above this
//! crate.

mod anthropic;

pub use anthropic::AnthropicClient;

use async_trait::async_trait;

/// Failure of the completion capability.
///
/// Classified by the transport layer so callers can distinguish quota
/// exhaustion from malformed output, but every kind is handled the same way
/// in-core: the agent converts it into a failed task plus an error-history
/// entry.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error("client error (HTTP {status}): {message}")]
    Client { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed completion response: {0}")]
    Parse(String),
}

impl CompletionError {
    /// Classify an unsuccessful HTTP status.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            429 => CompletionError::RateLimited(message),
            500..=599 => CompletionError::Server { status, message },
            _ => CompletionError::Client { status, message },
        }
    }
}

/// One blocking round trip to the language model.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Complete `user` content under the given `system` role preamble.
    ///
    /// # Errors
    /// Any transport, quota, or model failure surfaces as [`CompletionError`];
    /// a timeout configured on the client counts as a network failure.
    async fn complete(&self, system: &str, user: &str) -> Result<String, CompletionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_classification() {
        assert!(matches!(
            CompletionError::from_status(429, String::new()),
            CompletionError::RateLimited(_)
        ));
        assert!(matches!(
            CompletionError::from_status(503, String::new()),
            CompletionError::Server { status: 503, .. }
        ));
        assert!(matches!(
            CompletionError::from_status(401, String::new()),
            CompletionError::Client { status: 401, .. }
        ));
    }
}
