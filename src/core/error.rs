//! Custom error types for Troupe
//!
//! Provides a unified error handling system across all modules.

use thiserror::Error;

/// Main error type for Troupe operations
#[derive(Error, Debug)]
pub enum TroupeError {
    /// The LLM backend could not be reached at all
    #[error("Upstream unavailable: cannot reach {endpoint} ({detail})")]
    UpstreamUnavailable { endpoint: String, detail: String },

    /// The LLM backend answered, but not with a usable completion
    #[error("Upstream protocol error from {endpoint}: {detail}")]
    UpstreamProtocol { endpoint: String, detail: String },

    /// The LLM backend returned zero-length text
    #[error("Model '{model}' returned an empty response")]
    EmptyResponse { model: String },

    /// act() was invoked without a pending action from think()
    #[error("Role '{role}' has no pending action; think() must select one first")]
    ActionNotPending { role: String },

    /// A routing table entry names an action the role does not have
    #[error("Role '{role}' routes to unknown action '{action}'")]
    UnknownAction { role: String, action: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for Troupe operations
pub type Result<T> = std::result::Result<T, TroupeError>;

impl TroupeError {
    /// Create an unreachable-backend error
    pub fn unavailable(endpoint: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            endpoint: endpoint.into(),
            detail: detail.into(),
        }
    }

    /// Create a protocol-level backend error
    pub fn protocol(endpoint: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::UpstreamProtocol {
            endpoint: endpoint.into(),
            detail: detail.into(),
        }
    }

    /// Create an empty-response error
    pub fn empty_response(model: impl Into<String>) -> Self {
        Self::EmptyResponse {
            model: model.into(),
        }
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap an error with additional context
    pub fn with_context<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WithContext {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Whether this error means the backend was never reached
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable { .. })
    }
}
