//! Custom error types for Troupe
//!
//! Provides a unified error handling system across all modules.

use thiserror::Error;

/// Main error type for Troupe operations
#[derive(Error, Debug)]
pub enum TroupeError {
    /// OpenRouter connection or API errors
    #[error("OpenRouter error: {0}")]
    Api(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A plan-dependent operation ran before any plan was created
    #[error("no plan exists for this session yet")]
    PlanMissing,

    /// A plan was created while one already exists
    #[error("a plan already exists for this session")]
    PlanExists,

    /// An operation named an agent the registry does not know
    #[error("unknown agent '{0}'")]
    UnknownAgent(String),

    /// API key missing from environment and config file
    #[error("OPENROUTER_API_KEY is not set. Export it or add it to the config file")]
    MissingApiKey,

    /// The provider rejected the requested model
    #[error("model '{0}' was rejected by the provider")]
    ModelRejected(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for Troupe operations
pub type Result<T> = std::result::Result<T, TroupeError>;

impl TroupeError {
    /// Create an API error
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
