//! Core module - shared types, configuration, and error handling

pub mod config;
pub mod error;
pub mod types;

pub use config::{ApiConfig, Config, ModelConfig, SessionConfig, StreamingConfig};
pub use error::{Result, TroupeError};
pub use types::{FunctionDefinition, Message, ToolCall, ToolDefinition};
