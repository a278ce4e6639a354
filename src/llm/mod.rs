//! LLM module - hosted model integrations
//!
//! Provides the model-client abstraction with OpenRouter as the backend.

pub mod openrouter;
pub mod stream;
pub mod traits;

pub use openrouter::OpenRouterClient;
pub use traits::{ChatCompletion, ChatOptions, ChatStream, ModelClient, StreamChunk, TokenUsage};
