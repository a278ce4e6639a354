//! Model client trait for abstracting the hosted chat-completion API
//!
//! Production code talks to OpenRouter; tests script the same interface.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use crate::core::{Message, Result, ToolCall, ToolDefinition};

/// A completed (non-streamed) response from the model
#[derive(Debug, Clone, Default)]
pub struct ChatCompletion {
    /// Text content of the response
    pub content: String,
    /// Any tool calls the model wants to make
    pub tool_calls: Vec<ToolCall>,
    /// Token usage information
    pub usage: Option<TokenUsage>,
    /// Model that generated the response
    pub model: String,
}

impl ChatCompletion {
    /// Build a plain text completion (handy in tests)
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Options for a chat-completion request
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    /// Temperature for sampling (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Stop sequences
    pub stop: Option<Vec<String>>,
}

/// A chunk from a streaming response
#[derive(Debug, Clone)]
pub struct StreamChunk {
    /// Token text content
    pub content: String,
    /// Whether this is the final chunk
    pub done: bool,
}

impl StreamChunk {
    /// Create a new content chunk
    pub fn content(text: impl Into<String>) -> Self {
        Self {
            content: text.into(),
            done: false,
        }
    }

    /// Create a final/done chunk
    pub fn done() -> Self {
        Self {
            content: String::new(),
            done: true,
        }
    }
}

/// Type alias for a boxed stream of chunks
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send>>;

/// Trait for chat-completion backends
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Generate a response from messages
    async fn chat(
        &self,
        model: &str,
        messages: &[Message],
        options: Option<ChatOptions>,
    ) -> Result<ChatCompletion>;

    /// Generate a response with tool definitions
    async fn chat_with_tools(
        &self,
        model: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
        options: Option<ChatOptions>,
    ) -> Result<ChatCompletion>;

    /// Open a streaming response; chunks arrive as text deltas
    async fn open_stream(
        &self,
        model: &str,
        messages: &[Message],
        options: Option<ChatOptions>,
    ) -> Result<ChatStream>;

    /// Get the provider name
    fn name(&self) -> &str;
}
