//! OpenRouter client implementation
//!
//! Async HTTP client for the OpenAI-compatible chat completions API with
//! tool calling and SSE streaming support.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

use crate::core::{Config, Message, Result, ToolCall, ToolDefinition, TroupeError};
use crate::llm::traits::{
    ChatCompletion, ChatOptions, ChatStream, ModelClient, StreamChunk, TokenUsage,
};

/// OpenRouter API client
#[derive(Clone)]
pub struct OpenRouterClient {
    client: Client,
    completions_url: String,
    api_key: String,
}

/// Chat completions request body
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
    stream: bool,
}

/// Message in the OpenAI wire format
#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

/// Tool call in the OpenAI wire format; arguments travel as a JSON string
#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type")]
    call_type: String,
    function: WireFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    arguments: String,
}

/// Chat completions response (non-streaming)
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    model: String,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

/// One SSE data payload in a streaming response
#[derive(Debug, Deserialize)]
struct StreamEvent {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

impl OpenRouterClient {
    /// Create a client from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();

        let client = Client::builder()
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .build()
            .map_err(TroupeError::from)?;

        Ok(Self {
            client,
            completions_url: config.completions_url(),
            api_key,
        })
    }

    /// Convert internal Message to the wire format
    fn to_wire_message(msg: &Message) -> WireMessage {
        WireMessage {
            role: msg.role.clone(),
            content: msg.content.clone(),
            tool_calls: msg.tool_calls.as_ref().map(|calls| {
                calls
                    .iter()
                    .enumerate()
                    .map(|(i, tc)| WireToolCall {
                        id: tc.id.clone().unwrap_or_else(|| format!("call_{}", i)),
                        call_type: "function".to_string(),
                        function: WireFunctionCall {
                            name: tc.name.clone(),
                            arguments: serde_json::to_string(&tc.arguments)
                                .unwrap_or_else(|_| "{}".to_string()),
                        },
                    })
                    .collect()
            }),
            tool_call_id: msg.tool_call_id.clone(),
        }
    }

    /// Convert a wire response to a ChatCompletion
    fn to_completion(response: ChatResponse) -> Result<ChatCompletion> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| TroupeError::api("Response contained no choices"))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolCall {
                id: Some(tc.id),
                name: tc.function.name,
                // Arguments arrive as a JSON-encoded string
                arguments: serde_json::from_str(&tc.function.arguments)
                    .unwrap_or(serde_json::Value::Null),
            })
            .collect();

        let usage = response.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(ChatCompletion {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
            usage,
            model: response.model,
        })
    }

    /// Issue a chat completions request and check the HTTP status
    async fn post_request(&self, request: &ChatRequest<'_>, model: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(&self.completions_url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    TroupeError::api(format!(
                        "Cannot reach OpenRouter at {}. Check your network",
                        self.completions_url
                    ))
                } else {
                    TroupeError::from(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 401 {
                return Err(TroupeError::api(
                    "Authentication failed. Check OPENROUTER_API_KEY",
                ));
            }
            if status.as_u16() == 404 {
                return Err(TroupeError::ModelRejected(model.to_string()));
            }

            return Err(TroupeError::api(format!(
                "API error ({}): {}",
                status, error_text
            )));
        }

        Ok(response)
    }

    async fn chat_internal(
        &self,
        model: &str,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        options: Option<ChatOptions>,
    ) -> Result<ChatCompletion> {
        let options = options.unwrap_or_default();
        let request = ChatRequest {
            model,
            messages: messages.iter().map(Self::to_wire_message).collect(),
            tools,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            stop: options.stop,
            stream: false,
        };

        debug!(model, tools = tools.map(|t| t.len()).unwrap_or(0), "chat request");

        let response = self.post_request(&request, model).await?;
        let response_text = response.text().await?;

        let chat_response: ChatResponse = serde_json::from_str(&response_text)
            .map_err(|e| TroupeError::api(format!("Failed to parse response: {}", e)))?;

        Self::to_completion(chat_response)
    }

    /// Parse one SSE line into a stream item, if it carries one
    ///
    /// Keep-alive comments, empty lines, and payloads without a text delta
    /// yield nothing; `[DONE]` and a finish_reason map to the done item.
    fn parse_sse_line(line: &str) -> Option<SseItem> {
        let line = line.trim();
        if line.is_empty() || line.starts_with(':') {
            return None;
        }
        let payload = line.strip_prefix("data:")?.trim();
        if payload == "[DONE]" {
            return Some(SseItem::Done);
        }

        let event: StreamEvent = serde_json::from_str(payload).ok()?;
        let choice = event.choices.into_iter().next()?;
        if let Some(text) = choice.delta.content.filter(|t| !t.is_empty()) {
            return Some(SseItem::Text(text));
        }
        if choice.finish_reason.is_some() {
            return Some(SseItem::Done);
        }
        None
    }
}

/// What a parsed SSE line contributes to the chunk stream
enum SseItem {
    Text(String),
    Done,
}

#[async_trait]
impl ModelClient for OpenRouterClient {
    async fn chat(
        &self,
        model: &str,
        messages: &[Message],
        options: Option<ChatOptions>,
    ) -> Result<ChatCompletion> {
        self.chat_internal(model, messages, None, options).await
    }

    async fn chat_with_tools(
        &self,
        model: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
        options: Option<ChatOptions>,
    ) -> Result<ChatCompletion> {
        self.chat_internal(model, messages, Some(tools), options)
            .await
    }

    async fn open_stream(
        &self,
        model: &str,
        messages: &[Message],
        options: Option<ChatOptions>,
    ) -> Result<ChatStream> {
        let options = options.unwrap_or_default();
        let request = ChatRequest {
            model,
            messages: messages.iter().map(Self::to_wire_message).collect(),
            tools: None,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            stop: options.stop,
            stream: true,
        };

        debug!(model, "stream request");

        let response = self.post_request(&request, model).await?;

        // Bridge the SSE body into a chunk stream the caller can drain
        let (tx, rx) = tokio::sync::mpsc::channel::<Result<StreamChunk>>(32);

        tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            let mut buffer = String::new();
            let mut finished = false;

            'outer: while let Some(chunk_result) = byte_stream.next().await {
                let bytes = match chunk_result {
                    Ok(b) => b,
                    Err(e) => {
                        let _ = tx
                            .send(Err(TroupeError::api(format!("Stream error: {}", e))))
                            .await;
                        return;
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&bytes));

                // Process complete lines from the buffer
                while let Some(newline_pos) = buffer.find('\n') {
                    let line = buffer[..newline_pos].to_string();
                    buffer.drain(..=newline_pos);

                    match Self::parse_sse_line(&line) {
                        Some(SseItem::Text(text)) => {
                            if tx.send(Ok(StreamChunk::content(text))).await.is_err() {
                                // Receiver dropped; stop reading
                                return;
                            }
                        }
                        Some(SseItem::Done) => {
                            finished = true;
                            break 'outer;
                        }
                        None => {}
                    }
                }
            }

            if !finished {
                // Server closed the connection without a terminator; the
                // accumulated text is still the best answer we have
                debug!("stream ended without [DONE] terminator");
            }
            let _ = tx.send(Ok(StreamChunk::done())).await;
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }

    fn name(&self) -> &str {
        "openrouter"
    }
}
