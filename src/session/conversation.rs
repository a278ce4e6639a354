//! Conversation history management
//!
//! Maintains chat history with configurable limits. Only user and
//! assistant messages live here; system prompts are supplied per turn by
//! the workflow because the active persona can change between turns.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::core::Message;

/// Manages conversation history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Message history
    messages: VecDeque<Message>,
    /// Maximum history length
    max_length: usize,
}

impl Conversation {
    /// Create a new conversation
    pub fn new(max_length: usize) -> Self {
        Self {
            messages: VecDeque::new(),
            max_length,
        }
    }

    /// Rebuild a conversation from persisted messages
    ///
    /// Only role and content survive a resume; anything beyond the storage
    /// limit is evicted oldest-first, same as live appends.
    pub fn from_messages(messages: Vec<Message>, max_length: usize) -> Self {
        let mut conversation = Self::new(max_length);
        for msg in messages {
            conversation.add_message(Message {
                role: msg.role,
                content: msg.content,
                tool_calls: None,
                tool_call_id: None,
            });
        }
        conversation
    }

    /// Add a user message
    pub fn add_user(&mut self, content: impl Into<String>) {
        self.add_message(Message::user(content));
    }

    /// Add an assistant message
    pub fn add_assistant(&mut self, content: impl Into<String>) {
        self.add_message(Message::assistant(content));
    }

    /// Add a message and maintain size limit
    fn add_message(&mut self, message: Message) {
        self.messages.push_back(message);

        while self.messages.len() > self.max_length {
            self.messages.pop_front();
        }
    }

    /// Get the stored history
    pub fn messages(&self) -> &VecDeque<Message> {
        &self.messages
    }

    /// Clone the history for persistence
    pub fn to_messages(&self) -> Vec<Message> {
        self.messages.iter().cloned().collect()
    }

    /// Get the last user message
    pub fn last_user_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == "user")
    }

    /// Get the last assistant message
    pub fn last_assistant_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == "assistant")
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Get message count
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Get the most recent `window_size` messages
    ///
    /// This is what the model sees; older history stays in storage only.
    pub fn context_window(&self, window_size: usize) -> Vec<Message> {
        let len = self.messages.len();
        let start = len.saturating_sub(window_size);
        self.messages.iter().skip(start).cloned().collect()
    }
}
