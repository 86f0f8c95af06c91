//! Chat types and the provider trait for LLM operations.
//!
//! This module provides:
//! - [`ChatRequest`]: Request parameters for a single model turn
//! - [`ChatResponse`]: The model's reply plus token usage
//! - [`ChatProvider`]: Core trait implemented by LLM backends

use std::ops::AddAssign;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::message::Message;
use crate::tool::ToolDefinition;

/// A chat completion request to an LLM.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    /// Model identifier. Empty selects the provider's default model.
    pub model: String,
    /// System instruction.
    pub system: Option<String>,
    /// Conversation messages.
    pub messages: Vec<Message>,
    /// Tools available for the model to call.
    pub tools: Vec<ToolDefinition>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
}

impl ChatRequest {
    /// Creates a new request with the specified model.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Sets the system instruction.
    #[must_use]
    pub fn system(mut self, content: impl Into<String>) -> Self {
        self.system = Some(content.into());
        self
    }

    /// Appends a message.
    #[must_use]
    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Sets the available tools.
    #[must_use]
    pub fn tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }
}

/// Token usage reported for a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    /// Prompt tokens.
    pub input_tokens: u32,
    /// Generated tokens.
    pub output_tokens: u32,
}

impl Usage {
    /// Creates a usage record.
    #[must_use]
    pub const fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    /// Total tokens.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

impl AddAssign for Usage {
    fn add_assign(&mut self, rhs: Self) {
        self.input_tokens = self.input_tokens.saturating_add(rhs.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(rhs.output_tokens);
    }
}

/// Response from a chat completion.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// The model's message.
    pub message: Message,
    /// Why generation stopped, as reported by the provider.
    pub finish_reason: Option<String>,
    /// Token usage for this turn.
    pub usage: Usage,
}

impl ChatResponse {
    /// Creates a response from a message.
    #[must_use]
    pub const fn new(message: Message) -> Self {
        Self {
            message,
            finish_reason: None,
            usage: Usage::new(0, 0),
        }
    }

    /// Text of the response, if any.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        self.message.text()
    }
}

/// Core trait for LLM providers.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Short provider name used in logs and errors.
    fn provider_name(&self) -> &'static str;

    /// Default model used when a request leaves `model` empty.
    fn default_model(&self) -> &str;

    /// Run one chat completion.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse>;
}

/// A chat provider shared across agents and requests.
pub type SharedChatProvider = Arc<dyn ChatProvider>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_accumulates() {
        let mut usage = Usage::new(10, 5);
        usage += Usage::new(3, 2);
        assert_eq!(usage, Usage::new(13, 7));
        assert_eq!(usage.total(), 20);
    }

    #[test]
    fn request_builder() {
        let request = ChatRequest::new("gemini-2.0-flash-exp")
            .system("Be brief.")
            .message(Message::user("Hi"));
        assert_eq!(request.model, "gemini-2.0-flash-exp");
        assert_eq!(request.system.as_deref(), Some("Be brief."));
        assert_eq!(request.messages.len(), 1);
        assert!(request.tools.is_empty());
    }
}
