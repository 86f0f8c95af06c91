//! Message types for agent-model communication.
//!
//! A [`Message`] is a role plus an ordered list of [`Part`]s. Parts cover
//! plain text, references to remotely ingested files, and the function-call
//! round trip used for tool execution.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// End user (also carries tool results back to the model).
    User,
    /// The model.
    Model,
}

impl Role {
    /// Get the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

/// A function call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Name of the tool to call.
    pub name: String,
    /// Arguments as a JSON object.
    #[serde(default)]
    pub args: Value,
}

/// One piece of message content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Part {
    /// Text content.
    Text {
        /// The text.
        text: String,
    },
    /// Reference to a file already ingested by the remote service.
    File {
        /// MIME type of the file.
        mime_type: String,
        /// Service URI of the file.
        uri: String,
    },
    /// A tool invocation requested by the model.
    FunctionCall(FunctionCall),
    /// The result of a tool invocation.
    FunctionResponse {
        /// Name of the tool that produced the result.
        name: String,
        /// Result payload.
        response: Value,
    },
}

impl Part {
    /// Create a text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create a file reference part.
    #[must_use]
    pub fn file(mime_type: impl Into<String>, uri: impl Into<String>) -> Self {
        Self::File {
            mime_type: mime_type.into(),
            uri: uri.into(),
        }
    }

    /// Create a function response part.
    #[must_use]
    pub fn function_response(name: impl Into<String>, response: Value) -> Self {
        Self::FunctionResponse {
            name: name.into(),
            response,
        }
    }
}

/// A message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who produced the message.
    pub role: Role,
    /// Ordered content parts.
    pub parts: Vec<Part>,
}

impl Message {
    /// Create a user message with a single text part.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::text(text)],
        }
    }

    /// Create a user message from parts.
    #[must_use]
    pub const fn user_parts(parts: Vec<Part>) -> Self {
        Self {
            role: Role::User,
            parts,
        }
    }

    /// Create a model message with a single text part.
    #[must_use]
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            parts: vec![Part::text(text)],
        }
    }

    /// Append a part.
    #[must_use]
    pub fn with_part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    /// Concatenated text of all text parts, if any.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        let texts: Vec<&str> = self
            .parts
            .iter()
            .filter_map(|p| match p {
                Part::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();

        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }

    /// Function calls requested in this message, in order.
    #[must_use]
    pub fn function_calls(&self) -> Vec<&FunctionCall> {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::FunctionCall(call) => Some(call),
                _ => None,
            })
            .collect()
    }

    /// Number of file references carried by this message.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, Part::File { .. }))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_concatenates_text_parts_only() {
        let msg = Message::model("Hello, ")
            .with_part(Part::file("image/png", "https://files/1"))
            .with_part(Part::text("world"));
        assert_eq!(msg.text().as_deref(), Some("Hello, world"));
        assert_eq!(msg.file_count(), 1);
    }

    #[test]
    fn text_none_without_text_parts() {
        let msg = Message {
            role: Role::Model,
            parts: vec![Part::FunctionCall(FunctionCall {
                name: "web_search".into(),
                args: serde_json::json!({"query": "rust"}),
            })],
        };
        assert!(msg.text().is_none());
        assert_eq!(msg.function_calls().len(), 1);
        assert_eq!(msg.function_calls()[0].name, "web_search");
    }

    #[test]
    fn role_strings() {
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Model.as_str(), "model");
    }
}
