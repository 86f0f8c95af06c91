//! Gemini API client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::chat::ChatRequest;
use crate::error::Result;
use crate::llms::LlmError;
use crate::message::{FunctionCall, Message, Part, Role};
use crate::tool::ToolDefinition;

use super::config::GeminiConfig;
use super::types::{
    GeminiContent, GeminiErrorResponse, GeminiFileData, GeminiFunctionCall,
    GeminiFunctionDeclaration, GeminiFunctionResponse, GeminiPart, GeminiTool,
    GenerateContentRequest, GenerationConfig,
};

/// Gemini API client.
///
/// Serves both as the chat backend and as the remote media service.
#[derive(Debug, Clone)]
pub struct Gemini {
    pub(crate) config: Arc<GeminiConfig>,
    pub(crate) client: Client,
}

impl Gemini {
    pub(crate) const PROVIDER: &'static str = "gemini";

    /// Create a new Gemini client with the given configuration.
    ///
    /// A missing API key is accepted here; every call then fails with an
    /// authentication error.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        let client = builder
            .build()
            .map_err(|e| LlmError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    /// Create a client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_env() -> Result<Self> {
        Self::new(GeminiConfig::from_env())
    }

    /// Get the client configuration.
    #[must_use]
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Get the default model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn api_root(&self) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.api_version
        )
    }

    /// Build the `generateContent` URL for `model`.
    pub(crate) fn generate_url(&self, model: &str) -> String {
        format!("{}/models/{model}:generateContent", self.api_root())
    }

    /// Build the resumable upload start URL.
    pub(crate) fn upload_url(&self) -> String {
        format!(
            "{}/upload/{}/files",
            self.config.base_url.trim_end_matches('/'),
            self.config.api_version
        )
    }

    /// Build the URL of a file resource (`files/...`).
    pub(crate) fn file_url(&self, name: &str) -> String {
        format!("{}/{name}", self.api_root())
    }

    /// Fail fast when no API key is configured.
    pub(crate) fn require_api_key(&self) -> std::result::Result<(), LlmError> {
        if self.config.has_api_key() {
            Ok(())
        } else {
            Err(LlmError::auth(
                Self::PROVIDER,
                format!("API key is not configured; set {}", GeminiConfig::API_KEY_ENV),
            ))
        }
    }

    /// Attach authentication to a request.
    pub(crate) fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("x-goog-api-key", &self.config.api_key)
    }

    /// Convert a [`Part`] to Gemini format.
    pub(crate) fn convert_part(part: &Part) -> GeminiPart {
        match part {
            Part::Text { text } => GeminiPart {
                text: Some(text.clone()),
                ..GeminiPart::default()
            },
            Part::File { mime_type, uri } => GeminiPart {
                file_data: Some(GeminiFileData {
                    mime_type: mime_type.clone(),
                    file_uri: uri.clone(),
                }),
                ..GeminiPart::default()
            },
            Part::FunctionCall(call) => GeminiPart {
                function_call: Some(GeminiFunctionCall {
                    name: call.name.clone(),
                    args: call.args.clone(),
                }),
                ..GeminiPart::default()
            },
            Part::FunctionResponse { name, response } => GeminiPart {
                function_response: Some(GeminiFunctionResponse {
                    name: name.clone(),
                    response: response.clone(),
                }),
                ..GeminiPart::default()
            },
        }
    }

    /// Convert a Gemini part back, dropping parts this crate does not model.
    pub(crate) fn parse_part(part: GeminiPart) -> Option<Part> {
        if let Some(call) = part.function_call {
            return Some(Part::FunctionCall(FunctionCall {
                name: call.name,
                args: call.args,
            }));
        }
        if let Some(text) = part.text {
            return Some(Part::Text { text });
        }
        if let Some(data) = part.file_data {
            return Some(Part::file(data.mime_type, data.file_uri));
        }
        part.function_response
            .map(|r| Part::function_response(r.name, r.response))
    }

    /// Convert a [`Message`] to Gemini format.
    pub(crate) fn convert_message(msg: &Message) -> GeminiContent {
        GeminiContent {
            role: Some(msg.role.as_str().to_owned()),
            parts: msg.parts.iter().map(Self::convert_part).collect(),
        }
    }

    /// Convert Gemini content back to a [`Message`].
    pub(crate) fn parse_content(content: GeminiContent) -> Message {
        let role = match content.role.as_deref() {
            Some("user") => Role::User,
            _ => Role::Model,
        };
        Message {
            role,
            parts: content.parts.into_iter().filter_map(Self::parse_part).collect(),
        }
    }

    /// Convert a [`ToolDefinition`] to a Gemini function declaration.
    pub(crate) fn convert_tool(tool: &ToolDefinition) -> GeminiFunctionDeclaration {
        GeminiFunctionDeclaration {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: tool.parameters.clone(),
        }
    }

    /// Build the request body.
    pub(crate) fn build_body(request: &ChatRequest) -> GenerateContentRequest {
        let tools = if request.tools.is_empty() {
            Vec::new()
        } else {
            vec![GeminiTool {
                function_declarations: request.tools.iter().map(Self::convert_tool).collect(),
            }]
        };

        GenerateContentRequest {
            contents: request.messages.iter().map(Self::convert_message).collect(),
            system_instruction: request.system.as_ref().map(|s| GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: Some(s.clone()),
                    ..GeminiPart::default()
                }],
            }),
            tools,
            generation_config: request.temperature.map(|t| GenerationConfig {
                temperature: Some(t),
            }),
        }
    }

    /// Parse an error response from Gemini.
    pub(crate) fn parse_error(status: u16, body: &str) -> LlmError {
        if let Ok(error_response) = serde_json::from_str::<GeminiErrorResponse>(body) {
            let error = error_response.error;
            let code = error
                .status
                .unwrap_or_else(|| error.code.unwrap_or(i64::from(status)).to_string());

            return match status {
                401 | 403 => LlmError::auth(Self::PROVIDER, error.message),
                429 => LlmError::rate_limited(Self::PROVIDER),
                _ => LlmError::provider_code(Self::PROVIDER, code, error.message),
            };
        }

        LlmError::http_status(status, body.to_owned())
    }
}
