//! Gemini ChatProvider implementation.

use async_trait::async_trait;
use tracing::debug;

use crate::chat::{ChatProvider, ChatRequest, ChatResponse, Usage};
use crate::error::Result;
use crate::llms::LlmError;

use super::client::Gemini;
use super::types::GenerateContentResponse;

impl Gemini {
    /// Parse the response into a [`ChatResponse`].
    pub(crate) fn parse_response(response: GenerateContentResponse) -> Result<ChatResponse> {
        let usage = response
            .usage_metadata
            .map(|u| Usage::new(u.prompt_token_count, u.candidates_token_count))
            .unwrap_or_default();

        let Some(candidate) = response.candidates.into_iter().next() else {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "empty candidates".to_owned());
            return Err(LlmError::response_format("at least one candidate", reason).into());
        };

        let content = candidate
            .content
            .ok_or_else(|| LlmError::response_format("candidate content", "missing content"))?;

        Ok(ChatResponse {
            message: Self::parse_content(content),
            finish_reason: candidate.finish_reason,
            usage,
        })
    }
}

#[async_trait]
impl ChatProvider for Gemini {
    fn provider_name(&self) -> &'static str {
        Self::PROVIDER
    }

    fn default_model(&self) -> &str {
        self.model()
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.require_api_key()?;

        let model = if request.model.is_empty() {
            self.model()
        } else {
            request.model.as_str()
        };
        let url = self.generate_url(model);
        let body = Self::build_body(request);
        debug!(model, messages = request.messages.len(), tools = request.tools.len(), "gemini chat request");

        let response = self
            .authorize(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(LlmError::from)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Self::parse_error(status.as_u16(), &error_text).into());
        }

        let response_text = response.text().await.map_err(LlmError::from)?;
        let parsed: GenerateContentResponse = serde_json::from_str(&response_text).map_err(|e| {
            LlmError::response_format(
                "valid Gemini response",
                format!("parse error: {e}, response: {response_text}"),
            )
        })?;

        Self::parse_response(parsed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::Error;
    use crate::llms::GeminiConfig;
    use crate::message::Role;

    fn parse(value: serde_json::Value) -> Result<ChatResponse> {
        Gemini::parse_response(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn parses_text_and_usage() {
        let response = parse(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "A red "}, {"text": "bicycle."}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 812, "candidatesTokenCount": 40, "totalTokenCount": 852}
        }))
        .unwrap();

        assert_eq!(response.message.role, Role::Model);
        assert_eq!(response.text().as_deref(), Some("A red bicycle."));
        assert_eq!(response.finish_reason.as_deref(), Some("STOP"));
        assert_eq!(response.usage, Usage::new(812, 40));
    }

    #[test]
    fn parses_function_calls() {
        let response = parse(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"functionCall": {"name": "web_search", "args": {"query": "bike prices"}}}
                ]}
            }]
        }))
        .unwrap();

        let calls = response.message.function_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "web_search");
    }

    #[test]
    fn blocked_prompt_is_a_format_error() {
        let err = parse(json!({"promptFeedback": {"blockReason": "SAFETY"}})).unwrap_err();
        assert!(matches!(err, Error::Llm(LlmError::ResponseFormat { ref got, .. }) if got == "SAFETY"));
    }

    #[tokio::test]
    async fn chat_without_key_fails_with_auth() {
        let gemini = Gemini::new(GeminiConfig::default().with_base_url("http://127.0.0.1:9")).unwrap();
        let err = gemini
            .chat(&ChatRequest::new("").message(crate::message::Message::user("hi")))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Llm(LlmError::Auth { .. })));
    }
}
