//! The agent's function-calling loop.
//!
//! 1. Send the system instruction, conversation and tool declarations
//! 2. If the model asks for function calls, execute them and append results
//! 3. Repeat until the model answers with text or `max_steps` is reached

use async_trait::async_trait;
use serde_json::json;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::chat::{ChatProvider, ChatRequest, Usage};
use crate::error::{Error, Result};
use crate::llms::LlmError;
use crate::message::{FunctionCall, Message, Part};

use super::config::Agent;
use super::{MediaAttachments, Reasoner, RunResponse};

impl Agent {
    /// Build the request for the current step.
    fn build_request(&self, messages: &[Message]) -> ChatRequest {
        let mut request = ChatRequest::new(&self.model).tools(self.tools.definitions());
        if let Some(system) = self.resolve_instructions() {
            request = request.system(system);
        }
        request.messages = messages.to_vec();
        request
    }

    /// Execute one function call and wrap the outcome for the model.
    ///
    /// Tool failures are reported back to the model rather than aborting the run.
    async fn dispatch(&self, call: &FunctionCall) -> Part {
        let span = info_span!("tool", tool.name = %call.name, tool.input = %call.args);
        async {
            match self.tools.call(&call.name, call.args.clone()).await {
                Ok(value) => {
                    debug!("tool call succeeded");
                    Part::function_response(&call.name, json!({ "result": value }))
                }
                Err(e) => {
                    warn!(error = %e, "tool call failed");
                    Part::function_response(&call.name, json!({ "error": e.to_string() }))
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run_inner(&self, provider: &dyn ChatProvider, prompt: &str, media: &MediaAttachments) -> Result<RunResponse> {
        let mut parts = vec![Part::text(prompt)];
        parts.extend(media.parts());
        let mut messages = vec![Message::user_parts(parts)];
        let mut usage = Usage::default();

        for step in 1..=self.max_steps {
            let request = self.build_request(&messages);
            let response = provider.chat(&request).await?;
            usage += response.usage;

            let calls: Vec<FunctionCall> = response.message.function_calls().into_iter().cloned().collect();
            if calls.is_empty() {
                let content = response.text().ok_or_else(|| {
                    LlmError::response_format(
                        "text or function call",
                        response.finish_reason.as_deref().unwrap_or("empty message"),
                    )
                })?;
                info!(steps = step, tokens = usage.total(), "agent finished");
                return Ok(RunResponse {
                    content,
                    steps: step,
                    usage,
                });
            }

            debug!(step, calls = calls.len(), "model requested tool calls");
            messages.push(response.message);

            let mut results = Vec::with_capacity(calls.len());
            for call in &calls {
                results.push(self.dispatch(call).await);
            }
            messages.push(Message::user_parts(results));
        }

        warn!(max_steps = self.max_steps, "agent exhausted its step budget");
        Err(Error::max_steps(self.max_steps))
    }
}

#[async_trait]
impl Reasoner for Agent {
    async fn run(&self, prompt: &str, media: &MediaAttachments) -> Result<RunResponse> {
        let provider = self.provider.as_deref().ok_or_else(|| {
            LlmError::internal(format!(
                "Agent '{}' has no provider configured. Call .provider() before running.",
                self.name
            ))
        })?;

        let span = info_span!(
            "agent",
            agent.name = %self.name,
            agent.provider = provider.provider_name(),
            agent.max_steps = self.max_steps,
            media.videos = media.videos.len(),
            media.images = media.images.len(),
        );
        self.run_inner(provider, prompt, media).instrument(span).await
    }
}
