//! Agent configuration.

use std::fmt;

use crate::chat::SharedChatProvider;
use crate::tool::{BoxedTool, Tool, ToolBox};

/// A named, tool-equipped agent backed by a chat provider.
///
/// The agent holds no conversation state; every [`run`](crate::agent::Reasoner::run)
/// starts from a fresh message list, so one instance can serve any number
/// of independent requests.
pub struct Agent {
    /// Agent name, used in logs.
    pub name: String,
    /// System instructions.
    pub instructions: Option<String>,
    /// Model override. Empty selects the provider's default model.
    pub model: String,
    /// Maximum number of model turns per run.
    pub max_steps: usize,
    /// Ask the model to answer in markdown.
    pub markdown: bool,
    pub(crate) provider: Option<SharedChatProvider>,
    pub(crate) tools: ToolBox,
}

impl Agent {
    /// Default maximum number of model turns.
    pub const DEFAULT_MAX_STEPS: usize = 8;
    /// Instruction appended when markdown output is enabled.
    pub const MARKDOWN_INSTRUCTION: &'static str = "Use markdown to format your answers.";

    /// Create an agent with the given name and no provider.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: None,
            model: String::new(),
            max_steps: Self::DEFAULT_MAX_STEPS,
            markdown: false,
            provider: None,
            tools: ToolBox::new(),
        }
    }

    /// Set the system instructions.
    #[must_use]
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Override the model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the chat provider.
    #[must_use]
    pub fn provider(mut self, provider: SharedChatProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Add a tool.
    #[must_use]
    pub fn tool<T: Tool + 'static>(mut self, tool: T) -> Self
    where
        T::Output: 'static,
    {
        self.tools.add(tool);
        self
    }

    /// Add a boxed tool.
    #[must_use]
    pub fn boxed_tool(mut self, tool: BoxedTool) -> Self {
        self.tools.add_boxed(tool);
        self
    }

    /// Set the maximum number of model turns.
    #[must_use]
    pub const fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Enable or disable markdown output.
    #[must_use]
    pub const fn markdown(mut self, markdown: bool) -> Self {
        self.markdown = markdown;
        self
    }

    /// Registered tools.
    #[must_use]
    pub const fn tools(&self) -> &ToolBox {
        &self.tools
    }

    /// Whether a provider has been configured.
    #[must_use]
    pub const fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// System instruction sent with every request, if any.
    #[must_use]
    pub fn resolve_instructions(&self) -> Option<String> {
        let mut lines: Vec<&str> = Vec::new();
        if let Some(instructions) = self.instructions.as_deref().filter(|s| !s.trim().is_empty()) {
            lines.push(instructions);
        }
        if self.markdown {
            lines.push(Self::MARKDOWN_INSTRUCTION);
        }
        (!lines.is_empty()).then(|| lines.join("\n"))
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("max_steps", &self.max_steps)
            .field("markdown", &self.markdown)
            .field("provider", &self.provider.as_ref().map(|p| p.provider_name()))
            .field("tools", &self.tools.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let agent = Agent::new("Multimodal AI Analyzer");
        assert_eq!(agent.name, "Multimodal AI Analyzer");
        assert_eq!(agent.max_steps, Agent::DEFAULT_MAX_STEPS);
        assert!(!agent.has_provider());
        assert!(agent.tools().is_empty());
        assert!(agent.resolve_instructions().is_none());
    }

    #[test]
    fn markdown_appends_instruction() {
        let agent = Agent::new("a").instructions("You analyze media.").markdown(true);
        assert_eq!(
            agent.resolve_instructions().as_deref(),
            Some("You analyze media.\nUse markdown to format your answers.")
        );
    }

    #[test]
    fn markdown_alone() {
        let agent = Agent::new("a").markdown(true);
        assert_eq!(
            agent.resolve_instructions().as_deref(),
            Some(Agent::MARKDOWN_INSTRUCTION)
        );
    }
}
