//! Configuration schema definitions.

use std::time::Duration;

use glimpse::agent::Agent;
use glimpse::ingest::PollPolicy;
use glimpse::llms::GeminiConfig;
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Gemini backend settings.
    #[serde(default)]
    pub gemini: GeminiSection,

    /// Readiness polling bounds.
    #[serde(default)]
    pub polling: PollingConfig,

    /// Agent settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Web search tool settings.
    #[serde(default)]
    pub search: SearchConfig,
}

/// Gemini backend settings. The API key is only read from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeminiSection {
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Service root.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

impl Default for GeminiSection {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_request_timeout(),
        }
    }
}

fn default_model() -> String {
    GeminiConfig::DEFAULT_MODEL.to_owned()
}

fn default_base_url() -> String {
    GeminiConfig::DEFAULT_BASE_URL.to_owned()
}

const fn default_request_timeout() -> u64 {
    120
}

/// Readiness polling bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Milliseconds between status checks.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Overall wait limit in seconds; `0` waits until cancelled.
    #[serde(default = "default_poll_timeout")]
    pub timeout_secs: u64,
    /// Maximum number of status checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_polls: Option<u32>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            timeout_secs: default_poll_timeout(),
            max_polls: None,
        }
    }
}

impl PollingConfig {
    /// Build the library poll policy.
    #[must_use]
    pub const fn policy(&self) -> PollPolicy {
        let mut policy = PollPolicy::unbounded(Duration::from_millis(self.interval_ms));
        if self.timeout_secs > 0 {
            policy = policy.with_timeout(Duration::from_secs(self.timeout_secs));
        }
        if let Some(max) = self.max_polls {
            policy = policy.with_max_polls(max);
        }
        policy
    }
}

const fn default_interval_ms() -> u64 {
    1000
}

const fn default_poll_timeout() -> u64 {
    600
}

/// Agent settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Agent name.
    #[serde(default = "default_agent_name")]
    pub name: String,
    /// Extra system instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    /// Maximum model turns per request.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    /// Ask for markdown answers.
    #[serde(default = "default_true")]
    pub markdown: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            instructions: None,
            max_steps: default_max_steps(),
            markdown: true,
        }
    }
}

fn default_agent_name() -> String {
    "Multimodal AI Analyzer".to_owned()
}

const fn default_max_steps() -> usize {
    Agent::DEFAULT_MAX_STEPS
}

const fn default_true() -> bool {
    true
}

/// Web search tool settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Offer web search to the agent.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Maximum results per search.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_results: default_max_results(),
        }
    }
}

const fn default_max_results() -> usize {
    10
}

impl AppConfig {
    /// Check the configuration for problems.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.gemini.model.trim().is_empty() {
            issues.push(ConfigIssue::error("gemini.model", "Model must not be empty"));
        }

        if !self.gemini.base_url.starts_with("http://") && !self.gemini.base_url.starts_with("https://") {
            issues.push(ConfigIssue::error(
                "gemini.base_url",
                "Base URL must start with http:// or https://",
            ));
        }

        if self.polling.interval_ms == 0 {
            issues.push(ConfigIssue::error(
                "polling.interval_ms",
                "Poll interval must be at least 1 ms",
            ));
        }

        if self.polling.timeout_secs == 0 && self.polling.max_polls.is_none() {
            issues.push(ConfigIssue::warning(
                "polling.timeout_secs",
                "Polling is unbounded; a stalled video waits until Ctrl+C",
            ));
        }

        if self.polling.max_polls == Some(0) {
            issues.push(ConfigIssue::error(
                "polling.max_polls",
                "Max polls must be at least 1",
            ));
        }

        if self.agent.max_steps == 0 {
            issues.push(ConfigIssue::error(
                "agent.max_steps",
                "Max steps must be at least 1",
            ));
        }

        if self.search.enabled && self.search.max_results == 0 {
            issues.push(ConfigIssue::warning(
                "search.max_results",
                "Search is enabled but returns no results",
            ));
        }

        issues
    }

    /// Check if the configuration is valid (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate()
            .iter()
            .all(|issue| issue.level != IssueLevel::Error)
    }

    /// Merge environment variables into the configuration.
    #[must_use]
    pub fn with_env(mut self) -> Self {
        if let Ok(model) = std::env::var("GEMINI_MODEL")
            && !model.trim().is_empty()
        {
            self.gemini.model = model;
        }
        if let Ok(base_url) = std::env::var("GEMINI_BASE_URL")
            && !base_url.trim().is_empty()
        {
            self.gemini.base_url = base_url;
        }
        self
    }

    /// Build the Gemini client configuration with `api_key`.
    #[must_use]
    pub fn gemini_config(&self, api_key: impl Into<String>) -> GeminiConfig {
        GeminiConfig::new(api_key)
            .with_model(&self.gemini.model)
            .with_base_url(&self.gemini.base_url)
            .with_timeout(self.gemini.timeout_secs)
    }
}

/// Severity of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueLevel {
    /// The configuration cannot be used.
    Error,
    /// Usable, but probably not intended.
    Warning,
}

/// A configuration validation issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    /// Issue severity level.
    pub level: IssueLevel,
    /// Configuration path (e.g., "polling.interval_ms").
    pub path: String,
    /// Human-readable message.
    pub message: String,
}

impl ConfigIssue {
    /// Create an error-level issue.
    #[must_use]
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Error,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a warning-level issue.
    #[must_use]
    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Warning,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.level {
            IssueLevel::Error => "ERROR",
            IssueLevel::Warning => "WARN",
        };
        write!(f, "[{}] {}: {}", prefix, self.path, self.message)
    }
}
