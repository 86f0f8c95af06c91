//! Error type for the command-line front end.

use crate::config::ConfigError;

/// Result type alias for CLI commands.
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors surfaced by CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration could not be loaded, validated or saved.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Library error outside an analysis request.
    #[error(transparent)]
    Glimpse(#[from] glimpse::Error),

    /// Invalid command-line input.
    #[error("{0}")]
    Invalid(String),

    /// The analysis request failed; the message was already shown.
    #[error("analysis failed")]
    AnalysisFailed,
}

impl CliError {
    /// Create an invalid-input error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}
