//! User-facing rendering of an analysis outcome.

use std::fmt;

use crate::analysis::AnalysisResult;
use crate::error::{Error, Result};

/// What the presentation layer should show for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// The markdown answer.
    Answer(String),
    /// Missing input; nothing was sent anywhere.
    Warning(String),
    /// The request failed.
    Failure(String),
}

impl Report {
    /// Warning shown when no query was entered.
    pub const EMPTY_QUERY_WARNING: &'static str =
        "Please enter a question or insight to analyze the media.";
    /// Heading printed above an answer.
    pub const ANSWER_HEADING: &'static str = "Analysis Result";

    /// Convert an outcome into a report. Never fails.
    #[must_use]
    pub fn from_outcome(outcome: Result<AnalysisResult>) -> Self {
        match outcome {
            Ok(result) => Self::Answer(result.content),
            Err(Error::EmptyQuery) => Self::Warning(Self::EMPTY_QUERY_WARNING.to_owned()),
            Err(Error::Analysis(inner)) => Self::failure(&inner),
            Err(e) => Self::failure(&e),
        }
    }

    fn failure(error: &Error) -> Self {
        Self::Failure(format!("An error occurred during analysis: {error}"))
    }

    /// Whether this is an answer.
    #[must_use]
    pub const fn is_answer(&self) -> bool {
        matches!(self, Self::Answer(_))
    }

    /// The text to display.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Answer(s) | Self::Warning(s) | Self::Failure(s) => s,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llms::LlmError;

    #[test]
    fn answer_is_rendered_verbatim() {
        let report = Report::from_outcome(Ok(AnalysisResult::new("A red bicycle.")));
        assert!(report.is_answer());
        assert_eq!(report.to_string(), "A red bicycle.");
    }

    #[test]
    fn empty_query_is_a_warning() {
        let report = Report::from_outcome(Err(Error::EmptyQuery));
        assert_eq!(report, Report::Warning(Report::EMPTY_QUERY_WARNING.to_owned()));
    }

    #[test]
    fn analysis_failure_shows_the_cause() {
        let err = Error::analysis(LlmError::rate_limited("gemini").into());
        let report = Report::from_outcome(Err(err));
        match report {
            Report::Failure(msg) => {
                assert!(msg.starts_with("An error occurred during analysis: "));
                assert!(msg.contains("Rate limit exceeded"));
                assert!(!msg.contains("analysis failed"));
            }
            other => unreachable!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn other_errors_are_failures() {
        let report = Report::from_outcome(Err(Error::Cancelled));
        assert_eq!(report.text(), "An error occurred during analysis: operation was cancelled");
    }
}
