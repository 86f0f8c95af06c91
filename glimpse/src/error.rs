//! Unified error types for glimpse.
//!
//! [`Error`] covers every way a single analysis request can fail:
//! - input validation (empty query, unsupported files)
//! - local temporary storage
//! - remote media processing (failure, timeout, cancellation)
//! - the reasoning step (provider, tool and agent failures)

use std::time::Duration;

use crate::ingest::RemoteHandle;
use crate::llms::LlmError;
use crate::tool::ToolError;

/// Result type alias for glimpse operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for glimpse.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The request carried no query text.
    #[error("query must not be empty")]
    EmptyQuery,

    /// Writing uploaded bytes to temporary storage failed.
    #[error("failed to write temporary media: {0}")]
    MediaWrite(#[source] std::io::Error),

    /// A submitted file is not an accepted video or image format.
    #[error("unsupported media file: {0}")]
    UnsupportedMedia(String),

    /// The remote service reported that processing failed.
    #[error("media {handle} failed processing: {reason}")]
    MediaProcessing {
        /// Remote handle of the failed asset.
        handle: RemoteHandle,
        /// Reason reported by the service.
        reason: String,
    },

    /// The remote service did not finish processing within the poll bounds.
    #[error("media {handle} still processing after {waited:?} ({polls} status checks)")]
    MediaProcessingTimeout {
        /// Remote handle of the stalled asset.
        handle: RemoteHandle,
        /// Time spent waiting.
        waited: Duration,
        /// Number of status checks performed.
        polls: u32,
    },

    /// An asset was handed to the orchestrator before it was usable.
    #[error("media {handle} is not ready for analysis")]
    MediaNotReady {
        /// Remote handle of the asset.
        handle: RemoteHandle,
    },

    /// The request was cancelled while waiting.
    #[error("operation was cancelled")]
    Cancelled,

    /// The reasoning step failed.
    #[error("analysis failed: {0}")]
    Analysis(#[source] Box<Error>),

    /// LLM or remote service error.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Tool execution error.
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// The agent exhausted its step budget without a final answer.
    #[error("Maximum steps ({max_steps}) reached without final answer")]
    MaxSteps {
        /// The maximum number of steps configured.
        max_steps: usize,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap an error raised by the reasoning step.
    #[must_use]
    pub fn analysis(err: Self) -> Self {
        match err {
            already @ Self::Analysis(_) => already,
            other => Self::Analysis(Box::new(other)),
        }
    }

    /// Create a max steps error.
    #[must_use]
    pub const fn max_steps(max_steps: usize) -> Self {
        Self::MaxSteps { max_steps }
    }

    /// Create an unsupported media error.
    #[must_use]
    pub fn unsupported_media(what: impl Into<String>) -> Self {
        Self::UnsupportedMedia(what.into())
    }

    /// Whether the error stems from invalid user input rather than a failure.
    #[must_use]
    pub const fn is_user_input(&self) -> bool {
        matches!(self, Self::EmptyQuery | Self::UnsupportedMedia(_))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    mod error {
        use super::*;

        #[test]
        fn empty_query_display() {
            assert!(Error::EmptyQuery.to_string().contains("empty"));
        }

        #[test]
        fn media_write_keeps_source() {
            let io = std::io::Error::new(std::io::ErrorKind::StorageFull, "disk full");
            let err = Error::MediaWrite(io);
            let source = std::error::Error::source(&err).unwrap();
            assert!(source.to_string().contains("disk full"));
        }

        #[test]
        fn processing_timeout_mentions_handle() {
            let err = Error::MediaProcessingTimeout {
                handle: RemoteHandle::new("files/abc"),
                waited: Duration::from_secs(3),
                polls: 3,
            };
            let s = err.to_string();
            assert!(s.contains("files/abc"));
            assert!(s.contains("3 status checks"));
        }

        #[test]
        fn analysis_wraps_once() {
            let err = Error::analysis(Error::analysis(Error::max_steps(4)));
            match err {
                Error::Analysis(inner) => assert!(matches!(*inner, Error::MaxSteps { .. })),
                other => panic!("expected Analysis, got {other:?}"),
            }
        }

        #[test]
        fn from_llm_error() {
            let err: Error = LlmError::network("timeout").into();
            assert!(matches!(err, Error::Llm(_)));
        }

        #[test]
        fn from_tool_error() {
            let err: Error = ToolError::not_found("web_search").into();
            assert!(matches!(err, Error::Tool(_)));
        }

        #[test]
        fn from_json_error() {
            let json_err = serde_json::from_str::<i32>("invalid").unwrap_err();
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }

        #[test]
        fn user_input_classification() {
            assert!(Error::EmptyQuery.is_user_input());
            assert!(Error::unsupported_media("clip.mkv").is_user_input());
            assert!(!Error::Cancelled.is_user_input());
        }
    }

    mod propagation {
        use super::*;

        #[test]
        fn llm_error_bubbles_through_question_mark() {
            fn inner() -> std::result::Result<(), LlmError> {
                Err(LlmError::auth("gemini", "missing key"))
            }

            fn outer() -> Result<()> {
                inner()?;
                Ok(())
            }

            let err = outer().unwrap_err();
            assert!(matches!(err, Error::Llm(LlmError::Auth { .. })));
        }
    }
}
