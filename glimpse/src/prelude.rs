//! Prelude module for convenient imports.
//!
//! This module re-exports commonly used types and traits for easy access.
//!
//! # Usage
//!
//! ```rust,ignore
//! use glimpse::prelude::*;
//! ```

pub use crate::agent::{Agent, MediaAttachments, Reasoner, RunResponse};
pub use crate::analysis::{AnalysisRequest, AnalysisResult, Analyzer, Pipeline, build_prompt};
pub use crate::chat::{ChatProvider, ChatRequest, ChatResponse, SharedChatProvider, Usage};
pub use crate::error::{Error, Result};
pub use crate::ingest::{
    FileState, Ingestor, MediaIngestion, PollPolicy, RemoteFile, RemoteHandle, wait_until_ready,
};
pub use crate::llms::{Gemini, GeminiConfig, LlmError};
pub use crate::media::{MediaAsset, MediaKind, MediaUpload, ReadinessState, ScratchFiles, TempMediaStore};
pub use crate::message::{FunctionCall, Message, Part, Role};
pub use crate::report::Report;
pub use crate::tool::{BoxedTool, DynTool, Tool, ToolBox, ToolDefinition, ToolError, ToolResult};
pub use crate::tools::{SearchResult, WebSearchArgs, WebSearchTool};

pub use tokio_util::sync::CancellationToken;
