//! Glimpse - ask questions about videos and images.
//!
//! This crate stages user-submitted media in temporary files, uploads them to
//! a remote processing service, waits for videos to become usable, and hands
//! everything to a web-search-capable multimodal agent for a single answer.
//!
//! # Architecture
//!
//! - [`media`]: temporary media store and per-asset state
//! - [`ingest`]: remote ingestion trait and readiness polling
//! - [`analysis`]: prompt construction, orchestrator and request pipeline
//! - [`agent`]: tool-calling agent implementing [`Reasoner`](agent::Reasoner)
//! - [`llms`]: Gemini backend (chat + file ingestion)
//! - [`tools`]: built-in tools (web search)
//! - [`report`]: converts an outcome into user-facing text

pub mod agent;
pub mod analysis;
pub mod chat;
pub mod error;
pub mod ingest;
pub mod llms;
pub mod media;
pub mod message;
pub mod prelude;
pub mod report;
pub mod tool;
pub mod tools;

pub use error::{Error, Result};
pub use llms::LlmError;
pub use tool::ToolError;
