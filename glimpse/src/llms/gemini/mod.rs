//! Google Gemini API client implementation.
//!
//! One [`Gemini`] client serves both halves of the workflow:
//! - chat completions via `models/{model}:generateContent` (see [`ChatProvider`](crate::chat::ChatProvider))
//! - file ingestion via the Files API (see [`MediaIngestion`](crate::ingest::MediaIngestion))

mod chat;
mod client;
mod config;
mod files;
mod types;

pub use client::Gemini;
pub use config::GeminiConfig;
