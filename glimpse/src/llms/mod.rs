//! LLM backend implementations.
//!
//! # Available Backends
//!
//! - [`gemini`] - Google Gemini API (`generateContent` + Files API)

mod error;
pub mod gemini;

pub use error::LlmError;
pub use gemini::{Gemini, GeminiConfig};
