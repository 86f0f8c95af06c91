//! Analysis orchestration.
//!
//! - [`build_prompt`]: the instruction handed to the reasoning step
//! - [`AnalysisRequest`] / [`AnalysisResult`]: one request and its answer
//! - [`Analyzer`]: one reasoning call over already-ingested media
//! - [`Pipeline`]: staging, ingestion, analysis and guaranteed cleanup

mod analyzer;
mod pipeline;
mod prompt;
mod request;

pub use analyzer::Analyzer;
pub use pipeline::Pipeline;
pub use prompt::build_prompt;
pub use request::{AnalysisRequest, AnalysisResult};
