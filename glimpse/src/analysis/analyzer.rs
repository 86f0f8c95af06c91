//! The analysis orchestrator.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::agent::{MediaAttachments, Reasoner};
use crate::error::{Error, Result};
use crate::ingest::{FileState, RemoteFile};

use super::{AnalysisResult, build_prompt};

/// Turns a query plus ingested media into one reasoning call.
///
/// Holds no per-request state; the injected reasoner may be shared for the
/// whole process lifetime.
#[derive(Clone)]
pub struct Analyzer {
    reasoner: Arc<dyn Reasoner>,
}

impl Analyzer {
    /// Create an orchestrator over `reasoner`.
    #[must_use]
    pub fn new(reasoner: Arc<dyn Reasoner>) -> Self {
        Self { reasoner }
    }

    /// Answer `query` using the given ready videos and uploaded images.
    ///
    /// Issues exactly one call to the reasoner; there are no retries.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyQuery`] for a blank query
    /// - [`Error::MediaNotReady`] if a video is still processing or any file failed
    /// - [`Error::Analysis`] wrapping whatever the reasoner returned
    pub async fn analyze(
        &self,
        query: &str,
        videos: &[RemoteFile],
        images: &[RemoteFile],
    ) -> Result<AnalysisResult> {
        if query.trim().is_empty() {
            return Err(Error::EmptyQuery);
        }

        let not_ready = videos
            .iter()
            .find(|f| matches!(f.state, FileState::Processing | FileState::Failed))
            .or_else(|| images.iter().find(|f| f.state == FileState::Failed));
        if let Some(file) = not_ready {
            return Err(Error::MediaNotReady {
                handle: file.handle.clone(),
            });
        }

        let prompt = build_prompt(query, images.len(), !videos.is_empty());
        let media = MediaAttachments::new(videos.to_vec(), images.to_vec());
        debug!(videos = videos.len(), images = images.len(), "running analysis");

        let response = self
            .reasoner
            .run(&prompt, &media)
            .await
            .map_err(Error::analysis)?;

        info!(steps = response.steps, chars = response.content.len(), "analysis complete");
        Ok(AnalysisResult::new(response.content))
    }
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer").finish_non_exhaustive()
    }
}
