//! End-to-end request handling: stage, ingest, analyze, clean up.

use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info_span};

use crate::error::{Error, Result};
use crate::ingest::{Ingestor, RemoteFile};
use crate::media::{MediaAsset, MediaKind, ScratchFiles, TempMediaStore};

use super::{AnalysisRequest, AnalysisResult, Analyzer};

/// Runs one [`AnalysisRequest`] through every stage.
///
/// 1. Validate the query (no disk or network activity on failure)
/// 2. Stage each upload in a temporary file
/// 3. Ingest the video to readiness, then each image
/// 4. Run the analysis
/// 5. Release every temporary file, whatever the outcome
#[derive(Debug, Clone)]
pub struct Pipeline {
    store: TempMediaStore,
    ingestor: Ingestor,
    analyzer: Analyzer,
}

impl Pipeline {
    /// Create a pipeline from its stages.
    #[must_use]
    pub const fn new(store: TempMediaStore, ingestor: Ingestor, analyzer: Analyzer) -> Self {
        Self {
            store,
            ingestor,
            analyzer,
        }
    }

    /// Temporary media store used for staging.
    #[must_use]
    pub const fn store(&self) -> &TempMediaStore {
        &self.store
    }

    /// Handle one request.
    ///
    /// # Errors
    ///
    /// Any validation, storage, ingestion or analysis error, or
    /// [`Error::Cancelled`] once `cancel` fires. Temporary files are released
    /// before the error is returned.
    pub async fn run(&self, request: &AnalysisRequest, cancel: &CancellationToken) -> Result<AnalysisResult> {
        request.validate()?;

        let span = info_span!(
            "analysis",
            video = request.video().is_some(),
            images = request.images().len(),
        );

        async {
            let mut scratch = ScratchFiles::new(self.store.clone());
            let outcome = self.run_staged(request, &mut scratch, cancel).await;
            let released = scratch.release_all();
            debug!(released, ok = outcome.is_ok(), "request finished");
            outcome
        }
        .instrument(span)
        .await
    }

    async fn run_staged(
        &self,
        request: &AnalysisRequest,
        scratch: &mut ScratchFiles,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult> {
        let mut assets = Vec::new();
        for upload in request.uploads() {
            let path = scratch.stage(upload.bytes(), &upload.suffix())?;
            assets.push(MediaAsset::new(upload.kind(), path));
        }

        let files = self.ingestor.ingest_all(&mut assets, cancel).await?;

        let (videos, images): (Vec<(MediaKind, RemoteFile)>, Vec<_>) = assets
            .iter()
            .map(MediaAsset::kind)
            .zip(files)
            .partition(|(kind, _)| *kind == MediaKind::Video);
        let videos: Vec<RemoteFile> = videos.into_iter().map(|(_, f)| f).collect();
        let images: Vec<RemoteFile> = images.into_iter().map(|(_, f)| f).collect();

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(Error::Cancelled),
            result = self.analyzer.analyze(request.query(), &videos, &images) => result,
        }
    }
}
