//! Per-kind ingestion policy.

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::error::{Error, Result};
use crate::media::MediaAsset;

use super::{FileState, MediaIngestion, PollPolicy, RemoteFile, wait_until_ready};

/// Uploads assets and waits for them to become usable.
///
/// Videos are uploaded and then polled until the service stops processing
/// them. Images are usable as soon as the upload returns and are never polled.
#[derive(Clone)]
pub struct Ingestor {
    service: Arc<dyn MediaIngestion>,
    policy: PollPolicy,
}

impl Ingestor {
    /// Create an ingestor over `service` with the default poll policy.
    #[must_use]
    pub fn new(service: Arc<dyn MediaIngestion>) -> Self {
        Self {
            service,
            policy: PollPolicy::default(),
        }
    }

    /// Replace the poll policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Poll policy applied to videos.
    #[must_use]
    pub const fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Upload one asset and, for videos, wait until it is ready.
    ///
    /// On success the asset is `Ready`; on any failure it is `Failed`.
    ///
    /// # Errors
    ///
    /// Upload errors, [`wait_until_ready`] errors, or [`Error::Cancelled`].
    #[instrument(skip_all, fields(kind = %asset.kind(), path = %asset.local_path().display()))]
    pub async fn ingest(&self, asset: &mut MediaAsset, cancel: &CancellationToken) -> Result<RemoteFile> {
        match self.ingest_inner(asset, cancel).await {
            Ok(file) => Ok(file),
            Err(e) => {
                warn!(error = %e, "media ingestion failed");
                asset.record_failure();
                Err(e)
            }
        }
    }

    /// Ingest `assets` one at a time, in order. Stops at the first failure.
    ///
    /// # Errors
    ///
    /// The first error returned by [`ingest`](Self::ingest).
    pub async fn ingest_all(
        &self,
        assets: &mut [MediaAsset],
        cancel: &CancellationToken,
    ) -> Result<Vec<RemoteFile>> {
        let mut files = Vec::with_capacity(assets.len());
        for asset in assets.iter_mut() {
            files.push(self.ingest(asset, cancel).await?);
        }
        Ok(files)
    }

    async fn ingest_inner(&self, asset: &mut MediaAsset, cancel: &CancellationToken) -> Result<RemoteFile> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let uploaded = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Error::Cancelled),
            uploaded = self.service.upload(asset.local_path(), asset.mime_type()) => uploaded?,
        };
        info!(handle = %uploaded.handle, state = ?uploaded.state, "media uploaded");

        let handle = uploaded.handle.clone();
        asset.record_upload(uploaded.clone());

        let ready = if asset.kind().requires_processing() {
            wait_until_ready(self.service.as_ref(), &handle, &self.policy, cancel).await?
        } else if uploaded.state == FileState::Failed {
            return Err(Error::MediaProcessing {
                handle,
                reason: uploaded
                    .error
                    .unwrap_or_else(|| "remote processing failed".to_owned()),
            });
        } else {
            uploaded
        };

        asset.record_ready(ready.clone());
        Ok(ready)
    }
}

impl fmt::Debug for Ingestor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ingestor")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
