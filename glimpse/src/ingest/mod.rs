//! Remote media ingestion.
//!
//! Media must be uploaded to the remote service before the model can see it.
//! The service processes some uploads asynchronously, so a handle is not
//! necessarily usable when the upload returns:
//!
//! - [`MediaIngestion`]: the service contract (upload + status lookup)
//! - [`PollPolicy`] / [`wait_until_ready`]: bounded, cancellable readiness polling
//! - [`Ingestor`]: applies the per-kind policy (videos polled, images not)

mod client;
mod poll;

use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use client::Ingestor;
pub use poll::{PollPolicy, wait_until_ready};

/// Opaque identifier assigned by the remote service (e.g. `files/abc123`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteHandle(String);

impl RemoteHandle {
    /// Wrap a service-assigned name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Processing state reported by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    /// The service did not report a state.
    #[default]
    StateUnspecified,
    /// Still being processed.
    Processing,
    /// Ready for use.
    Active,
    /// Processing failed.
    Failed,
}

impl FileState {
    /// Whether the service is still working on the file.
    #[must_use]
    pub const fn is_processing(&self) -> bool {
        matches!(self, Self::Processing)
    }
}

/// The remote service's view of one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Service-assigned handle.
    pub handle: RemoteHandle,
    /// URI used to reference the file in model requests.
    pub uri: String,
    /// MIME type recorded by the service.
    pub mime_type: String,
    /// Processing state.
    pub state: FileState,
    /// Failure description, when the service supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RemoteFile {
    /// Create a remote file record.
    #[must_use]
    pub fn new(
        handle: impl Into<String>,
        uri: impl Into<String>,
        mime_type: impl Into<String>,
        state: FileState,
    ) -> Self {
        Self {
            handle: RemoteHandle::new(handle),
            uri: uri.into(),
            mime_type: mime_type.into(),
            state,
            error: None,
        }
    }

    /// Attach a failure description.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Contract of the remote media processing service.
#[async_trait]
pub trait MediaIngestion: Send + Sync {
    /// Upload a local file and return the service's record of it.
    async fn upload(&self, path: &Path, mime_type: &str) -> Result<RemoteFile>;

    /// Look up the current state of an uploaded file.
    async fn status(&self, handle: &RemoteHandle) -> Result<RemoteFile>;
}
